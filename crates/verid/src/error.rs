use core::num::ParseIntError;

/// A result type that defaults to the crate's [`enum@Error`].
///
/// Generation itself never fails; errors only surface from the fallible
/// [`VerifiableGenerator::try_next_id`] and from parsing identifiers out of
/// text.
///
/// [`VerifiableGenerator::try_next_id`]: crate::VerifiableGenerator::try_next_id
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `verid` can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator lock was **poisoned** by a thread that panicked while
    /// holding it.
    ///
    /// When the `parking-lot` feature is enabled, mutexes do **not** poison,
    /// so this variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// The input was not a valid decimal or hexadecimal integer literal.
    #[error("invalid identifier literal: {0}")]
    ParseId(#[from] ParseIntError),

    /// The decoded value sets bits above the 48-bit identifier layout.
    #[error("identifier {id:#x} exceeds the 48-bit layout")]
    Overflow {
        /// The decoded raw value.
        id: u64,
    },
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
