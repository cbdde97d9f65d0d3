//! The process-wide default generator.
//!
//! Most code should construct a [`VerifiableGenerator`] once and pass it to
//! whoever needs identifiers. The functions here serve call sites that are
//! content with one generator per process: it is built lazily on first use
//! with [`DEFAULT_SECRET_KEY`] and [`DEFAULT_EPOCH`], and can be replaced
//! wholesale with [`init_default`].
//!
//! [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH

use std::sync::{LazyLock, PoisonError, RwLock};

use crate::{Settings, SystemClock, VerifiableGenerator};

/// Secret used by the default generator until [`init_default`] is called.
pub const DEFAULT_SECRET_KEY: &str = "";

static DEFAULT_GENERATOR: LazyLock<RwLock<VerifiableGenerator>> =
    LazyLock::new(|| RwLock::new(VerifiableGenerator::with_secret(DEFAULT_SECRET_KEY)));

/// Replaces the default generator with a fresh one keyed by `secret_key`.
///
/// The new generator starts from a fresh state. Identifiers minted before and
/// after the swap can collide or compare out of order, so call this during
/// startup, before other threads begin generating.
pub fn init_default(secret_key: &str) {
    init_default_with(&Settings::default().with_secret_key(secret_key));
}

/// Replaces the default generator with one built from `settings`.
///
/// See [`init_default`] for the ordering caveat.
pub fn init_default_with(settings: &Settings) {
    replace_default(VerifiableGenerator::new(settings, SystemClock));
}

/// Installs `generator` as the default.
pub fn replace_default(generator: VerifiableGenerator) {
    let mut slot = DEFAULT_GENERATOR
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = generator;

    #[cfg(feature = "tracing")]
    tracing::debug!(epoch_tick = slot.epoch_tick(), "default generator replaced");
}

/// A handle onto the current default generator.
///
/// The handle shares state with the default until the default is replaced;
/// afterwards it keeps the generator it was cloned from.
pub fn default_generator() -> VerifiableGenerator {
    DEFAULT_GENERATOR
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Next identifier from the default generator, as an integer.
pub fn next_id() -> u64 {
    default_generator().next_id().to_raw()
}

/// Next identifier from the default generator, as lowercase hex without a
/// prefix.
pub fn next_hex_string() -> String {
    default_generator().next_id().to_hex_string()
}

/// Next identifier from the default generator, as a decimal string.
pub fn next_decimal_string() -> String {
    default_generator().next_id().to_string()
}
