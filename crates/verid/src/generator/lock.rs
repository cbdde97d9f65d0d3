use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(not(feature = "parking-lot"))]
use crate::generator::PoisonError;
use crate::{
    Result, SecretBlock, Settings, SystemClock, TIME_UNIT_NANOS, TimeSource, VerifiableId,
    duration_to_ticks, generator::Mutex, to_ticks,
};

/// Tick and sequence bookkeeping, only ever mutated under the generator lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorState {
    /// Highest tick issued so far, relative to the epoch. Runs ahead of real
    /// time after a tick's sequence space has been exhausted.
    pub last_tick: i64,
    /// Sequence issued at `last_tick`.
    pub last_sequence: u8,
}

impl GeneratorState {
    /// State of a freshly built generator.
    ///
    /// Starting from the last sequence of tick zero means a generator whose
    /// epoch is "now" rolls straight over to tick 1 on its first call.
    pub const INITIAL: Self = Self {
        last_tick: 0,
        last_sequence: u8::MAX,
    };

    /// Moves the state forward for a call observed at tick `current`.
    ///
    /// Returns the number of ticks the state now runs ahead of `current` when
    /// the sequence wrapped and the tick had to be advanced artificially.
    fn advance(&mut self, current: i64) -> Option<i64> {
        if self.last_tick < current {
            self.last_tick = current;
            self.last_sequence = 0;
            return None;
        }

        self.last_sequence = self.last_sequence.wrapping_add(1);
        if self.last_sequence == 0 {
            self.last_tick += 1;
            Some(self.last_tick - current)
        } else {
            None
        }
    }
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// A lock-based generator of [`VerifiableId`]s, safe to share across threads.
///
/// All state lives behind one mutex. Cloning the generator yields another
/// handle onto the **same** state, so one instance can be constructed at
/// startup and handed to every component that mints identifiers.
///
/// ## Throughput
///
/// At most 256 identifiers fit in one 10 ms tick. The 257th call advances the
/// tick past real time and sleeps, **while holding the lock**, until the clock
/// catches up. Every other caller queues behind it. There is no error and no
/// way to cancel the wait.
///
/// ## Uniqueness
///
/// Identifiers are unique per generator until the 32-bit tick wraps (about
/// 497 days after the epoch). Two generators, or two processes, can mint the
/// same identifier.
///
/// # Example
///
/// ```
/// use verid::{SystemClock, Settings, VerifiableGenerator};
///
/// let generator = VerifiableGenerator::new(&Settings::default().with_secret_key("k"), SystemClock);
/// let a = generator.next_id();
/// let b = generator.next_id();
///
/// assert!(a < b);
/// assert!(a.verify("k"));
/// ```
#[derive(Clone, Debug)]
pub struct VerifiableGenerator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    pub(crate) state: Arc<crossbeam_utils::CachePadded<Mutex<GeneratorState>>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Arc<Mutex<GeneratorState>>,
    pub(crate) block: SecretBlock,
    pub(crate) epoch_tick: i64,
    pub(crate) time: T,
}

impl VerifiableGenerator<SystemClock> {
    /// A system-clock generator with the default epoch and the given secret.
    pub fn with_secret(secret_key: &str) -> Self {
        Self::new(
            &Settings::default().with_secret_key(secret_key),
            SystemClock,
        )
    }
}

impl Default for VerifiableGenerator<SystemClock> {
    fn default() -> Self {
        Self::new(&Settings::default(), SystemClock)
    }
}

impl<T> VerifiableGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator from `settings`, reading time from `time`.
    ///
    /// The secret is folded into its block once, here.
    pub fn new(settings: &Settings, time: T) -> Self {
        Self::from_components(
            settings.epoch(),
            GeneratorState::INITIAL,
            SecretBlock::derive(&settings.secret_key),
            time,
        )
    }

    /// Creates a generator from explicit component values.
    ///
    /// Useful for resuming from a known state or scripting one in tests. In
    /// typical use, prefer [`Self::new`].
    pub fn from_components(
        epoch: Duration,
        state: GeneratorState,
        block: SecretBlock,
        time: T,
    ) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(state))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(state)),
            block,
            epoch_tick: duration_to_ticks(epoch),
            time,
        }
    }

    /// Produces the next identifier.
    ///
    /// Blocks while another caller holds the lock, and sleeps under the lock
    /// when the current tick's 256 sequence values are used up.
    ///
    /// With the default `std` mutex, a lock poisoned by a panicking caller is
    /// recovered: the guarded state is two integers written without any
    /// intervening call that can panic. Use [`Self::try_next_id`] to observe
    /// poisoning instead.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> VerifiableId {
        #[cfg(feature = "parking-lot")]
        let mut state = self.state.lock();
        #[cfg(not(feature = "parking-lot"))]
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        self.step(&mut state)
    }

    /// Produces the next identifier, surfacing lock poisoning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if another thread panicked while
    /// holding the lock. Never fails with the `parking-lot` feature.
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<VerifiableId> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        Ok(self.step(&mut state))
    }

    fn step(&self, state: &mut GeneratorState) -> VerifiableId {
        let now = self.time.current_nanos();
        let current = to_ticks(now).saturating_sub(self.epoch_tick);

        if let Some(overtime) = state.advance(current) {
            Self::cold_sequence_exhausted(&self.time, state.last_tick, overtime, now);
        } else if state.last_tick > current {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                last_tick = state.last_tick,
                current,
                "clock behind last issued tick"
            );
        }

        VerifiableId::from_components(state.last_tick as u64, state.last_sequence, self.block)
    }

    #[cold]
    #[inline(never)]
    fn cold_sequence_exhausted(time: &T, _tick: i64, overtime: i64, now: i64) {
        let pause = sleep_time(overtime, now);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            tick = _tick,
            overtime,
            pause_ns = pause.as_nanos() as u64,
            "sequence exhausted, throttling until next tick"
        );
        time.sleep_for(pause);
    }

    /// Checks `id` against this generator's secret.
    pub const fn verify(&self, id: VerifiableId) -> bool {
        id.verify_with(self.block)
    }

    /// The block derived from the secret key.
    pub const fn secret_block(&self) -> SecretBlock {
        self.block
    }

    /// The epoch expressed in ticks since the Unix epoch.
    pub const fn epoch_tick(&self) -> i64 {
        self.epoch_tick
    }

    /// The time source this generator reads.
    pub const fn time(&self) -> &T {
        &self.time
    }

    /// A snapshot of the current tick/sequence state.
    pub fn state(&self) -> GeneratorState {
        #[cfg(feature = "parking-lot")]
        let state = self.state.lock();
        #[cfg(not(feature = "parking-lot"))]
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        *state
    }
}

/// Time left until real time reaches a tick `overtime` ticks past the one
/// containing `now`.
fn sleep_time(overtime: i64, now: i64) -> Duration {
    let nanos = overtime.saturating_mul(TIME_UNIT_NANOS) - now.rem_euclid(TIME_UNIT_NANOS);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(0))
}
