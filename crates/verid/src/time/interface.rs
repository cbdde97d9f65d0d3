use core::time::Duration;
use std::sync::Arc;

/// Length of one tick: identifiers quantize wall-clock time into 10 ms units.
pub const TIME_UNIT: Duration = Duration::from_millis(10);

/// [`TIME_UNIT`] expressed in nanoseconds.
pub const TIME_UNIT_NANOS: i64 = 10_000_000;

/// Default epoch: Monday, September 1, 2014 00:00:00 UTC
pub const DEFAULT_EPOCH: Duration = Duration::from_secs(1_409_529_600);

/// A source of wall-clock time and of blocking sleeps.
///
/// The generator reads the current time on every call and, once the sequence
/// space of a tick is exhausted, sleeps through this trait until real time
/// catches up with the tick it has already handed out. Keeping both behind one
/// trait lets tests substitute a clock whose `sleep_for` simply advances its
/// own notion of "now".
///
/// # Example
///
/// ```
/// use verid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_nanos(&self) -> i64 {
///         1_234_000_000
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_nanos(), 1_234_000_000);
/// ```
pub trait TimeSource {
    /// Returns the number of nanoseconds since the Unix epoch (UTC).
    ///
    /// Instants before 1970 are negative.
    fn current_nanos(&self) -> i64;

    /// Blocks the calling thread for `dur`.
    fn sleep_for(&self, dur: Duration) {
        std::thread::sleep(dur);
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_nanos(&self) -> i64 {
        (**self).current_nanos()
    }

    fn sleep_for(&self, dur: Duration) {
        (**self).sleep_for(dur);
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_nanos(&self) -> i64 {
        (**self).current_nanos()
    }

    fn sleep_for(&self, dur: Duration) {
        (**self).sleep_for(dur);
    }
}

/// Converts nanoseconds since the Unix epoch into whole ticks, rounding toward
/// negative infinity.
pub const fn to_ticks(nanos: i64) -> i64 {
    nanos.div_euclid(TIME_UNIT_NANOS)
}

/// Converts an epoch offset from the Unix epoch into whole ticks.
pub fn duration_to_ticks(epoch: Duration) -> i64 {
    let ticks = epoch.as_nanos() / TIME_UNIT_NANOS as u128;
    i64::try_from(ticks).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_floor_toward_negative_infinity() {
        assert_eq!(to_ticks(0), 0);
        assert_eq!(to_ticks(9_999_999), 0);
        assert_eq!(to_ticks(10_000_000), 1);
        assert_eq!(to_ticks(-1), -1);
        assert_eq!(to_ticks(-10_000_000), -1);
    }

    #[test]
    fn default_epoch_is_september_2014() {
        assert_eq!(duration_to_ticks(DEFAULT_EPOCH), 140_952_960_000);
        assert_eq!(duration_to_ticks(Duration::from_millis(25)), 2);
    }

    #[test]
    fn time_unit_constants_agree() {
        assert_eq!(TIME_UNIT.as_nanos(), TIME_UNIT_NANOS as u128);
    }
}
