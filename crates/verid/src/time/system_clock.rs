use crate::TimeSource;
use std::time::{SystemTime, UNIX_EPOCH};

/// A [`TimeSource`] backed by the system wall clock.
///
/// Reads go straight to [`SystemTime::now`]; sleeps use
/// [`std::thread::sleep`]. The wall clock may step backward (NTP, manual
/// adjustment). The generator tolerates that by continuing to count sequences
/// on the last issued tick instead of reusing an earlier one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_nanos(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_nanos()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_nanos()).map_or(i64::MIN, |n| -n),
        }
    }
}
