use core::time::Duration;

use crate::DEFAULT_EPOCH;

/// Construction parameters for a [`VerifiableGenerator`].
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use verid::Settings;
///
/// let settings = Settings::default()
///     .with_secret_key("s3cret")
///     .with_start_time(Duration::from_secs(1_700_000_000));
/// assert_eq!(settings.secret_key, "s3cret");
/// ```
///
/// [`VerifiableGenerator`]: crate::VerifiableGenerator
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    /// Epoch ticks are counted from, as an offset from the Unix epoch.
    /// `None` selects [`DEFAULT_EPOCH`].
    pub start_time: Option<Duration>,
    /// Key folded into every checksum. Empty by default.
    pub secret_key: String,
}

impl Settings {
    /// Sets the epoch, as an offset from the Unix epoch.
    pub fn with_start_time(mut self, start_time: Duration) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Sets the key folded into every checksum.
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = secret_key.into();
        self
    }

    /// The configured epoch, falling back to [`DEFAULT_EPOCH`].
    pub fn epoch(&self) -> Duration {
        self.start_time.unwrap_or(DEFAULT_EPOCH)
    }
}
