//! Expiration windows for seen-set entries.
//!
//! A window defines how long a key stays "seen" after it was first recorded.
//! Expiry is measured from insertion time only; later sightings of the same
//! key never extend it.

use std::time::{Duration, Instant};

/// Error returned when a dedupe configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Expiration duration must be greater than zero
    #[error("expiration duration must be greater than 0")]
    ZeroExpiration,
    /// Sweep interval must be greater than zero
    #[error("sweep interval must be greater than 0")]
    ZeroSweepInterval,
    /// A required environment variable is not set
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
    /// An environment variable held a value that is not a millisecond count
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnv {
        /// Variable name
        name: String,
        /// Raw value found in the environment
        value: String,
    },
}

/// Write-time expiration window.
///
/// An entry inserted at `t0` is expired at `now` once `now - t0 >= duration`.
/// Readings that precede `t0` count as age zero.
///
/// # Example
/// ```
/// use stream_dedupe::ExpirationWindow;
/// use std::time::{Duration, Instant};
///
/// let window = ExpirationWindow::new(Duration::from_millis(1000)).unwrap();
/// let inserted = Instant::now();
///
/// assert!(!window.is_expired(inserted, inserted + Duration::from_millis(999)));
/// assert!(window.is_expired(inserted, inserted + Duration::from_millis(1000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpirationWindow {
    duration: Duration,
}

impl ExpirationWindow {
    /// Create a new window.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroExpiration` if `duration` is zero.
    pub fn new(duration: Duration) -> Result<Self, ConfigError> {
        if duration.is_zero() {
            return Err(ConfigError::ZeroExpiration);
        }
        Ok(Self { duration })
    }

    /// Create a window from a millisecond count.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroExpiration` if `millis` is zero.
    pub fn from_millis(millis: u64) -> Result<Self, ConfigError> {
        Self::new(Duration::from_millis(millis))
    }

    /// The configured duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Age of an entry inserted at `inserted`, observed at `now`.
    pub fn age(&self, inserted: Instant, now: Instant) -> Duration {
        now.saturating_duration_since(inserted)
    }

    /// Whether an entry inserted at `inserted` has expired by `now`.
    pub fn is_expired(&self, inserted: Instant, now: Instant) -> bool {
        self.age(inserted, now) >= self.duration
    }

    /// The instant at which an entry inserted at `inserted` expires.
    ///
    /// Returns `None` if the instant is not representable.
    pub fn expires_at(&self, inserted: Instant) -> Option<Instant> {
        inserted.checked_add(self.duration)
    }
}
