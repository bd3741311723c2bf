//! Deserializable dedupe settings.
//!
//! Lets a host pipeline carry the expiration window and sweep interval in
//! its own configuration file or environment instead of code.

use crate::domain::window::{ConfigError, ExpirationWindow};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the expiration window in milliseconds.
pub const ENV_EXPIRATION_MS: &str = "STREAM_DEDUPE_EXPIRATION_MS";

/// Environment variable holding the sweep interval in milliseconds.
pub const ENV_SWEEP_INTERVAL_MS: &str = "STREAM_DEDUPE_SWEEP_INTERVAL_MS";

/// Dedupe settings in milliseconds.
///
/// # Example
/// ```
/// use stream_dedupe::DedupeConfig;
/// use std::time::Duration;
///
/// let config = DedupeConfig::with_expiration_ms(1_000).with_sweep_interval_ms(250);
/// let settings = config.validate().unwrap();
///
/// assert_eq!(settings.window.duration(), Duration::from_secs(1));
/// assert_eq!(settings.sweep_interval, Some(Duration::from_millis(250)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DedupeConfig {
    /// How long a key stays seen after first sighting
    pub expiration_ms: u64,
    /// How often to purge expired keys; `None` disables the sweeper
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep_interval_ms: Option<u64>,
}

/// Validated form of [`DedupeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeSettings {
    /// Expiration window
    pub window: ExpirationWindow,
    /// Sweep interval, if sweeping is enabled
    pub sweep_interval: Option<Duration>,
}

impl DedupeConfig {
    /// Config with the given window and no sweeper.
    pub fn with_expiration_ms(expiration_ms: u64) -> Self {
        Self {
            expiration_ms,
            sweep_interval_ms: None,
        }
    }

    /// Enable the sweeper with the given interval.
    pub fn with_sweep_interval_ms(mut self, sweep_interval_ms: u64) -> Self {
        self.sweep_interval_ms = Some(sweep_interval_ms);
        self
    }

    /// Read the config from `STREAM_DEDUPE_*` environment variables.
    ///
    /// # Errors
    /// - `ConfigError::MissingEnv` if the expiration variable is unset
    /// - `ConfigError::InvalidEnv` if a variable is not a millisecond count
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the config through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(ENV_EXPIRATION_MS)
            .ok_or_else(|| ConfigError::MissingEnv(ENV_EXPIRATION_MS.to_string()))?;
        let expiration_ms = parse_millis(ENV_EXPIRATION_MS, &raw)?;
        let sweep_interval_ms = lookup(ENV_SWEEP_INTERVAL_MS)
            .map(|raw| parse_millis(ENV_SWEEP_INTERVAL_MS, &raw))
            .transpose()?;

        Ok(Self {
            expiration_ms,
            sweep_interval_ms,
        })
    }

    /// Convert to durations, rejecting zero values.
    ///
    /// # Errors
    /// - `ConfigError::ZeroExpiration` if `expiration_ms` is 0
    /// - `ConfigError::ZeroSweepInterval` if `sweep_interval_ms` is `Some(0)`
    pub fn validate(&self) -> Result<DedupeSettings, ConfigError> {
        let window = ExpirationWindow::from_millis(self.expiration_ms)?;
        let sweep_interval = match self.sweep_interval_ms {
            Some(0) => return Err(ConfigError::ZeroSweepInterval),
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };
        Ok(DedupeSettings {
            window,
            sweep_interval,
        })
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_deserialize_json() {
        let config: DedupeConfig =
            serde_json::from_str(r#"{"expiration_ms": 1000, "sweep_interval_ms": 200}"#).unwrap();
        assert_eq!(
            config,
            DedupeConfig::with_expiration_ms(1000).with_sweep_interval_ms(200)
        );

        let config: DedupeConfig = serde_json::from_str(r#"{"expiration_ms": 5}"#).unwrap();
        assert_eq!(config.sweep_interval_ms, None);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result = serde_json::from_str::<DedupeConfig>(r#"{"expiration_ms": 5, "ttl": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_values() {
        assert_eq!(
            DedupeConfig::with_expiration_ms(0).validate(),
            Err(ConfigError::ZeroExpiration)
        );
        assert_eq!(
            DedupeConfig::with_expiration_ms(10)
                .with_sweep_interval_ms(0)
                .validate(),
            Err(ConfigError::ZeroSweepInterval)
        );
    }

    #[test]
    fn test_from_lookup() {
        let config = DedupeConfig::from_lookup(lookup(&[
            (ENV_EXPIRATION_MS, "1500"),
            (ENV_SWEEP_INTERVAL_MS, " 300 "),
        ]))
        .unwrap();
        assert_eq!(config.expiration_ms, 1500);
        assert_eq!(config.sweep_interval_ms, Some(300));

        let config = DedupeConfig::from_lookup(lookup(&[(ENV_EXPIRATION_MS, "10")])).unwrap();
        assert_eq!(config.sweep_interval_ms, None);
    }

    #[test]
    fn test_from_lookup_errors() {
        let missing = DedupeConfig::from_lookup(lookup(&[]));
        assert_eq!(
            missing,
            Err(ConfigError::MissingEnv(ENV_EXPIRATION_MS.to_string()))
        );

        let bad = DedupeConfig::from_lookup(lookup(&[(ENV_EXPIRATION_MS, "-5")]));
        assert_eq!(
            bad,
            Err(ConfigError::InvalidEnv {
                name: ENV_EXPIRATION_MS.to_string(),
                value: "-5".to_string(),
            })
        );
    }
}
