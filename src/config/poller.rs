//! Entitlement poller configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the post-checkout entitlement poller.
///
/// Defaults give a 24-second window (12 attempts, 2 seconds apart) before the
/// client falls back to the manual activation path.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    /// Seconds between entitlement re-fetches
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Maximum number of fetch attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl PollerConfig {
    /// Polling interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate poller configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::InvalidPollInterval);
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidPollBudget);
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_interval_secs() -> u64 {
    2
}

fn default_max_attempts() -> u32 {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PollerConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(2));
        assert_eq!(config.max_attempts, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PollerConfig {
            interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = PollerConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
