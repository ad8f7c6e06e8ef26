use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SEAT_COUNT: usize = 20;
pub const DEFAULT_LOCK_DURATION_MS: u64 = 60_000;
/// Expiry timers fire this long after the logical deadline
pub const DEFAULT_EXPIRY_GRACE_MS: u64 = 10;

/// Startup configuration for a reservation manager. Not mutable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationConfig {
    /// Seats are created with ids "1" through `seat_count`
    pub seat_count: usize,
    pub lock_duration_ms: u64,
    pub expiry_grace_ms: u64,
    /// Key that mints admin grants; `None` disables admin overrides
    #[serde(skip_serializing)]
    pub admin_key: Option<String>,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            seat_count: DEFAULT_SEAT_COUNT,
            lock_duration_ms: DEFAULT_LOCK_DURATION_MS,
            expiry_grace_ms: DEFAULT_EXPIRY_GRACE_MS,
            admin_key: None,
        }
    }
}

impl ReservationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seat_count == 0 {
            return Err(ConfigError::NoSeats);
        }
        if self.lock_duration_ms == 0 {
            return Err(ConfigError::ZeroLockDuration);
        }
        Ok(())
    }

    pub fn lock_duration(&self) -> Duration {
        Duration::from_millis(self.lock_duration_ms)
    }

    pub fn expiry_grace(&self) -> Duration {
        Duration::from_millis(self.expiry_grace_ms)
    }

    pub fn seat_ids(&self) -> impl Iterator<Item = String> {
        (1..=self.seat_count).map(|n| n.to_string())
    }

    /// Configured admin key, treating an empty string as unset
    pub fn admin_key(&self) -> Option<&str> {
        self.admin_key.as_deref().filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_booking_desk() {
        let config = ReservationConfig::default();
        assert_eq!(config.seat_count, 20);
        assert_eq!(config.lock_duration(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
        assert_eq!(config.seat_ids().next().as_deref(), Some("1"));
        assert_eq!(config.seat_ids().last().as_deref(), Some("20"));
    }

    #[test]
    fn rejects_empty_inventory_and_zero_duration() {
        let no_seats = ReservationConfig {
            seat_count: 0,
            ..Default::default()
        };
        assert_eq!(no_seats.validate(), Err(ConfigError::NoSeats));

        let instant = ReservationConfig {
            lock_duration_ms: 0,
            ..Default::default()
        };
        assert_eq!(instant.validate(), Err(ConfigError::ZeroLockDuration));
    }

    #[test]
    fn empty_admin_key_counts_as_unset() {
        let config = ReservationConfig {
            admin_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.admin_key(), None);
    }

    #[test]
    fn deserializes_partial_config_over_defaults() {
        let config: ReservationConfig =
            serde_json::from_str(r#"{"seat_count": 5, "admin_key": "secret"}"#).unwrap();
        assert_eq!(config.seat_count, 5);
        assert_eq!(config.lock_duration_ms, DEFAULT_LOCK_DURATION_MS);
        assert_eq!(config.admin_key(), Some("secret"));

        let encoded = serde_json::to_value(&config).unwrap();
        assert!(encoded.get("admin_key").is_none());
        assert_eq!(encoded["seat_count"], 5);
    }
}
