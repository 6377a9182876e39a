use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lobby tuning knobs, validated before a queue is built from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbySettings {
    /// Master seed for per-battle RNG seeds; `None` draws fresh randomness
    pub seed: Option<u64>,
    /// Number of finished battles kept in memory
    pub history_capacity: usize,
    /// Per-subscriber event channel size
    pub event_buffer: usize,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            seed: None,
            history_capacity: 1_000,
            event_buffer: 64,
        }
    }
}

impl LobbySettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.history_capacity == 0 {
            return Err(SettingsError::InvalidValue(
                "history_capacity must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(SettingsError::InvalidValue(
                "event_buffer must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Update a single field from a loosely typed value.
    pub fn update_field(&mut self, field: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        let mut next = self.clone();
        match field {
            "seed" => {
                next.seed = if value.is_null() {
                    None
                } else {
                    Some(value.as_u64().ok_or_else(|| {
                        SettingsError::InvalidValue("seed must be a number or null".to_string())
                    })?)
                };
            }
            "history_capacity" => {
                let capacity = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue("history_capacity must be a number".to_string())
                })?;
                next.history_capacity = usize::try_from(capacity).map_err(|_| {
                    SettingsError::InvalidValue("history_capacity is too large".to_string())
                })?;
            }
            "event_buffer" => {
                let buffer = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue("event_buffer must be a number".to_string())
                })?;
                next.event_buffer = usize::try_from(buffer).map_err(|_| {
                    SettingsError::InvalidValue("event_buffer is too large".to_string())
                })?;
            }
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "unknown field: {}",
                    field
                )))
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
