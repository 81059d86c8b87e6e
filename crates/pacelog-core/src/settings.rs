//! Emitter settings types and validation.
//!
//! Settings are plain data so they can be embedded in a host application's
//! own configuration file or filled from the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default minimum interval between emissions.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Default for seeding the throttle window on the first call.
pub const DEFAULT_SKIP_INITIAL: bool = true;

/// Upper bound accepted for `delay_ms` (24 hours).
pub const MAX_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Environment variable read by [`EmitterSettings::from_env`] for the delay.
pub const DELAY_ENV_VAR: &str = "PACELOG_DELAY_MS";

/// Environment variable read by [`EmitterSettings::from_env`] for `skip_initial`.
pub const SKIP_INITIAL_ENV_VAR: &str = "PACELOG_SKIP_INITIAL";

/// Throttled emitter settings.
///
/// All fields are optional so partial configuration falls back to defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmitterSettings {
    /// Minimum interval between sink invocations, in milliseconds.
    pub delay_ms: Option<u64>,

    /// Whether the first call seeds the throttle window instead of emitting.
    pub skip_initial: Option<bool>,
}

impl EmitterSettings {
    /// Create settings with every field populated with its default.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            delay_ms: Some(DEFAULT_DELAY_MS),
            skip_initial: Some(DEFAULT_SKIP_INITIAL),
        }
    }

    /// Get the effective delay in milliseconds (with default fallback).
    #[must_use]
    pub const fn effective_delay_ms(&self) -> u64 {
        match self.delay_ms {
            Some(ms) => ms,
            None => DEFAULT_DELAY_MS,
        }
    }

    /// Get the effective delay as a `Duration`.
    #[must_use]
    pub const fn effective_delay(&self) -> Duration {
        Duration::from_millis(self.effective_delay_ms())
    }

    /// Get the effective `skip_initial` flag (with default fallback).
    #[must_use]
    pub const fn effective_skip_initial(&self) -> bool {
        match self.skip_initial {
            Some(skip) => skip,
            None => DEFAULT_SKIP_INITIAL,
        }
    }

    /// Load settings from `PACELOG_DELAY_MS` and `PACELOG_SKIP_INITIAL`.
    ///
    /// Unset variables leave the corresponding field as `None`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Same rules as [`from_env`](Self::from_env); useful when variables come
    /// from a `.env` file or a test fixture rather than the live process.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delay_ms = lookup(DELAY_ENV_VAR)
            .map(|raw| parse_delay(&raw))
            .transpose()?;
        let skip_initial = lookup(SKIP_INITIAL_ENV_VAR)
            .map(|raw| parse_bool(SKIP_INITIAL_ENV_VAR, &raw))
            .transpose()?;

        let settings = Self {
            delay_ms,
            skip_initial,
        };
        validate_settings(&settings)?;

        tracing::debug!(?delay_ms, ?skip_initial, "Loaded emitter settings");
        Ok(settings)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Delay must be at most {MAX_DELAY_MS} ms, got {0}")]
    InvalidDelay(u64),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidEnvValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Validate settings values.
pub fn validate_settings(settings: &EmitterSettings) -> Result<(), SettingsError> {
    if let Some(ms) = settings.delay_ms {
        if ms > MAX_DELAY_MS {
            return Err(SettingsError::InvalidDelay(ms));
        }
    }
    Ok(())
}

fn parse_delay(raw: &str) -> Result<u64, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| SettingsError::InvalidEnvValue {
            var: DELAY_ENV_VAR,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidEnvValue {
            var,
            value: raw.to_string(),
            reason: "expected one of 1/0, true/false, yes/no, on/off".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = EmitterSettings::default();
        assert_eq!(settings.effective_delay_ms(), 1000);
        assert_eq!(settings.effective_delay(), Duration::from_secs(1));
        assert!(settings.effective_skip_initial());
    }

    #[test]
    fn test_with_defaults_matches_fallbacks() {
        let settings = EmitterSettings::with_defaults();
        assert_eq!(settings.delay_ms, Some(DEFAULT_DELAY_MS));
        assert_eq!(settings.skip_initial, Some(DEFAULT_SKIP_INITIAL));
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_validate_delay_bounds() {
        let ok = EmitterSettings {
            delay_ms: Some(MAX_DELAY_MS),
            skip_initial: None,
        };
        assert!(validate_settings(&ok).is_ok());

        let zero = EmitterSettings {
            delay_ms: Some(0),
            skip_initial: None,
        };
        assert!(validate_settings(&zero).is_ok());

        let too_long = EmitterSettings {
            delay_ms: Some(MAX_DELAY_MS + 1),
            skip_initial: None,
        };
        assert_eq!(
            validate_settings(&too_long),
            Err(SettingsError::InvalidDelay(MAX_DELAY_MS + 1))
        );
    }

    #[test]
    fn test_from_lookup_empty() {
        let settings = EmitterSettings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, EmitterSettings::default());
    }

    #[test]
    fn test_from_lookup_parses_values() {
        let settings = EmitterSettings::from_lookup(lookup_from(&[
            (DELAY_ENV_VAR, " 250 "),
            (SKIP_INITIAL_ENV_VAR, "OFF"),
        ]))
        .unwrap();

        assert_eq!(settings.delay_ms, Some(250));
        assert_eq!(settings.skip_initial, Some(false));
    }

    #[test]
    fn test_from_lookup_rejects_bad_delay() {
        let err = EmitterSettings::from_lookup(lookup_from(&[(DELAY_ENV_VAR, "fast")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidEnvValue { var: DELAY_ENV_VAR, .. }
        ));
    }

    #[test]
    fn test_from_lookup_rejects_bad_bool() {
        let err = EmitterSettings::from_lookup(lookup_from(&[(SKIP_INITIAL_ENV_VAR, "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains(SKIP_INITIAL_ENV_VAR));
    }

    #[test]
    fn test_from_lookup_validates_range() {
        let err = EmitterSettings::from_lookup(lookup_from(&[(DELAY_ENV_VAR, "86400001")]))
            .unwrap_err();
        assert_eq!(err, SettingsError::InvalidDelay(86_400_001));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let settings: EmitterSettings = serde_json::from_str(r#"{"delay_ms": 200}"#).unwrap();
        assert_eq!(settings.effective_delay_ms(), 200);
        assert!(settings.effective_skip_initial());

        let empty: EmitterSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EmitterSettings::default());
    }
}
