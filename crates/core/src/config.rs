//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Binaries read the environment; the core never does, so request
//! handling and tests see one consistent configuration.

use crate::constants::{DEFAULT_AUTOSAVE_DEBOUNCE, DEFAULT_DATA_DIR, DEFAULT_STORAGE_KEY};
use crate::{StoreError, StoreResult};
use hms_types::NonEmptyText;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    storage_key: NonEmptyText,
    autosave_debounce: Duration,
    storage_quota_bytes: Option<usize>,
    seed_on_empty: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with default debounce, no quota, and seeding enabled.
    pub fn new(data_dir: PathBuf, storage_key: NonEmptyText) -> Self {
        Self {
            data_dir,
            storage_key,
            autosave_debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
            storage_quota_bytes: None,
            seed_on_empty: true,
        }
    }

    pub fn with_autosave_debounce(mut self, debounce: Duration) -> Self {
        self.autosave_debounce = debounce;
        self
    }

    pub fn with_storage_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.storage_quota_bytes = quota_bytes;
        self
    }

    /// When disabled, an absent record loads as an empty state instead of sample data.
    pub fn with_seed_on_empty(mut self, seed_on_empty: bool) -> Self {
        self.seed_on_empty = seed_on_empty;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn storage_key(&self) -> &NonEmptyText {
        &self.storage_key
    }

    pub fn autosave_debounce(&self) -> Duration {
        self.autosave_debounce
    }

    pub fn storage_quota_bytes(&self) -> Option<usize> {
        self.storage_quota_bytes
    }

    pub fn seed_on_empty(&self) -> bool {
        self.seed_on_empty
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the data directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the storage key from an optional string value, defaulting to [`DEFAULT_STORAGE_KEY`].
pub fn storage_key_from_env_value(value: Option<String>) -> StoreResult<NonEmptyText> {
    let key = non_blank(value).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
    Ok(NonEmptyText::new(key)?)
}

/// Parse the auto-save debounce (milliseconds) from an optional string value.
///
/// Zero is rejected: a zero debounce would write on every single mutation.
pub fn autosave_debounce_from_env_value(value: Option<String>) -> StoreResult<Duration> {
    let Some(value) = non_blank(value) else {
        return Ok(DEFAULT_AUTOSAVE_DEBOUNCE);
    };
    let millis = value.parse::<u64>().map_err(|e| {
        StoreError::InvalidConfig(format!("autosave debounce '{value}' is not a number: {e}"))
    })?;
    if millis == 0 {
        return Err(StoreError::InvalidConfig(
            "autosave debounce must be greater than zero".into(),
        ));
    }
    Ok(Duration::from_millis(millis))
}

/// Parse the optional storage quota (bytes). Unset means unlimited.
pub fn storage_quota_from_env_value(value: Option<String>) -> StoreResult<Option<usize>> {
    non_blank(value)
        .map(|v| {
            v.parse::<usize>().map_err(|e| {
                StoreError::InvalidConfig(format!("storage quota '{v}' is not a number: {e}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset_or_blank() {
        assert_eq!(
            data_dir_from_env_value(None),
            PathBuf::from(DEFAULT_DATA_DIR)
        );
        assert_eq!(
            storage_key_from_env_value(Some("   ".into()))
                .unwrap()
                .as_str(),
            DEFAULT_STORAGE_KEY
        );
        assert_eq!(
            autosave_debounce_from_env_value(None).unwrap(),
            DEFAULT_AUTOSAVE_DEBOUNCE
        );
        assert_eq!(storage_quota_from_env_value(Some("".into())).unwrap(), None);
    }

    #[test]
    fn test_parses_explicit_values() {
        assert_eq!(
            data_dir_from_env_value(Some("/var/lib/hms".into())),
            PathBuf::from("/var/lib/hms")
        );
        assert_eq!(
            autosave_debounce_from_env_value(Some("250".into())).unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(
            storage_quota_from_env_value(Some("5242880".into())).unwrap(),
            Some(5_242_880)
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            autosave_debounce_from_env_value(Some("soon".into())),
            Err(StoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            autosave_debounce_from_env_value(Some("0".into())),
            Err(StoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            storage_quota_from_env_value(Some("-1".into())),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_overrides() {
        let key = storage_key_from_env_value(None).unwrap();
        let config = CoreConfig::new(data_dir_from_env_value(None), key)
            .with_autosave_debounce(Duration::from_millis(10))
            .with_storage_quota(Some(1024))
            .with_seed_on_empty(false);

        assert_eq!(config.autosave_debounce(), Duration::from_millis(10));
        assert_eq!(config.storage_quota_bytes(), Some(1024));
        assert!(!config.seed_on_empty());
        assert_eq!(config.storage_key().as_str(), DEFAULT_STORAGE_KEY);
    }
}
