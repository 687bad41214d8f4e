//! Key/value persistence for the medical state.
//!
//! A [`KeyValueStore`] is a flat string-to-string map in the manner of browser local storage:
//! one value per key, written whole. [`StateRepository`] stores the entire medical state as a
//! single JSON record under one key of such a store.
//!
//! Two backends are provided:
//!
//! - [`FileKeyValueStore`]: one `<key>.json` file per key under a data directory. Writes go to
//!   a temporary file that is renamed over the target, so a crash never leaves a partial record.
//! - [`MemoryKeyValueStore`]: a process-local map, used in tests and for ephemeral runs.
//!
//! Both backends accept an optional quota (bytes per value). An oversized write fails with
//! [`StoreError::QuotaExceeded`](crate::StoreError::QuotaExceeded) and leaves the previous value
//! in place.

mod file;
mod memory;
mod repository;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use repository::{LoadOutcome, LoadSource, SeedReason, StateRepository};

use crate::{StoreError, StoreResult};

/// A string-keyed store of string values.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

/// Keys double as file names, so they are restricted to a safe character set.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !valid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub(crate) fn check_quota(value: &str, quota: Option<usize>) -> StoreResult<()> {
    match quota {
        Some(quota) if value.len() > quota => Err(StoreError::QuotaExceeded {
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("medical_data").is_ok());
        assert!(validate_key("auth-token.v2").is_ok());

        for bad in ["", ".hidden", "../escape", "a/b", "with space"] {
            assert!(
                matches!(validate_key(bad), Err(StoreError::InvalidKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_check_quota() {
        assert!(check_quota("12345", None).is_ok());
        assert!(check_quota("12345", Some(5)).is_ok());
        assert!(matches!(
            check_quota("123456", Some(5)),
            Err(StoreError::QuotaExceeded { size: 6, quota: 5 })
        ));
    }
}
