use super::KeyValueStore;
use crate::config::CoreConfig;
use crate::seed::seed_state;
use crate::state::MedicalState;
use crate::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use hms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Why sample data was loaded instead of a persisted record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeedReason {
    /// Nothing was stored under the key.
    Missing,
    /// A record was stored but could not be parsed.
    Corrupt,
}

/// Where a loaded state came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "source")]
pub enum LoadSource {
    Persisted {
        #[serde(rename = "lastUpdated")]
        last_updated: Option<DateTime<Utc>>,
    },
    Seeded { reason: SeedReason },
    /// Nothing was stored and seeding is disabled.
    Empty,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub state: MedicalState,
    pub source: LoadSource,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedRecordRef<'a> {
    #[serde(flatten)]
    state: &'a MedicalState,
    last_updated: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedRecord {
    #[serde(flatten)]
    state: MedicalState,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// Reads and writes the whole medical state as one JSON record under a fixed key.
#[derive(Clone)]
pub struct StateRepository {
    store: Arc<dyn KeyValueStore>,
    key: NonEmptyText,
    seed_on_empty: bool,
}

impl std::fmt::Debug for StateRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateRepository")
            .field("key", &self.key)
            .field("seed_on_empty", &self.seed_on_empty)
            .finish_non_exhaustive()
    }
}

impl StateRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: NonEmptyText) -> Self {
        Self {
            store,
            key,
            seed_on_empty: true,
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, cfg: &CoreConfig) -> Self {
        Self::new(store, cfg.storage_key().clone()).with_seed_on_empty(cfg.seed_on_empty())
    }

    pub fn with_seed_on_empty(mut self, seed_on_empty: bool) -> Self {
        self.seed_on_empty = seed_on_empty;
        self
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Loads the persisted state.
    ///
    /// An absent record yields the sample seed data (or an empty state when seeding is
    /// disabled). A record that cannot be parsed is logged and replaced by the seed data; it
    /// is overwritten on the next save.
    ///
    /// # Errors
    ///
    /// Returns an error only if the underlying store cannot be read.
    pub fn load(&self) -> StoreResult<LoadOutcome> {
        let Some(raw) = self.store.get_item(self.key())? else {
            if !self.seed_on_empty {
                tracing::info!("no stored record under '{}', starting empty", self.key());
                return Ok(LoadOutcome {
                    state: MedicalState::default(),
                    source: LoadSource::Empty,
                });
            }
            tracing::info!("no stored record under '{}', loading seed data", self.key());
            return Ok(LoadOutcome {
                state: seed_state(),
                source: LoadSource::Seeded {
                    reason: SeedReason::Missing,
                },
            });
        };

        match serde_json::from_str::<PersistedRecord>(&raw) {
            Ok(record) => {
                tracing::info!(
                    "loaded stored record '{}' ({} bytes, {} patients)",
                    self.key(),
                    raw.len(),
                    record.state.patients.len()
                );
                Ok(LoadOutcome {
                    state: record.state,
                    source: LoadSource::Persisted {
                        last_updated: record.last_updated,
                    },
                })
            }
            Err(e) => {
                tracing::warn!(
                    "failed to parse stored record '{}', falling back to seed data: {}",
                    self.key(),
                    e
                );
                Ok(LoadOutcome {
                    state: seed_state(),
                    source: LoadSource::Seeded {
                        reason: SeedReason::Corrupt,
                    },
                })
            }
        }
    }

    /// Writes the entire state, stamped with the current time. Returns the record size.
    pub fn save(&self, state: &MedicalState) -> StoreResult<usize> {
        self.save_at(state, Utc::now())
    }

    pub fn save_at(&self, state: &MedicalState, last_updated: DateTime<Utc>) -> StoreResult<usize> {
        let raw = serde_json::to_string(&PersistedRecordRef {
            state,
            last_updated,
        })
        .map_err(StoreError::Serialization)?;
        self.store.set_item(self.key(), &raw)?;
        tracing::debug!("saved record '{}' ({} bytes)", self.key(), raw.len());
        Ok(raw.len())
    }

    /// Deletes the stored record; the next load falls back to seed data.
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove_item(self.key())
    }
}
