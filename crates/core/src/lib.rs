//! # HMS Core
//!
//! Core data layer of the hospital management system.
//!
//! This crate owns the shared medical data store and its persistence:
//! - [`models`]: the fourteen record types (patients, vital signs, beds, ...) and their drafts
//! - [`store`]: the in-memory [`MedicalStore`], its domain operations and derived queries
//! - [`storage`]: key/value backends and the [`StateRepository`] that persists the whole state
//!   as one JSON record
//! - [`autosave`]: the debounced write-back reactor
//! - [`seed`]: sample data for an empty store and a simulated vital-signs feed
//!
//! **No API concerns**: HTTP servers, authentication and clients belong in `api-rest`,
//! `api-shared` and `hms-api-client`.

pub mod autosave;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod seed;
pub mod state;
pub mod storage;
pub mod store;

pub use autosave::{AutoSave, AutoSaveStats};
pub use config::CoreConfig;
pub use error::{StoreError, StoreResult};
pub use hms_types::NonEmptyText;
pub use state::MedicalState;
pub use storage::{
    FileKeyValueStore, KeyValueStore, LoadOutcome, LoadSource, MemoryKeyValueStore, SeedReason,
    StateRepository,
};
pub use store::{
    AdmissionDecision, ChangeKind, DashboardStats, MedicalStore, StoreEvent, StoreHandle,
};
