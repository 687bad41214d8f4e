//! # API Shared
//!
//! Shared utilities and definitions for the hospital data APIs.
//!
//! Contains:
//! - The JSON response envelope (`ApiResponse`) spoken by the REST server and the API client
//! - Shared services like `HealthService`
//! - Bearer-token authentication helpers (usable by both server and client)
//!
//! Used by `api-rest` and `hms-api-client` for common functionality.

pub mod auth;
pub mod envelope;
pub mod health;

pub use auth::AuthError;
pub use envelope::ApiResponse;
pub use health::{HealthRes, HealthService};
