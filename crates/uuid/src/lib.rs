//! Record identifier utilities.
//!
//! Every record in the medical store carries a string id derived from the wall clock: the
//! number of milliseconds since the Unix epoch, written in decimal (for example
//! `1718030400123`). Ids sort in creation order and can be read back as a timestamp.
//!
//! A bare clock reading collides when two records are created in the same millisecond, so
//! ids are issued through [`RecordIdGenerator`], which never hands out the same value twice:
//! if the clock has not advanced past the previous id, the next id is the previous one plus
//! one millisecond.
//!
//! Records loaded from storage may carry ids in other shapes (hand-written seed ids such as
//! `"1"` or `"bed-101"`). Those remain valid record ids; they are simply ignored when the
//! generator resumes from existing data.

mod service;

pub use service::{RecordId, RecordIdGenerator, MAX_RESUMABLE_MILLIS};

/// Error type for record id operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for record id operations.
pub type IdResult<T> = Result<T, IdError>;
