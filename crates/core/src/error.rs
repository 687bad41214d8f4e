use crate::models::CollectionKind;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} record '{id}' not found")]
    NotFound { kind: CollectionKind, id: String },
    #[error("invalid {kind} record: {reason}")]
    Validation {
        kind: CollectionKind,
        reason: String,
    },
    #[error("{0} records are append-only and cannot be updated")]
    AppendOnly(CollectionKind),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage quota exceeded: record is {size} bytes, quota is {quota} bytes")]
    QuotaExceeded { size: usize, quota: usize },
    #[error("failed to serialize medical state: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize medical state: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read storage file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write storage file: {0}")]
    FileWrite(std::io::Error),
    #[error("text error: {0}")]
    Text(#[from] hms_types::TextError),
    #[error("record id error: {0}")]
    Id(#[from] hms_uuid::IdError),
}

impl StoreError {
    pub(crate) fn validation(kind: CollectionKind, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: CollectionKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
