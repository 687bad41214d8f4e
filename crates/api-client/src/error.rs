use hms_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        errors: Vec<String>,
    },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    /// A 2xx response whose envelope reports `success: false`.
    #[error("API error: {0}")]
    Api(String),
    #[error("response carried no data")]
    MissingData,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("token storage error: {0}")]
    TokenStorage(#[from] StoreError),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
