use api_shared::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hms_core::StoreError;

/// A failed request, rendered as an error envelope.
#[derive(Debug)]
pub enum ApiFailure {
    Store(StoreError),
    Unauthorized(String),
    BadRequest(String),
}

impl From<StoreError> for ApiFailure {
    fn from(e: StoreError) -> Self {
        ApiFailure::Store(e)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiFailure::Store(e @ StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, ApiResponse::<()>::error(e.to_string()))
            }
            ApiFailure::Store(StoreError::Validation { kind, reason }) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::error(format!("invalid {kind} record")).with_errors(vec![reason]),
            ),
            ApiFailure::Store(e @ StoreError::AppendOnly(_)) => {
                (StatusCode::CONFLICT, ApiResponse::error(e.to_string()))
            }
            ApiFailure::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::error("Internal error"),
                )
            }
            ApiFailure::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, ApiResponse::error(message))
            }
            ApiFailure::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ApiResponse::error(message))
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiFailure>;
