use crate::{error::ApiFailure, AppState};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Rejects requests without the configured bearer token. Open when no token is configured.
pub(crate) async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = state.api_token.as_deref() {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if let Err(e) = api_shared::auth::validate_bearer(header, expected) {
            tracing::warn!("Rejected request to {}: {}", request.uri().path(), e);
            return ApiFailure::Unauthorized(e.to_string()).into_response();
        }
    }
    next.run(request).await
}
