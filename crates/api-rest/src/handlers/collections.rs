//! Generic list/create/get/update endpoints shared by every collection.

use crate::error::{ApiFailure, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;
use api_shared::ApiResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use hms_core::models::Record;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListParams {
    /// Only records referring to this patient.
    patient_id: Option<String>,
}

/// `GET|POST <path>` and `GET|PATCH <path>/:id` for one record type.
pub(crate) fn routes<T: Record>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(list::<T>).post(create::<T>))
        .route(&format!("{path}/:id"), get(get_one::<T>).patch(update::<T>))
}

async fn list<T: Record>(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<T>> {
    let store = state.store.read();
    let records = store
        .all::<T>()
        .iter()
        .filter(|r| match params.patient_id.as_deref() {
            Some(patient_id) => r.patient_id() == Some(patient_id),
            None => true,
        })
        .cloned()
        .collect();
    Ok(Json(ApiResponse::ok(records)))
}

async fn create<T: Record>(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<T::Draft>,
) -> Result<(StatusCode, Json<ApiResponse<T>>), ApiFailure> {
    let record = state.store.write().add::<T>(draft)?;
    tracing::info!("Created {} record {}", T::KIND, record.id());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(record, format!("{} record created", T::KIND))),
    ))
}

async fn get_one<T: Record>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<T> {
    let record = state.store.read().require::<T>(&id)?.clone();
    Ok(Json(ApiResponse::ok(record)))
}

async fn update<T: Record>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<Value>,
) -> ApiResult<T> {
    let record = state.store.write().update::<T>(&id, patch)?;
    Ok(Json(ApiResponse::ok(record)))
}
