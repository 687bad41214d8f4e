//! Read-only derived views. Each handler clones the matching records out of the store.

use crate::error::ApiResult;
use crate::extract::{ApiPath, ApiQuery};
use crate::AppState;
use api_shared::ApiResponse;
use axum::{
    extract::State,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use hms_core::models::{
    AdmissionRequest, Appointment, Bed, EducationModule, Emergency, InventoryItem, LabTest,
    Medication, Message, Patient, PatientStatus, Surgery, TelemedicineSession, VitalSigns,
};
use serde::Deserialize;

fn owned<T: Clone>(records: Vec<&T>) -> Vec<T> {
    records.into_iter().cloned().collect()
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    status: Option<PatientStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RecipientParams {
    recipient: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateParams {
    date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/queries/patients",
    params(
        ("q" = Option<String>, Query, description = "Case-insensitive match on name, document number or id"),
        ("status" = Option<String>, Query, description = "Only patients with this status")
    ),
    responses((status = 200, description = "Matching patients", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn search_patients(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Vec<Patient>> {
    let store = state.store.read();
    let patients = store
        .search_patients(&params.q)
        .into_iter()
        .filter(|p| params.status.map_or(true, |status| p.status == status))
        .cloned()
        .collect();
    Ok(Json(ApiResponse::ok(patients)))
}

#[utoipa::path(
    get,
    path = "/queries/critical-patients",
    responses((status = 200, description = "Emergency or critical patients", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn critical_patients(State(state): State<AppState>) -> ApiResult<Vec<Patient>> {
    let records = owned(state.store.read().critical_patients());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/vitals",
    params(("id" = String, Path, description = "Patient id")),
    responses((status = 200, description = "Readings, oldest first", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn patient_vitals(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Vec<VitalSigns>> {
    let records = owned(state.store.read().vitals_for_patient(&id));
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/active-medications",
    responses((status = 200, description = "Medications currently administered", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn active_medications(State(state): State<AppState>) -> ApiResult<Vec<Medication>> {
    let records = owned(state.store.read().active_medications());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/todays-appointments",
    params(("date" = Option<String>, Query, description = "Day to list (YYYY-MM-DD); defaults to today")),
    responses((status = 200, description = "Appointments on the day, by time", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn todays_appointments(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DateParams>,
) -> ApiResult<Vec<Appointment>> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
    let records = owned(state.store.read().appointments_on(date));
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/upcoming-surgeries",
    responses((status = 200, description = "Scheduled surgeries in the future", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn upcoming_surgeries(State(state): State<AppState>) -> ApiResult<Vec<Surgery>> {
    let now = Utc::now();
    let records = owned(state.store.read().upcoming_surgeries(now));
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/pending-lab-tests",
    responses((status = 200, description = "Lab tests awaiting results, most urgent first", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn pending_lab_tests(State(state): State<AppState>) -> ApiResult<Vec<LabTest>> {
    let records = owned(state.store.read().pending_lab_tests());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/active-emergencies",
    responses((status = 200, description = "Unresolved emergencies", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn active_emergencies(State(state): State<AppState>) -> ApiResult<Vec<Emergency>> {
    let records = owned(state.store.read().active_emergencies());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/available-beds",
    responses((status = 200, description = "Beds ready for a patient", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn available_beds(State(state): State<AppState>) -> ApiResult<Vec<Bed>> {
    let records = owned(state.store.read().available_beds());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/occupied-beds",
    responses((status = 200, description = "Beds holding a patient", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn occupied_beds(State(state): State<AppState>) -> ApiResult<Vec<Bed>> {
    let records = owned(state.store.read().occupied_beds());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/unread-messages",
    params(("recipient" = Option<String>, Query, description = "Only messages for this recipient")),
    responses((status = 200, description = "Unread messages", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn unread_messages(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RecipientParams>,
) -> ApiResult<Vec<Message>> {
    let store = state.store.read();
    let messages = owned(store.unread_messages(params.recipient.as_deref()));
    Ok(Json(ApiResponse::ok(messages)))
}

#[utoipa::path(
    get,
    path = "/queries/low-stock",
    responses((status = 200, description = "Inventory at or below its minimum", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<InventoryItem>> {
    let records = owned(state.store.read().low_stock_inventory());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/pending-admissions",
    responses((status = 200, description = "Undecided admission requests", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn pending_admissions(
    State(state): State<AppState>,
) -> ApiResult<Vec<AdmissionRequest>> {
    let records = owned(state.store.read().pending_admission_requests());
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/upcoming-telemedicine",
    responses((status = 200, description = "Scheduled telemedicine sessions", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn upcoming_telemedicine(
    State(state): State<AppState>,
) -> ApiResult<Vec<TelemedicineSession>> {
    let now = Utc::now();
    let records = owned(state.store.read().upcoming_telemedicine_sessions(now));
    Ok(Json(ApiResponse::ok(records)))
}

#[utoipa::path(
    get,
    path = "/queries/published-education",
    responses((status = 200, description = "Published education modules", body = crate::handlers::domain::ApiEnvelope))
)]
#[axum::debug_handler]
pub async fn published_education(
    State(state): State<AppState>,
) -> ApiResult<Vec<EducationModule>> {
    let records = owned(state.store.read().published_education_modules());
    Ok(Json(ApiResponse::ok(records)))
}
