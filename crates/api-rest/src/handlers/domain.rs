//! Endpoints for domain operations that go beyond a plain field merge.

use crate::error::{ApiFailure, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;
use api_shared::{ApiResponse, HealthRes, HealthService};
use axum::{
    extract::State,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use hms_core::models::{
    AdmissionRequest, Appointment, AppointmentStatus, Bed, Emergency, InventoryItem, LabTest,
    Message, Patient,
};
use hms_core::{AdmissionDecision, DashboardStats, MedicalState};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope schema used in the OpenAPI document; `data` depends on the endpoint.
#[derive(Serialize, ToSchema)]
pub struct ApiEnvelope {
    pub success: bool,
    pub message: Option<String>,
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignBedReq {
    pub patient_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdmitReq {
    pub bed_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppointmentStatusReq {
    #[schema(value_type = String, example = "confirmed")]
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LabResultReq {
    pub result: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustInventoryReq {
    /// Units to add; negative to consume.
    pub delta: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionDecisionReq {
    /// `approve` or `reject`.
    #[schema(example = "approve")]
    pub decision: String,
    pub bed_id: Option<String>,
}

impl TryFrom<AdmissionDecisionReq> for AdmissionDecision {
    type Error = ApiFailure;

    fn try_from(req: AdmissionDecisionReq) -> Result<Self, Self::Error> {
        match req.decision.as_str() {
            "approve" => Ok(AdmissionDecision::Approve { bed_id: req.bed_id }),
            "reject" => Ok(AdmissionDecision::Reject),
            other => Err(ApiFailure::BadRequest(format!(
                "decision must be 'approve' or 'reject', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    today: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks; never requires a token.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/dashboard",
    params(("today" = Option<String>, Query, description = "Local date (YYYY-MM-DD) used for today's appointments")),
    responses(
        (status = 200, description = "Dashboard figures", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DashboardParams>,
) -> ApiResult<DashboardStats> {
    let now = Utc::now();
    let today = params.today.unwrap_or_else(|| now.date_naive());
    let stats = state.store.read().dashboard_stats(today, now);
    Ok(Json(ApiResponse::ok(stats)))
}

#[utoipa::path(
    get,
    path = "/state",
    responses(
        (status = 200, description = "The entire medical state", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn full_state(State(state): State<AppState>) -> ApiResult<MedicalState> {
    Ok(Json(ApiResponse::ok(state.store.snapshot())))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/discharge",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient discharged and bed released", body = ApiEnvelope),
        (status = 404, description = "Patient not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn discharge_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Patient> {
    let patient = state.store.write().discharge_patient(&id)?;
    Ok(Json(ApiResponse::ok_with_message(patient, "Patient discharged")))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/transfer",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient transferred and bed released", body = ApiEnvelope),
        (status = 404, description = "Patient not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn transfer_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Patient> {
    let patient = state.store.write().transfer_patient(&id)?;
    Ok(Json(ApiResponse::ok_with_message(patient, "Patient transferred")))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/emergency",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient flagged as emergency", body = ApiEnvelope),
        (status = 404, description = "Patient not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn mark_patient_emergency(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Patient> {
    let patient = state.store.write().mark_patient_emergency(&id)?;
    Ok(Json(ApiResponse::ok(patient)))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/admit",
    params(("id" = String, Path, description = "Patient id")),
    request_body = AdmitReq,
    responses(
        (status = 200, description = "Patient placed in bed; data is [patient, bed]", body = ApiEnvelope),
        (status = 400, description = "Bed cannot be assigned", body = ApiEnvelope),
        (status = 404, description = "Patient or bed not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn admit_to_bed(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<AdmitReq>,
) -> ApiResult<(Patient, Bed)> {
    let admitted = state.store.write().admit_to_bed(&id, &req.bed_id)?;
    Ok(Json(ApiResponse::ok(admitted)))
}

#[utoipa::path(
    post,
    path = "/beds/{id}/assign",
    params(("id" = String, Path, description = "Bed id")),
    request_body = AssignBedReq,
    responses(
        (status = 200, description = "Bed occupied", body = ApiEnvelope),
        (status = 400, description = "Bed cannot be assigned", body = ApiEnvelope),
        (status = 404, description = "Bed not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn assign_bed(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<AssignBedReq>,
) -> ApiResult<Bed> {
    let bed = state.store.write().assign_bed(&id, &req.patient_id)?;
    Ok(Json(ApiResponse::ok(bed)))
}

#[utoipa::path(
    post,
    path = "/beds/{id}/release",
    params(("id" = String, Path, description = "Bed id")),
    responses(
        (status = 200, description = "Bed available", body = ApiEnvelope),
        (status = 404, description = "Bed not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn release_bed(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Bed> {
    let bed = state.store.write().release_bed(&id)?;
    Ok(Json(ApiResponse::ok(bed)))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = AppointmentStatusReq,
    responses(
        (status = 200, description = "Status changed", body = ApiEnvelope),
        (status = 404, description = "Appointment not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn set_appointment_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<AppointmentStatusReq>,
) -> ApiResult<Appointment> {
    let appointment = state.store.write().set_appointment_status(&id, req.status)?;
    Ok(Json(ApiResponse::ok(appointment)))
}

#[utoipa::path(
    post,
    path = "/lab-tests/{id}/result",
    params(("id" = String, Path, description = "Lab test id")),
    request_body = LabResultReq,
    responses(
        (status = 200, description = "Result recorded and test completed", body = ApiEnvelope),
        (status = 400, description = "Empty result", body = ApiEnvelope),
        (status = 404, description = "Lab test not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn set_lab_test_result(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<LabResultReq>,
) -> ApiResult<LabTest> {
    let test = state.store.write().set_lab_test_result(&id, &req.result)?;
    Ok(Json(ApiResponse::ok(test)))
}

#[utoipa::path(
    post,
    path = "/emergencies/{id}/resolve",
    params(("id" = String, Path, description = "Emergency id")),
    responses(
        (status = 200, description = "Emergency resolved", body = ApiEnvelope),
        (status = 404, description = "Emergency not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn resolve_emergency(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Emergency> {
    let emergency = state.store.write().resolve_emergency(&id)?;
    Ok(Json(ApiResponse::ok(emergency)))
}

#[utoipa::path(
    post,
    path = "/messages/{id}/read",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message marked as read", body = ApiEnvelope),
        (status = 404, description = "Message not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn mark_message_read(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Message> {
    let message = state.store.write().mark_message_read(&id)?;
    Ok(Json(ApiResponse::ok(message)))
}

#[utoipa::path(
    post,
    path = "/inventory/{id}/adjust",
    params(("id" = String, Path, description = "Inventory item id")),
    request_body = AdjustInventoryReq,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiEnvelope),
        (status = 400, description = "Insufficient stock", body = ApiEnvelope),
        (status = 404, description = "Item not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<AdjustInventoryReq>,
) -> ApiResult<InventoryItem> {
    let item = state.store.write().adjust_inventory(&id, req.delta)?;
    Ok(Json(ApiResponse::ok(item)))
}

#[utoipa::path(
    post,
    path = "/admission-requests/{id}/decision",
    params(("id" = String, Path, description = "Admission request id")),
    request_body = AdmissionDecisionReq,
    responses(
        (status = 200, description = "Request decided", body = ApiEnvelope),
        (status = 400, description = "Already decided or bed unavailable", body = ApiEnvelope),
        (status = 404, description = "Request not found", body = ApiEnvelope)
    )
)]
#[axum::debug_handler]
pub async fn decide_admission_request(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<AdmissionDecisionReq>,
) -> ApiResult<AdmissionRequest> {
    let decision = AdmissionDecision::try_from(req)?;
    let request = state.store.write().decide_admission_request(&id, decision)?;
    Ok(Json(ApiResponse::ok(request)))
}
