//! # API REST
//!
//! REST API over the hospital medical store.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation, served at `/api-docs/openapi.json`
//! - Bearer-token authentication, CORS and the response envelope
//!
//! Every collection gets the same four routes, e.g. for patients:
//!
//! | Method  | Path             | Body                      |
//! |---------|------------------|---------------------------|
//! | `GET`   | `/patients`      | optional `?patientId=`    |
//! | `POST`  | `/patients`      | draft, answers `201`      |
//! | `GET`   | `/patients/:id`  |                           |
//! | `PATCH` | `/patients/:id`  | partial JSON object       |
//!
//! Domain operations (discharge, bed assignment, lab results, ...) and derived queries have
//! dedicated routes listed in [`ApiDoc`].

#![warn(rust_2018_idioms)]

mod auth;
pub mod docs;
mod error;
mod extract;
pub mod handlers;

pub use docs::ApiDoc;
pub use error::{ApiFailure, ApiResult};

use axum::{
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use handlers::{collections::routes, domain, queries};
use hms_core::models::{
    AdmissionRequest, Appointment, Bed, EducationModule, Emergency, InventoryItem, LabTest,
    Medication, Message, Patient, Report, Surgery, TelemedicineSession, VitalSigns,
};
use hms_core::StoreHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    /// Required bearer token; `None` leaves the API open.
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: StoreHandle, api_token: Option<String>) -> Self {
        Self {
            store,
            api_token: api_token.map(Arc::from),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::<Patient>("/patients"))
        .merge(routes::<VitalSigns>("/vital-signs"))
        .merge(routes::<Medication>("/medications"))
        .merge(routes::<Appointment>("/appointments"))
        .merge(routes::<Surgery>("/surgeries"))
        .merge(routes::<LabTest>("/lab-tests"))
        .merge(routes::<Emergency>("/emergencies"))
        .merge(routes::<Bed>("/beds"))
        .merge(routes::<Report>("/reports"))
        .merge(routes::<Message>("/messages"))
        .merge(routes::<TelemedicineSession>("/telemedicine-sessions"))
        .merge(routes::<InventoryItem>("/inventory"))
        .merge(routes::<AdmissionRequest>("/admission-requests"))
        .merge(routes::<EducationModule>("/education-modules"))
        .route("/dashboard", get(domain::dashboard))
        .route("/state", get(domain::full_state))
        .route("/patients/:id/discharge", post(domain::discharge_patient))
        .route("/patients/:id/transfer", post(domain::transfer_patient))
        .route("/patients/:id/emergency", post(domain::mark_patient_emergency))
        .route("/patients/:id/admit", post(domain::admit_to_bed))
        .route("/patients/:id/vitals", get(queries::patient_vitals))
        .route("/beds/:id/assign", post(domain::assign_bed))
        .route("/beds/:id/release", post(domain::release_bed))
        .route("/appointments/:id/status", put(domain::set_appointment_status))
        .route("/lab-tests/:id/result", post(domain::set_lab_test_result))
        .route("/emergencies/:id/resolve", post(domain::resolve_emergency))
        .route("/messages/:id/read", post(domain::mark_message_read))
        .route("/inventory/:id/adjust", post(domain::adjust_inventory))
        .route(
            "/admission-requests/:id/decision",
            post(domain::decide_admission_request),
        )
        .route("/queries/patients", get(queries::search_patients))
        .route("/queries/critical-patients", get(queries::critical_patients))
        .route("/queries/active-medications", get(queries::active_medications))
        .route("/queries/todays-appointments", get(queries::todays_appointments))
        .route("/queries/upcoming-surgeries", get(queries::upcoming_surgeries))
        .route("/queries/pending-lab-tests", get(queries::pending_lab_tests))
        .route("/queries/active-emergencies", get(queries::active_emergencies))
        .route("/queries/available-beds", get(queries::available_beds))
        .route("/queries/occupied-beds", get(queries::occupied_beds))
        .route("/queries/unread-messages", get(queries::unread_messages))
        .route("/queries/low-stock", get(queries::low_stock))
        .route("/queries/pending-admissions", get(queries::pending_admissions))
        .route(
            "/queries/upcoming-telemedicine",
            get(queries::upcoming_telemedicine),
        )
        .route(
            "/queries/published-education",
            get(queries::published_education),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(domain::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
