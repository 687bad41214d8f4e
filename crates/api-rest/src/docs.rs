use crate::handlers::{domain, queries};
use api_shared::HealthRes;
use utoipa::OpenApi;

/// OpenAPI document for the domain and query endpoints.
///
/// The generic collection routes (`GET|POST /<collection>`, `GET|PATCH /<collection>/{id}`)
/// share one shape and are described in the crate docs instead.
#[derive(OpenApi)]
#[openapi(
    info(title = "HMS REST API", description = "Hospital medical data store"),
    paths(
        domain::health,
        domain::dashboard,
        domain::full_state,
        domain::discharge_patient,
        domain::transfer_patient,
        domain::mark_patient_emergency,
        domain::admit_to_bed,
        domain::assign_bed,
        domain::release_bed,
        domain::set_appointment_status,
        domain::set_lab_test_result,
        domain::resolve_emergency,
        domain::mark_message_read,
        domain::adjust_inventory,
        domain::decide_admission_request,
        queries::search_patients,
        queries::critical_patients,
        queries::patient_vitals,
        queries::active_medications,
        queries::todays_appointments,
        queries::upcoming_surgeries,
        queries::pending_lab_tests,
        queries::active_emergencies,
        queries::available_beds,
        queries::occupied_beds,
        queries::unread_messages,
        queries::low_stock,
        queries::pending_admissions,
        queries::upcoming_telemedicine,
        queries::published_education,
    ),
    components(schemas(
        HealthRes,
        domain::ApiEnvelope,
        domain::AssignBedReq,
        domain::AdmitReq,
        domain::AppointmentStatusReq,
        domain::LabResultReq,
        domain::AdjustInventoryReq,
        domain::AdmissionDecisionReq,
    ))
)]
pub struct ApiDoc;
