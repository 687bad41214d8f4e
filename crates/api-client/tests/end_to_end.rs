use api_rest::{router, AppState};
use hms_api_client::{ApiClient, ApiError};
use hms_core::models::{Bed, BedStatus, Demographics, Patient, PatientDraft, PatientStatus};
use hms_core::{seed::seed_state, AdmissionDecision, MedicalStore, MemoryKeyValueStore, StoreHandle};
use serde_json::json;
use std::sync::Arc;

const TOKEN: &str = "e2e-token";

async fn serve() -> (ApiClient, StoreHandle) {
    let store = StoreHandle::new(MedicalStore::new(seed_state()));
    let app = router(AppState::new(store.clone(), Some(TOKEN.to_string())));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(
        format!("http://{addr}"),
        Arc::new(MemoryKeyValueStore::new()),
    )
    .unwrap();
    (client, store)
}

#[tokio::test]
async fn test_health_without_token() {
    let (client, _) = serve().await;

    let health = client.health().await.unwrap();

    assert!(health.ok);
}

#[tokio::test]
async fn test_missing_token_is_http_401() {
    let (client, _) = serve().await;

    let err = client.list::<Patient>(None).await.unwrap_err();

    match err {
        ApiError::Http { status, message, .. } => {
            assert_eq!(status, 401);
            assert_eq!(message, "missing Authorization header");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_crud_through_client() {
    let (client, store) = serve().await;
    client.set_token(TOKEN).unwrap();

    let patients = client.list::<Patient>(None).await.unwrap();
    assert_eq!(patients.len(), 2);

    let draft = PatientDraft {
        demographics: Demographics {
            first_name: "Lucía".into(),
            last_name: "Moreno".into(),
            ..Default::default()
        },
        ..Default::default()
    };
    let created = client.create::<Patient>(&draft).await.unwrap();
    assert_eq!(created.status, PatientStatus::Active);

    let fetched = client.fetch::<Patient>(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    let updated = client
        .update::<Patient>(&created.id, &json!({ "room": "305" }))
        .await
        .unwrap();
    assert_eq!(updated.room.as_deref(), Some("305"));

    assert_eq!(store.read().all::<Patient>().len(), 3);
}

#[tokio::test]
async fn test_not_found_and_validation_errors() {
    let (client, _) = serve().await;
    client.set_token(TOKEN).unwrap();

    let err = client.fetch::<Patient>("missing").await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));

    let err = client
        .create::<Patient>(&PatientDraft::default())
        .await
        .unwrap_err();
    match err {
        ApiError::Http { status, errors, .. } => {
            assert_eq!(status, 400);
            assert_eq!(errors, vec!["demographics.firstName is required".to_string()]);
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bed_workflow() {
    let (client, _) = serve().await;
    client.set_token(TOKEN).unwrap();

    let bed = client.assign_bed("bed-101b", "2").await.unwrap();
    assert_eq!(bed.status, BedStatus::Occupied);

    let beds = client.list::<Bed>(Some("2")).await.unwrap();
    assert_eq!(beds.len(), 2);

    let bed = client.release_bed("bed-101b").await.unwrap();
    assert_eq!(bed.status, BedStatus::Available);
    assert_eq!(bed.patient_id, None);

    let patient = client.discharge_patient("1").await.unwrap();
    assert_eq!(patient.status, PatientStatus::Discharged);
    let stats = client.dashboard().await.unwrap();
    assert_eq!(stats.occupied_beds, 1);
}

#[tokio::test]
async fn test_decision_on_unknown_request_is_not_found() {
    let (client, _) = serve().await;
    client.set_token(TOKEN).unwrap();

    let err = client
        .decide_admission_request("nope", &AdmissionDecision::Reject)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Http { status: 404, .. }));
}
