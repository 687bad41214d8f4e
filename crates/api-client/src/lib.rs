//! # HMS API client
//!
//! A thin asynchronous wrapper over the HMS REST API.
//!
//! Every request carries `Authorization: Bearer <token>` when a token is present in the
//! client's token store, and every response is decoded from the
//! `{success, message?, data?, errors?}` envelope. A non-2xx status becomes
//! [`ApiError::Http`] with the server's message. Requests are sent once; there are no retries.

#![warn(rust_2018_idioms)]

mod error;

pub use error::{ApiError, ApiResult};

use api_shared::{auth::bearer_header_value, ApiResponse, HealthRes};
use hms_core::constants::DEFAULT_TOKEN_KEY;
use hms_core::models::{
    AdmissionRequest, Appointment, AppointmentStatus, Bed, CollectionKind, Emergency,
    InventoryItem, LabTest, Message, Patient, Record, VitalSigns,
};
use hms_core::{AdmissionDecision, DashboardStats, KeyValueStore, MedicalState};
use reqwest::{header::AUTHORIZATION, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// URL path segment of a collection.
pub fn resource_path(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Patients => "patients",
        CollectionKind::VitalSigns => "vital-signs",
        CollectionKind::Medications => "medications",
        CollectionKind::Appointments => "appointments",
        CollectionKind::Surgeries => "surgeries",
        CollectionKind::LabTests => "lab-tests",
        CollectionKind::Emergencies => "emergencies",
        CollectionKind::Beds => "beds",
        CollectionKind::Reports => "reports",
        CollectionKind::Messages => "messages",
        CollectionKind::TelemedicineSessions => "telemedicine-sessions",
        CollectionKind::Inventory => "inventory",
        CollectionKind::AdmissionRequests => "admission-requests",
        CollectionKind::EducationModules => "education-modules",
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn KeyValueStore>,
    token_key: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token_key", &self.token_key)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:3000`), reading the bearer token
    /// from `tokens` under [`DEFAULT_TOKEN_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] unless `base_url` is an `http` or `https` URL.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            tokens,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        })
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> ApiResult<Option<String>> {
        Ok(self.tokens.get_item(&self.token_key)?)
    }

    pub fn set_token(&self, token: &str) -> ApiResult<()> {
        Ok(self.tokens.set_item(&self.token_key, token)?)
    }

    pub fn clear_token(&self) -> ApiResult<()> {
        Ok(self.tokens.remove_item(&self.token_key)?)
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        Ok(match self.token()? {
            Some(token) => builder.header(AUTHORIZATION, bearer_header_value(&token)),
            None => builder,
        })
    }

    /// Sends the request and unwraps the envelope's `data`.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            let envelope = serde_json::from_slice::<ApiResponse<Value>>(&bytes).ok();
            let message = envelope
                .as_ref()
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            let errors = envelope.and_then(|e| e.errors).unwrap_or_default();
            tracing::debug!("API request failed with {}: {}", status, message);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
                errors,
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes).map_err(ApiError::Decode)?;
        envelope
            .into_result()
            .map_err(ApiError::Api)?
            .ok_or(ApiError::MissingData)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::GET, path)?).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(self.request(Method::POST, path)?).await
    }

    /// `GET /health`. Not enveloped and never requires a token.
    pub async fn health(&self) -> ApiResult<HealthRes> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(url).send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: "health check failed".into(),
                errors: Vec::new(),
            });
        }
        let bytes = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    pub async fn dashboard(&self) -> ApiResult<DashboardStats> {
        self.get("dashboard").await
    }

    pub async fn state(&self) -> ApiResult<MedicalState> {
        self.get("state").await
    }

    /// Lists a collection, optionally only the records of one patient.
    pub async fn list<T: Record>(&self, patient_id: Option<&str>) -> ApiResult<Vec<T>> {
        let mut builder = self.request(Method::GET, resource_path(T::KIND))?;
        if let Some(patient_id) = patient_id {
            builder = builder.query(&[("patientId", patient_id)]);
        }
        self.send(builder).await
    }

    pub async fn fetch<T: Record>(&self, id: &str) -> ApiResult<T> {
        self.get(&format!("{}/{id}", resource_path(T::KIND))).await
    }

    pub async fn create<T: Record>(&self, draft: &T::Draft) -> ApiResult<T> {
        self.post(resource_path(T::KIND), draft).await
    }

    /// Shallow-merges `patch` into the record on the server.
    pub async fn update<T: Record>(&self, id: &str, patch: &Value) -> ApiResult<T> {
        let path = format!("{}/{id}", resource_path(T::KIND));
        self.send(self.request(Method::PATCH, &path)?.json(patch))
            .await
    }

    pub async fn discharge_patient(&self, id: &str) -> ApiResult<Patient> {
        self.post_empty(&format!("patients/{id}/discharge")).await
    }

    pub async fn transfer_patient(&self, id: &str) -> ApiResult<Patient> {
        self.post_empty(&format!("patients/{id}/transfer")).await
    }

    pub async fn mark_patient_emergency(&self, id: &str) -> ApiResult<Patient> {
        self.post_empty(&format!("patients/{id}/emergency")).await
    }

    pub async fn admit_to_bed(&self, patient_id: &str, bed_id: &str) -> ApiResult<(Patient, Bed)> {
        self.post(
            &format!("patients/{patient_id}/admit"),
            &json!({ "bedId": bed_id }),
        )
        .await
    }

    pub async fn patient_vitals(&self, patient_id: &str) -> ApiResult<Vec<VitalSigns>> {
        self.get(&format!("patients/{patient_id}/vitals")).await
    }

    pub async fn assign_bed(&self, bed_id: &str, patient_id: &str) -> ApiResult<Bed> {
        self.post(
            &format!("beds/{bed_id}/assign"),
            &json!({ "patientId": patient_id }),
        )
        .await
    }

    pub async fn release_bed(&self, bed_id: &str) -> ApiResult<Bed> {
        self.post_empty(&format!("beds/{bed_id}/release")).await
    }

    pub async fn set_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> ApiResult<Appointment> {
        let path = format!("appointments/{id}/status");
        self.send(
            self.request(Method::PUT, &path)?
                .json(&json!({ "status": status })),
        )
        .await
    }

    pub async fn set_lab_test_result(&self, id: &str, result: &str) -> ApiResult<LabTest> {
        self.post(&format!("lab-tests/{id}/result"), &json!({ "result": result }))
            .await
    }

    pub async fn resolve_emergency(&self, id: &str) -> ApiResult<Emergency> {
        self.post_empty(&format!("emergencies/{id}/resolve")).await
    }

    pub async fn mark_message_read(&self, id: &str) -> ApiResult<Message> {
        self.post_empty(&format!("messages/{id}/read")).await
    }

    pub async fn adjust_inventory(&self, id: &str, delta: i64) -> ApiResult<InventoryItem> {
        self.post(&format!("inventory/{id}/adjust"), &json!({ "delta": delta }))
            .await
    }

    pub async fn decide_admission_request(
        &self,
        id: &str,
        decision: &AdmissionDecision,
    ) -> ApiResult<AdmissionRequest> {
        self.post(&format!("admission-requests/{id}/decision"), decision)
            .await
    }

    /// `GET /queries/<name>`, e.g. `critical-patients` or `low-stock`.
    pub async fn query<T: DeserializeOwned>(&self, name: &str) -> ApiResult<Vec<T>> {
        self.get(&format!("queries/{name}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_core::MemoryKeyValueStore;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:3000/", Arc::new(MemoryKeyValueStore::new())).unwrap()
    }

    #[test]
    fn test_base_url_is_normalised() {
        assert_eq!(client().base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let tokens = Arc::new(MemoryKeyValueStore::new());
        assert!(matches!(
            ApiClient::new("localhost:3000", tokens),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_token_round_trip_through_store() {
        let tokens = Arc::new(MemoryKeyValueStore::new());
        let client = ApiClient::new("http://localhost:3000", tokens.clone()).unwrap();

        assert_eq!(client.token().unwrap(), None);
        client.set_token("abc").unwrap();
        assert_eq!(
            tokens.get_item(DEFAULT_TOKEN_KEY).unwrap().as_deref(),
            Some("abc")
        );
        client.clear_token().unwrap();
        assert_eq!(client.token().unwrap(), None);
    }

    #[test]
    fn test_resource_paths_are_distinct() {
        let mut paths: Vec<_> = CollectionKind::ALL.iter().map(|k| resource_path(*k)).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), CollectionKind::ALL.len());
    }
}
