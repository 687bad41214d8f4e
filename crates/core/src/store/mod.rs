//! The domain state container.
//!
//! [`MedicalStore`] owns the [`MedicalState`] and is the only place records are created or
//! changed. Every successful mutation bumps the store revision and broadcasts a
//! [`StoreEvent`]; the auto-save reactor and any other observer subscribe to those events
//! instead of polling the state.
//!
//! Creation and update are implemented once, generically over [`Record`]:
//!
//! - [`MedicalStore::add`] builds a record from its draft, assigns a generated id, and
//!   validates it before appending.
//! - [`MedicalStore::update`] shallow-merges a JSON object into an existing record. The `id`
//!   field is never changed. A missing id is reported as [`StoreError::NotFound`] and leaves the
//!   collection untouched.
//!
//! Domain operations (discharge, bed assignment, ...) live in `operations`, and derived
//! read-only views in `queries`.

mod handle;
mod operations;
mod queries;

pub use handle::StoreHandle;
pub use operations::AdmissionDecision;
pub use queries::DashboardStats;

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::models::{CollectionKind, Record};
use crate::state::MedicalState;
use crate::{StoreError, StoreResult};
use chrono::Utc;
use hms_uuid::RecordIdGenerator;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// What a mutation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Created,
    Updated,
    /// The whole state was swapped, e.g. after a reload or reseed.
    Replaced,
}

/// Notification broadcast after every successful mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEvent {
    pub change: ChangeKind,
    /// `None` for [`ChangeKind::Replaced`].
    pub collection: Option<CollectionKind>,
    pub id: Option<String>,
    /// Store revision after the mutation.
    pub revision: u64,
}

/// A validated, modified copy of a record that has not been written back yet.
///
/// Operations touching several records stage all of them first and only commit once every
/// one has passed validation, so a failure leaves the state unchanged.
#[derive(Debug)]
pub(crate) struct Staged<T> {
    index: usize,
    record: T,
}

#[derive(Debug)]
pub struct MedicalStore {
    state: MedicalState,
    ids: RecordIdGenerator,
    revision: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl MedicalStore {
    /// Takes ownership of `state`. New ids are issued after every generated id already present.
    pub fn new(state: MedicalState) -> Self {
        let ids = RecordIdGenerator::resume_after(state.ids());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state,
            ids,
            revision: 0,
            events,
        }
    }

    pub fn empty() -> Self {
        Self::new(MedicalState::default())
    }

    pub fn state(&self) -> &MedicalState {
        &self.state
    }

    /// An owned copy of the current state, e.g. for persisting outside a lock.
    pub fn snapshot(&self) -> MedicalState {
        self.state.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Swaps in a whole new state.
    pub fn replace_state(&mut self, state: MedicalState) {
        self.ids = RecordIdGenerator::resume_after(state.ids());
        self.state = state;
        self.emit(ChangeKind::Replaced, None, None);
    }

    /// Creates a record from its draft and appends it to its collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the resulting record is structurally invalid,
    /// e.g. a patient without a name.
    pub fn add<T: Record>(&mut self, draft: T::Draft) -> StoreResult<T> {
        let id = self.ids.next_id().to_string();
        let mut record = T::from_draft(id, Utc::now(), draft);
        record.refresh();
        record
            .validate()
            .map_err(|reason| StoreError::validation(T::KIND, reason))?;

        T::collection_mut(&mut self.state).push(record.clone());
        tracing::debug!(collection = %T::KIND, id = record.id(), "record created");
        self.emit(ChangeKind::Created, Some(T::KIND), Some(record.id().to_string()));
        Ok(record)
    }

    pub fn get<T: Record>(&self, id: &str) -> Option<&T> {
        T::collection(&self.state).iter().find(|r| r.id() == id)
    }

    /// Like [`MedicalStore::get`], but a missing record is an error.
    pub fn require<T: Record>(&self, id: &str) -> StoreResult<&T> {
        self.get(id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))
    }

    pub fn all<T: Record>(&self) -> &[T] {
        T::collection(&self.state)
    }

    /// Shallow-merges the JSON object `patch` into the record `id`.
    ///
    /// Each top-level key of `patch` replaces the field of the same name; nested objects are
    /// replaced whole. An `id` key is ignored.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AppendOnly`] for append-only collections.
    /// - [`StoreError::NotFound`] if no record has this id.
    /// - [`StoreError::Validation`] if `patch` is not an object or the merged record is not a
    ///   valid entity.
    pub fn update<T: Record>(&mut self, id: &str, patch: Value) -> StoreResult<T> {
        let Value::Object(fields) = patch else {
            return Err(StoreError::validation(
                T::KIND,
                "update must be a JSON object",
            ));
        };

        let staged = self.stage::<T, _>(id, |record| {
            let mut merged = serde_json::to_value(&*record).map_err(StoreError::Serialization)?;
            if let Value::Object(target) = &mut merged {
                for (key, value) in fields {
                    if key != "id" {
                        target.insert(key, value);
                    }
                }
            }
            *record = serde_json::from_value(merged)
                .map_err(|e| StoreError::validation(T::KIND, e.to_string()))?;
            Ok(())
        })?;
        Ok(self.commit(staged))
    }

    /// Applies `f` to a copy of the record `id` and writes it back if it still validates.
    pub fn update_with<T, F>(&mut self, id: &str, f: F) -> StoreResult<T>
    where
        T: Record,
        F: FnOnce(&mut T) -> StoreResult<()>,
    {
        let staged = self.stage(id, f)?;
        Ok(self.commit(staged))
    }

    pub(crate) fn stage<T, F>(&self, id: &str, f: F) -> StoreResult<Staged<T>>
    where
        T: Record,
        F: FnOnce(&mut T) -> StoreResult<()>,
    {
        if T::APPEND_ONLY {
            return Err(StoreError::AppendOnly(T::KIND));
        }

        let index = T::collection(&self.state)
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;

        let mut record = T::collection(&self.state)[index].clone();
        f(&mut record)?;
        record.refresh();
        record
            .validate()
            .map_err(|reason| StoreError::validation(T::KIND, reason))?;

        Ok(Staged { index, record })
    }

    pub(crate) fn commit<T: Record>(&mut self, staged: Staged<T>) -> T {
        let Staged { index, record } = staged;
        T::collection_mut(&mut self.state)[index] = record.clone();
        tracing::debug!(collection = %T::KIND, id = record.id(), "record updated");
        self.emit(ChangeKind::Updated, Some(T::KIND), Some(record.id().to_string()));
        record
    }

    fn emit(&mut self, change: ChangeKind, collection: Option<CollectionKind>, id: Option<String>) {
        self.revision += 1;
        // No receivers is fine: nobody is observing yet.
        let _ = self.events.send(StoreEvent {
            change,
            collection,
            id,
            revision: self.revision,
        });
    }
}

impl Default for MedicalStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Bed, BedDraft, Demographics, Patient, PatientDraft, PatientStatus, VitalSigns,
        VitalSignsDraft,
    };
    use serde_json::json;

    fn patient_draft(first: &str, last: &str) -> PatientDraft {
        PatientDraft {
            demographics: Demographics {
                first_name: first.into(),
                last_name: last.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_add_then_get_returns_record_with_defaults() {
        let mut store = MedicalStore::empty();
        let created: Patient = store.add(patient_draft("Lucía", "Moreno")).unwrap();

        let fetched = store.get::<Patient>(&created.id).unwrap();
        assert_eq!(fetched, &created);
        assert_eq!(fetched.status, PatientStatus::Active);
        assert!(fetched.admission_date.is_some());
        assert_eq!(store.all::<Patient>().len(), 1);
    }

    #[test]
    fn test_ids_are_unique_within_one_millisecond() {
        let mut store = MedicalStore::empty();
        let ids: Vec<String> = (0..50)
            .map(|i| {
                store
                    .add::<Bed>(BedDraft {
                        number: format!("B-{i}"),
                        ..Default::default()
                    })
                    .unwrap()
                    .id
            })
            .collect();

        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_add_rejects_blank_name_without_changing_state() {
        let mut store = MedicalStore::empty();
        let err = store.add::<Patient>(patient_draft("", "Moreno")).unwrap_err();

        assert!(matches!(err, StoreError::Validation { kind: CollectionKind::Patients, .. }));
        assert!(store.all::<Patient>().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_update_merges_fields_and_keeps_id() {
        let mut store = MedicalStore::empty();
        let patient: Patient = store.add(patient_draft("Lucía", "Moreno")).unwrap();

        let updated: Patient = store
            .update(
                &patient.id,
                json!({ "id": "hijacked", "status": "discharged", "room": "204" }),
            )
            .unwrap();

        assert_eq!(updated.id, patient.id);
        assert_eq!(updated.status, PatientStatus::Discharged);
        assert_eq!(updated.room.as_deref(), Some("204"));
        assert_eq!(updated.demographics.first_name, "Lucía");
        assert_eq!(store.get::<Patient>(&patient.id), Some(&updated));
    }

    #[test]
    fn test_update_missing_id_is_not_found_and_leaves_collection_unchanged() {
        let mut store = MedicalStore::empty();
        store.add::<Patient>(patient_draft("Lucía", "Moreno")).unwrap();
        let before = store.snapshot();

        let err = store
            .update::<Patient>("does-not-exist", json!({ "status": "discharged" }))
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_update_with_invalid_field_type_is_validation_error() {
        let mut store = MedicalStore::empty();
        let patient: Patient = store.add(patient_draft("Lucía", "Moreno")).unwrap();

        let err = store
            .update::<Patient>(&patient.id, json!({ "status": "asleep" }))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let err = store
            .update::<Patient>(&patient.id, json!(["not", "an", "object"]))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn test_vitals_are_append_only() {
        let mut store = MedicalStore::empty();
        let vitals: VitalSigns = store
            .add(VitalSignsDraft {
                patient_id: "1".into(),
                heart_rate: 70,
                systolic_pressure: 120,
                diastolic_pressure: 80,
                temperature: 36.6,
                respiratory_rate: 14,
                oxygen_saturation: 98,
                ..Default::default()
            })
            .unwrap();

        let err = store
            .update::<VitalSigns>(&vitals.id, json!({ "heartRate": 200 }))
            .unwrap_err();
        assert!(matches!(err, StoreError::AppendOnly(CollectionKind::VitalSigns)));
    }

    #[test]
    fn test_every_mutation_emits_an_event() {
        let mut store = MedicalStore::empty();
        let mut events = store.subscribe();

        let patient: Patient = store.add(patient_draft("Lucía", "Moreno")).unwrap();
        store
            .update::<Patient>(&patient.id, json!({ "priority": "high" }))
            .unwrap();
        store.replace_state(MedicalState::default());

        let created = events.try_recv().unwrap();
        assert_eq!(created.change, ChangeKind::Created);
        assert_eq!(created.collection, Some(CollectionKind::Patients));
        assert_eq!(created.id.as_deref(), Some(patient.id.as_str()));
        assert_eq!(created.revision, 1);

        let updated = events.try_recv().unwrap();
        assert_eq!(updated.change, ChangeKind::Updated);
        assert_eq!(updated.revision, 2);

        let replaced = events.try_recv().unwrap();
        assert_eq!(replaced.change, ChangeKind::Replaced);
        assert_eq!(replaced.collection, None);
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_new_store_resumes_ids_after_loaded_records() {
        let mut first = MedicalStore::empty();
        let existing: Bed = first
            .add(BedDraft {
                number: "101".into(),
                ..Default::default()
            })
            .unwrap();

        let mut reloaded = MedicalStore::new(first.snapshot());
        let next: Bed = reloaded
            .add(BedDraft {
                number: "102".into(),
                ..Default::default()
            })
            .unwrap();

        let existing_millis: i64 = existing.id.parse().unwrap();
        let next_millis: i64 = next.id.parse().unwrap();
        assert!(next_millis > existing_millis);
    }

    #[test]
    fn test_loaded_id_at_integer_limit_does_not_break_add() {
        let mut state = crate::seed::seed_state();
        state.beds[0].id = i64::MAX.to_string();

        let mut store = MedicalStore::new(state);
        let bed: Bed = store
            .add(BedDraft {
                number: "103".into(),
                ..Default::default()
            })
            .unwrap();

        assert_ne!(bed.id, i64::MAX.to_string());
        assert_eq!(store.all::<Bed>().len(), 6);
    }
}
