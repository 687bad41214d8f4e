//! Typed creation helpers and domain operations.

use super::MedicalStore;
use crate::models::*;
use crate::{StoreError, StoreResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};

macro_rules! typed_add {
    ($($(#[$meta:meta])* $name:ident => $record:ty;)*) => {
        impl MedicalStore {
            $(
                $(#[$meta])*
                pub fn $name(&mut self, draft: <$record as Record>::Draft) -> StoreResult<$record> {
                    self.add::<$record>(draft)
                }
            )*
        }
    };
}

typed_add! {
    add_patient => Patient;
    /// Records a vital-signs reading. Readings are never updated afterwards.
    add_vital_signs => VitalSigns;
    add_medication => Medication;
    add_appointment => Appointment;
    add_surgery => Surgery;
    add_lab_test => LabTest;
    /// Raises an emergency code.
    add_emergency => Emergency;
    add_bed => Bed;
    add_report => Report;
    add_message => Message;
    add_telemedicine_session => TelemedicineSession;
    add_inventory_item => InventoryItem;
    add_admission_request => AdmissionRequest;
    add_education_module => EducationModule;
}

/// Outcome of reviewing an admission request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum AdmissionDecision {
    /// Approve, optionally reserving an available bed for the incoming patient.
    #[serde(rename_all = "camelCase")]
    Approve { bed_id: Option<String> },
    Reject,
}

impl MedicalStore {
    /// Merges the present fields of `patch` into the patient record.
    pub fn update_patient(&mut self, id: &str, patch: PatientPatch) -> StoreResult<Patient> {
        let patch = serde_json::to_value(patch).map_err(StoreError::Serialization)?;
        self.update::<Patient>(id, patch)
    }

    /// Discharges a patient and frees the bed they occupy, in one step.
    pub fn discharge_patient(&mut self, patient_id: &str) -> StoreResult<Patient> {
        self.leave_hospital(patient_id, PatientStatus::Discharged)
    }

    /// Marks a patient as transferred out and frees the bed they occupy.
    pub fn transfer_patient(&mut self, patient_id: &str) -> StoreResult<Patient> {
        self.leave_hospital(patient_id, PatientStatus::Transferred)
    }

    fn leave_hospital(&mut self, patient_id: &str, status: PatientStatus) -> StoreResult<Patient> {
        let now = Utc::now();
        let patient = self.stage::<Patient, _>(patient_id, |p| {
            p.status = status;
            p.discharge_date = Some(now);
            p.room = None;
            p.bed = None;
            Ok(())
        })?;
        let beds = self.stage_release_beds_of(patient_id)?;

        for bed in beds {
            self.commit(bed);
        }
        let patient = self.commit(patient);
        tracing::info!(patient_id, status = ?status, "patient left hospital");
        Ok(patient)
    }

    /// Flags a patient as an emergency and raises their priority to critical.
    pub fn mark_patient_emergency(&mut self, patient_id: &str) -> StoreResult<Patient> {
        self.update_with::<Patient, _>(patient_id, |p| {
            p.status = PatientStatus::Emergency;
            p.priority = Priority::Critical;
            Ok(())
        })
    }

    /// Marks a bed as occupied by `patient_id`.
    ///
    /// Only the bed changes; the patient's own `room`/`bed` fields are left as they are. Use
    /// [`MedicalStore::admit_to_bed`] to update both.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the bed is under maintenance or cleaning, or is
    /// already occupied by a different patient.
    pub fn assign_bed(&mut self, bed_id: &str, patient_id: &str) -> StoreResult<Bed> {
        let staged = self.stage_assign_bed(bed_id, patient_id)?;
        Ok(self.commit(staged))
    }

    /// Returns a bed to `available` with no occupant.
    pub fn release_bed(&mut self, bed_id: &str) -> StoreResult<Bed> {
        self.update_with::<Bed, _>(bed_id, |bed| {
            bed.status = BedStatus::Available;
            bed.patient_id = None;
            Ok(())
        })
    }

    /// Places a patient in a bed, updating the bed and the patient together.
    ///
    /// Any other bed the patient held is released. The patient becomes active (an emergency
    /// patient stays an emergency) and gets an admission date if they had none.
    pub fn admit_to_bed(&mut self, patient_id: &str, bed_id: &str) -> StoreResult<(Patient, Bed)> {
        let bed = self.stage_assign_bed(bed_id, patient_id)?;
        let (room, number) = (bed.record.room.clone(), bed.record.number.clone());
        let now = Utc::now();
        let patient = self.stage::<Patient, _>(patient_id, |p| {
            if p.status != PatientStatus::Emergency {
                p.status = PatientStatus::Active;
            }
            p.room = Some(room);
            p.bed = Some(number);
            p.admission_date.get_or_insert(now);
            p.discharge_date = None;
            Ok(())
        })?;
        let previous: Vec<_> = self
            .stage_release_beds_of(patient_id)?
            .into_iter()
            .filter(|staged| staged.record.id != bed_id)
            .collect();

        for staged in previous {
            self.commit(staged);
        }
        let bed = self.commit(bed);
        let patient = self.commit(patient);
        tracing::info!(patient_id, bed_id, "patient admitted to bed");
        Ok((patient, bed))
    }

    fn stage_assign_bed(&self, bed_id: &str, patient_id: &str) -> StoreResult<super::Staged<Bed>> {
        self.stage::<Bed, _>(bed_id, |bed| {
            match bed.status {
                BedStatus::Maintenance | BedStatus::Cleaning => {
                    return Err(StoreError::validation(
                        CollectionKind::Beds,
                        format!("bed {} is not assignable while {:?}", bed.number, bed.status),
                    ));
                }
                BedStatus::Occupied | BedStatus::Reserved
                    if bed
                        .patient_id
                        .as_deref()
                        .is_some_and(|current| current != patient_id) =>
                {
                    return Err(StoreError::validation(
                        CollectionKind::Beds,
                        format!("bed {} is already {:?}", bed.number, bed.status),
                    ));
                }
                _ => {}
            }
            bed.status = BedStatus::Occupied;
            bed.patient_id = Some(patient_id.to_string());
            Ok(())
        })
    }

    fn stage_release_beds_of(&self, patient_id: &str) -> StoreResult<Vec<super::Staged<Bed>>> {
        let held: Vec<String> = self
            .all::<Bed>()
            .iter()
            .filter(|bed| bed.patient_id.as_deref() == Some(patient_id))
            .map(|bed| bed.id.clone())
            .collect();

        held.iter()
            .map(|bed_id| {
                self.stage::<Bed, _>(bed_id, |bed| {
                    bed.status = BedStatus::Available;
                    bed.patient_id = None;
                    Ok(())
                })
            })
            .collect()
    }

    pub fn set_appointment_status(
        &mut self,
        id: &str,
        status: AppointmentStatus,
    ) -> StoreResult<Appointment> {
        self.update_with::<Appointment, _>(id, |a| {
            a.status = status;
            Ok(())
        })
    }

    /// Records a lab result and completes the test.
    pub fn set_lab_test_result(&mut self, id: &str, result: &str) -> StoreResult<LabTest> {
        if result.trim().is_empty() {
            return Err(StoreError::validation(
                CollectionKind::LabTests,
                "result is required",
            ));
        }
        let now = Utc::now();
        self.update_with::<LabTest, _>(id, |test| {
            test.result = Some(result.trim().to_string());
            test.status = LabTestStatus::Completed;
            test.completed_at = Some(now);
            Ok(())
        })
    }

    pub fn resolve_emergency(&mut self, id: &str) -> StoreResult<Emergency> {
        let now = Utc::now();
        self.update_with::<Emergency, _>(id, |e| {
            e.status = EmergencyStatus::Resolved;
            e.resolved_at.get_or_insert(now);
            Ok(())
        })
    }

    pub fn mark_message_read(&mut self, id: &str) -> StoreResult<Message> {
        self.update_with::<Message, _>(id, |m| {
            if m.status == MessageStatus::Unread {
                m.status = MessageStatus::Read;
            }
            Ok(())
        })
    }

    /// Adds `delta` units to an item's stock (negative to consume) and recomputes its status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the stock would drop below zero or leave the
    /// representable range.
    pub fn adjust_inventory(&mut self, id: &str, delta: i64) -> StoreResult<InventoryItem> {
        let now = Utc::now();
        self.update_with::<InventoryItem, _>(id, |item| {
            let quantity = i64::from(item.quantity).checked_add(delta).ok_or_else(|| {
                StoreError::validation(
                    CollectionKind::Inventory,
                    format!("stock adjustment of {} for {} is out of range", delta, item.name),
                )
            })?;
            let quantity = u32::try_from(quantity).map_err(|_| {
                StoreError::validation(
                    CollectionKind::Inventory,
                    format!(
                        "insufficient stock of {}: have {}, requested {}",
                        item.name,
                        item.quantity,
                        delta.unsigned_abs()
                    ),
                )
            })?;
            item.quantity = quantity;
            item.updated_at = now;
            Ok(())
        })
    }

    /// Approves or rejects a pending admission request.
    ///
    /// Approving with a bed reserves that bed for the request's patient.
    pub fn decide_admission_request(
        &mut self,
        id: &str,
        decision: AdmissionDecision,
    ) -> StoreResult<AdmissionRequest> {
        let now = Utc::now();
        let bed_id = match &decision {
            AdmissionDecision::Approve { bed_id } => bed_id.clone(),
            AdmissionDecision::Reject => None,
        };

        let request = self.stage::<AdmissionRequest, _>(id, |r| {
            if r.status != AdmissionStatus::Pending {
                return Err(StoreError::validation(
                    CollectionKind::AdmissionRequests,
                    format!("request {} was already decided ({:?})", r.id, r.status),
                ));
            }
            r.status = match decision {
                AdmissionDecision::Approve { .. } => AdmissionStatus::Approved,
                AdmissionDecision::Reject => AdmissionStatus::Rejected,
            };
            r.bed_id = bed_id.clone();
            r.decided_at = Some(now);
            Ok(())
        })?;

        let bed = match &bed_id {
            Some(bed_id) => {
                let patient_id = request.record.patient_id.clone();
                Some(self.stage::<Bed, _>(bed_id, |bed| {
                    if !bed.is_available() {
                        return Err(StoreError::validation(
                            CollectionKind::Beds,
                            format!("bed {} is not available", bed.number),
                        ));
                    }
                    bed.status = BedStatus::Reserved;
                    bed.patient_id = patient_id;
                    Ok(())
                })?)
            }
            None => None,
        };

        if let Some(bed) = bed {
            self.commit(bed);
        }
        Ok(self.commit(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_state;

    fn seeded() -> MedicalStore {
        MedicalStore::new(seed_state())
    }

    fn free_bed(store: &MedicalStore) -> String {
        store
            .all::<Bed>()
            .iter()
            .find(|b| b.is_available())
            .map(|b| b.id.clone())
            .unwrap()
    }

    #[test]
    fn test_assign_then_release_returns_bed_to_available() {
        let mut store = seeded();
        let bed_id = free_bed(&store);

        let assigned = store.assign_bed(&bed_id, "1").unwrap();
        assert_eq!(assigned.status, BedStatus::Occupied);
        assert_eq!(assigned.patient_id.as_deref(), Some("1"));

        let released = store.release_bed(&bed_id).unwrap();
        assert_eq!(released.status, BedStatus::Available);
        assert_eq!(released.patient_id, None);
    }

    #[test]
    fn test_assign_bed_does_not_touch_patient() {
        let mut store = seeded();
        let before = store.get::<Patient>("1").cloned().unwrap();
        let bed_id = free_bed(&store);

        store.assign_bed(&bed_id, "1").unwrap();
        assert_eq!(store.get::<Patient>("1"), Some(&before));
    }

    #[test]
    fn test_assign_bed_rejects_unavailable_beds() {
        let mut store = seeded();
        let occupied = store
            .all::<Bed>()
            .iter()
            .find(|b| b.patient_id.as_deref() == Some("1"))
            .map(|b| b.id.clone())
            .unwrap();

        let err = store.assign_bed(&occupied, "2").unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let maintenance = store
            .all::<Bed>()
            .iter()
            .find(|b| b.status == BedStatus::Maintenance)
            .map(|b| b.id.clone())
            .unwrap();
        assert!(store.assign_bed(&maintenance, "2").is_err());
    }

    #[test]
    fn test_discharge_frees_the_patients_bed() {
        let mut store = seeded();

        let patient = store.discharge_patient("1").unwrap();

        assert_eq!(patient.status, PatientStatus::Discharged);
        assert!(patient.discharge_date.is_some());
        assert!(patient.bed.is_none());
        assert!(store
            .all::<Bed>()
            .iter()
            .all(|b| b.patient_id.as_deref() != Some("1")));
    }

    #[test]
    fn test_discharge_unknown_patient_changes_nothing() {
        let mut store = seeded();
        let before = store.snapshot();

        assert!(matches!(
            store.discharge_patient("missing"),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_admit_to_bed_moves_patient_and_releases_previous_bed() {
        let mut store = seeded();
        let previous = store
            .all::<Bed>()
            .iter()
            .find(|b| b.patient_id.as_deref() == Some("1"))
            .map(|b| b.id.clone())
            .unwrap();
        let target = free_bed(&store);

        let (patient, bed) = store.admit_to_bed("1", &target).unwrap();

        assert_eq!(patient.bed.as_deref(), Some(bed.number.as_str()));
        assert_eq!(patient.room.as_deref(), Some(bed.room.as_str()));
        assert_eq!(bed.patient_id.as_deref(), Some("1"));
        let old = store.get::<Bed>(&previous).unwrap();
        assert_eq!(old.status, BedStatus::Available);
        assert_eq!(old.patient_id, None);
    }

    #[test]
    fn test_admit_to_missing_bed_leaves_state_unchanged() {
        let mut store = seeded();
        let before = store.snapshot();

        assert!(store.admit_to_bed("1", "no-such-bed").is_err());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_update_patient_with_typed_patch() {
        let mut store = seeded();

        let patient = store
            .update_patient(
                "2",
                PatientPatch {
                    assigned_doctor: Some("Dra. Salazar".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(patient.assigned_doctor.as_deref(), Some("Dra. Salazar"));
        assert_eq!(patient.demographics.first_name, "Ana");
    }

    #[test]
    fn test_mark_patient_emergency_raises_priority() {
        let mut store = seeded();
        let patient = store.mark_patient_emergency("2").unwrap();

        assert_eq!(patient.status, PatientStatus::Emergency);
        assert_eq!(patient.priority, Priority::Critical);
    }

    #[test]
    fn test_adjust_inventory_recomputes_status_and_rejects_negative_stock() {
        let mut store = MedicalStore::empty();
        let item = store
            .add_inventory_item(InventoryItemDraft {
                name: "Jeringas 5 ml".into(),
                quantity: 100,
                min_stock: 30,
                ..Default::default()
            })
            .unwrap();

        let item = store.adjust_inventory(&item.id, -80).unwrap();
        assert_eq!(item.quantity, 20);
        assert_eq!(item.status, StockStatus::LowStock);

        let err = store.adjust_inventory(&item.id, -21).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
        assert_eq!(store.get::<InventoryItem>(&item.id).unwrap().quantity, 20);

        let item = store.adjust_inventory(&item.id, -20).unwrap();
        assert_eq!(item.status, StockStatus::OutOfStock);
    }

    #[test]
    fn test_adjust_inventory_extreme_deltas_are_rejected() {
        let mut store = MedicalStore::empty();
        let item = store
            .add_inventory_item(InventoryItemDraft {
                name: "Guantes".into(),
                quantity: 10,
                min_stock: 5,
                ..Default::default()
            })
            .unwrap();

        for delta in [i64::MAX, i64::MIN, i64::from(u32::MAX)] {
            let err = store.adjust_inventory(&item.id, delta).unwrap_err();
            assert!(matches!(err, StoreError::Validation { .. }), "delta {delta}");
        }
        assert_eq!(store.get::<InventoryItem>(&item.id).unwrap().quantity, 10);
    }

    #[test]
    fn test_lab_result_completes_the_test() {
        let mut store = MedicalStore::empty();
        let test = store
            .add_lab_test(LabTestDraft {
                patient_id: "1".into(),
                test_name: "Glucosa en ayunas".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(store.set_lab_test_result(&test.id, "  ").is_err());
        let test = store.set_lab_test_result(&test.id, "92 mg/dL").unwrap();
        assert_eq!(test.status, LabTestStatus::Completed);
        assert_eq!(test.result.as_deref(), Some("92 mg/dL"));
        assert!(test.completed_at.is_some());
    }

    #[test]
    fn test_resolve_emergency_and_read_message() {
        let mut store = MedicalStore::empty();
        let emergency = store
            .add_emergency(EmergencyDraft {
                code: EmergencyCode::Red,
                location: "Bodega, piso 1".into(),
                description: None,
                patient_id: None,
                reported_by: "Seguridad".into(),
            })
            .unwrap();
        let resolved = store.resolve_emergency(&emergency.id).unwrap();
        assert_eq!(resolved.status, EmergencyStatus::Resolved);
        assert!(resolved.resolved_at.is_some());

        let message = store
            .add_message(MessageDraft {
                sender: "Dr. Ríos".into(),
                recipient: "Enf. Castro".into(),
                ..Default::default()
            })
            .unwrap();
        let read = store.mark_message_read(&message.id).unwrap();
        assert_eq!(read.status, MessageStatus::Read);
    }

    #[test]
    fn test_set_appointment_status_allows_any_transition() {
        let mut store = MedicalStore::empty();
        let appointment = store
            .add_appointment(AppointmentDraft {
                patient_id: "1".into(),
                patient_name: "Carlos Rodríguez".into(),
                doctor: "Dra. Salazar".into(),
                department: "Medicina Interna".into(),
                date: Utc::now().date_naive(),
                time: "10:00".into(),
                duration_minutes: None,
                kind: "follow-up".into(),
                notes: None,
            })
            .unwrap();

        store
            .set_appointment_status(&appointment.id, AppointmentStatus::Completed)
            .unwrap();
        let reopened = store
            .set_appointment_status(&appointment.id, AppointmentStatus::Scheduled)
            .unwrap();
        assert_eq!(reopened.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn test_approving_admission_reserves_bed() {
        let mut store = seeded();
        let bed_id = free_bed(&store);
        let request = store
            .add_admission_request(AdmissionRequestDraft {
                patient_id: Some("2".into()),
                patient_name: "Ana Martínez".into(),
                ..Default::default()
            })
            .unwrap();

        let decided = store
            .decide_admission_request(
                &request.id,
                AdmissionDecision::Approve {
                    bed_id: Some(bed_id.clone()),
                },
            )
            .unwrap();

        assert_eq!(decided.status, AdmissionStatus::Approved);
        assert_eq!(decided.bed_id.as_deref(), Some(bed_id.as_str()));
        let bed = store.get::<Bed>(&bed_id).unwrap();
        assert_eq!(bed.status, BedStatus::Reserved);
        assert_eq!(bed.patient_id.as_deref(), Some("2"));

        let again = store.decide_admission_request(&request.id, AdmissionDecision::Reject);
        assert!(matches!(again, Err(StoreError::Validation { .. })));
    }

    #[test]
    fn test_rejecting_admission_with_unavailable_bed_is_atomic() {
        let mut store = seeded();
        let occupied = store
            .all::<Bed>()
            .iter()
            .find(|b| b.is_occupied())
            .map(|b| b.id.clone())
            .unwrap();
        let request = store
            .add_admission_request(AdmissionRequestDraft {
                patient_name: "Jorge Pérez".into(),
                ..Default::default()
            })
            .unwrap();
        let before = store.snapshot();

        let result = store.decide_admission_request(
            &request.id,
            AdmissionDecision::Approve {
                bed_id: Some(occupied),
            },
        );

        assert!(result.is_err());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_admission_decision_wire_format() {
        let decision: AdmissionDecision =
            serde_json::from_str(r#"{"decision": "approve", "bedId": "bed-3"}"#).unwrap();
        assert_eq!(
            decision,
            AdmissionDecision::Approve {
                bed_id: Some("bed-3".into())
            }
        );
        let reject: AdmissionDecision = serde_json::from_str(r#"{"decision": "reject"}"#).unwrap();
        assert_eq!(reject, AdmissionDecision::Reject);
    }
}
