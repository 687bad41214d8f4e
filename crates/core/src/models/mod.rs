//! Domain records held by the medical store.
//!
//! Every record is a flat, `camelCase`-serialised struct carrying a generated string id.
//! Callers never construct records directly: they submit a *draft* (the fields a form
//! would collect) and [`Record::from_draft`] fills in the id and defaulted fields such as
//! status and creation time.
//!
//! Status enums serialise in kebab-case (`in-progress`, `no-show`, `low-stock`). Nothing
//! enforces a transition table between statuses; any status may be set from any other.

mod clinical;
mod communication;
mod facility;
mod patient;
mod scheduling;
mod vitals;

pub use clinical::{
    LabPriority, LabTest, LabTestDraft, LabTestStatus, Medication, MedicationDraft,
    MedicationStatus, Surgery, SurgeryDraft, SurgeryStatus,
};
pub use communication::{
    EducationModule, EducationModuleDraft, EducationStatus, Emergency, EmergencyCode,
    EmergencyDraft, EmergencyStatus, Message, MessageDraft, MessageStatus, Report, ReportDraft,
    ReportStatus,
};
pub use facility::{
    AdmissionRequest, AdmissionRequestDraft, AdmissionStatus, Bed, BedDraft, BedKind, BedStatus,
    InventoryItem, InventoryItemDraft, StockStatus,
};
pub use patient::{
    Attachment, ContactInfo, Demographics, EmergencyContact, Insurance, MedicalIntake, Patient,
    PatientDraft, PatientPatch, PatientStatus, SocioDemographics,
};
pub use scheduling::{
    Appointment, AppointmentDraft, AppointmentStatus, TelemedicineDraft, TelemedicineSession,
    TelemedicineStatus,
};
pub use vitals::{VitalSigns, VitalSignsDraft};

use crate::state::MedicalState;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;

/// Names each collection of the store, using the key it is persisted under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Patients,
    VitalSigns,
    Medications,
    Appointments,
    Surgeries,
    LabTests,
    Emergencies,
    Beds,
    Reports,
    Messages,
    TelemedicineSessions,
    Inventory,
    AdmissionRequests,
    EducationModules,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 14] = [
        CollectionKind::Patients,
        CollectionKind::VitalSigns,
        CollectionKind::Medications,
        CollectionKind::Appointments,
        CollectionKind::Surgeries,
        CollectionKind::LabTests,
        CollectionKind::Emergencies,
        CollectionKind::Beds,
        CollectionKind::Reports,
        CollectionKind::Messages,
        CollectionKind::TelemedicineSessions,
        CollectionKind::Inventory,
        CollectionKind::AdmissionRequests,
        CollectionKind::EducationModules,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Patients => "patients",
            CollectionKind::VitalSigns => "vitalSigns",
            CollectionKind::Medications => "medications",
            CollectionKind::Appointments => "appointments",
            CollectionKind::Surgeries => "surgeries",
            CollectionKind::LabTests => "labTests",
            CollectionKind::Emergencies => "emergencies",
            CollectionKind::Beds => "beds",
            CollectionKind::Reports => "reports",
            CollectionKind::Messages => "messages",
            CollectionKind::TelemedicineSessions => "telemedicineSessions",
            CollectionKind::Inventory => "inventory",
            CollectionKind::AdmissionRequests => "admissionRequests",
            CollectionKind::EducationModules => "educationModules",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Triage priority shared by patients, surgeries and admission requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// A record type stored in one collection of [`MedicalState`].
///
/// This is the seam that lets the store offer one generic implementation of add, get,
/// update and list for all fourteen collections.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Caller-supplied fields for a new record.
    type Draft: Serialize + DeserializeOwned + Send + 'static;

    /// The collection this record lives in.
    const KIND: CollectionKind;

    /// Append-only records are never modified once created.
    const APPEND_ONLY: bool = false;

    fn id(&self) -> &str;

    /// Builds a record from a draft, assigning `id` and any defaulted fields.
    fn from_draft(id: String, now: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// The patient this record refers to, if any. Matched by string equality only.
    fn patient_id(&self) -> Option<&str> {
        None
    }

    /// Structural checks run after every create and update.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Recomputes derived fields. Called before `validate`.
    fn refresh(&mut self) {}

    fn collection(state: &MedicalState) -> &Vec<Self>;

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self>;
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_kind_serialises_as_storage_key() {
        for kind in CollectionKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_priority_orders_by_severity() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
