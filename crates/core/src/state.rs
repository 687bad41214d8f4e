//! The full in-memory medical state.

use crate::models::{
    AdmissionRequest, Appointment, Bed, CollectionKind, EducationModule, Emergency,
    InventoryItem, LabTest, Medication, Message, Patient, Report, Surgery,
    TelemedicineSession, VitalSigns,
};
use serde::{Deserialize, Serialize};

/// All fourteen collections held by the store.
///
/// Serialises to the persisted record shape. Collections missing from an older record
/// deserialise as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalState {
    pub patients: Vec<Patient>,
    pub vital_signs: Vec<VitalSigns>,
    pub medications: Vec<Medication>,
    pub appointments: Vec<Appointment>,
    pub surgeries: Vec<Surgery>,
    pub lab_tests: Vec<LabTest>,
    pub emergencies: Vec<Emergency>,
    pub beds: Vec<Bed>,
    pub reports: Vec<Report>,
    pub messages: Vec<Message>,
    pub telemedicine_sessions: Vec<TelemedicineSession>,
    pub inventory: Vec<InventoryItem>,
    pub admission_requests: Vec<AdmissionRequest>,
    pub education_modules: Vec<EducationModule>,
}

impl MedicalState {
    /// Number of records in one collection.
    pub fn len_of(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Patients => self.patients.len(),
            CollectionKind::VitalSigns => self.vital_signs.len(),
            CollectionKind::Medications => self.medications.len(),
            CollectionKind::Appointments => self.appointments.len(),
            CollectionKind::Surgeries => self.surgeries.len(),
            CollectionKind::LabTests => self.lab_tests.len(),
            CollectionKind::Emergencies => self.emergencies.len(),
            CollectionKind::Beds => self.beds.len(),
            CollectionKind::Reports => self.reports.len(),
            CollectionKind::Messages => self.messages.len(),
            CollectionKind::TelemedicineSessions => self.telemedicine_sessions.len(),
            CollectionKind::Inventory => self.inventory.len(),
            CollectionKind::AdmissionRequests => self.admission_requests.len(),
            CollectionKind::EducationModules => self.education_modules.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        CollectionKind::ALL.iter().all(|kind| self.len_of(*kind) == 0)
    }

    /// Every record id in the state, used to resume the id generator after a load.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.patients
            .iter()
            .map(|r| r.id.as_str())
            .chain(self.vital_signs.iter().map(|r| r.id.as_str()))
            .chain(self.medications.iter().map(|r| r.id.as_str()))
            .chain(self.appointments.iter().map(|r| r.id.as_str()))
            .chain(self.surgeries.iter().map(|r| r.id.as_str()))
            .chain(self.lab_tests.iter().map(|r| r.id.as_str()))
            .chain(self.emergencies.iter().map(|r| r.id.as_str()))
            .chain(self.beds.iter().map(|r| r.id.as_str()))
            .chain(self.reports.iter().map(|r| r.id.as_str()))
            .chain(self.messages.iter().map(|r| r.id.as_str()))
            .chain(self.telemedicine_sessions.iter().map(|r| r.id.as_str()))
            .chain(self.inventory.iter().map(|r| r.id.as_str()))
            .chain(self.admission_requests.iter().map(|r| r.id.as_str()))
            .chain(self.education_modules.iter().map(|r| r.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let state: MedicalState =
            serde_json::from_str(r#"{"patients": [], "beds": []}"#).unwrap();

        assert!(state.is_empty());
        assert_eq!(state, MedicalState::default());
    }

    #[test]
    fn test_serialises_every_collection_key() {
        let json = serde_json::to_value(MedicalState::default()).unwrap();
        let object = json.as_object().unwrap();

        for kind in CollectionKind::ALL {
            assert!(object.contains_key(kind.as_str()), "missing {kind}");
        }
        assert_eq!(object.len(), CollectionKind::ALL.len());
    }
}
