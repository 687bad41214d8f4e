//! Patient records.
//!
//! A patient is created from the intake form and then only moves between admission
//! statuses; patients are never removed from the store. The intake data is grouped into
//! blocks (demographics, insurance, contact, socio-demographics, medical intake) while the
//! admission fields stay at the top level so a partial update such as
//! `{"status": "discharged"}` addresses them directly.

use super::{require_text, CollectionKind, Priority, Record};
use crate::state::MedicalState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Admission status of a patient.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatientStatus {
    #[default]
    Active,
    Discharged,
    Transferred,
    Emergency,
}

/// Identity and demographic data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Demographics {
    pub first_name: String,
    pub last_name: String,
    /// Identity document type, e.g. `CC` (cédula de ciudadanía), `TI`, `CE`, `PA`.
    pub document_type: String,
    pub document_number: String,
    /// ISO 8601 date (`YYYY-MM-DD`).
    pub birth_date: String,
    pub gender: String,
    pub blood_type: String,
}

/// Health-insurance affiliation (EPS).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insurance {
    pub eps: String,
    /// Affiliation regime, e.g. `contributivo` or `subsidiado`.
    pub regime: String,
    pub policy_number: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocioDemographics {
    pub occupation: String,
    pub marital_status: String,
    pub education_level: String,
    /// Socioeconomic stratum (1-6).
    pub socioeconomic_stratum: Option<u8>,
    pub ethnicity: String,
}

/// Free-text medical intake captured at admission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalIntake {
    pub reason_for_consultation: String,
    pub symptoms: String,
    pub allergies: String,
    pub current_medications: String,
    pub medical_history: String,
}

/// Metadata of a document attached to the patient record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub insurance: Insurance,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
    #[serde(default)]
    pub socio_demographic: SocioDemographics,
    #[serde(default)]
    pub intake: MedicalIntake,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub bed: Option<String>,
    #[serde(default)]
    pub assigned_doctor: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub admission_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discharge_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.demographics.first_name.trim(),
            self.demographics.last_name.trim()
        )
        .trim()
        .to_string()
    }

    /// Admitted patients are those still under the hospital's care.
    pub fn is_admitted(&self) -> bool {
        matches!(self.status, PatientStatus::Active | PatientStatus::Emergency)
    }
}

/// Intake form submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientDraft {
    pub demographics: Demographics,
    pub insurance: Insurance,
    pub contact: ContactInfo,
    pub emergency_contact: EmergencyContact,
    pub socio_demographic: SocioDemographics,
    pub intake: MedicalIntake,
    pub status: Option<PatientStatus>,
    pub room: Option<String>,
    pub bed: Option<String>,
    pub assigned_doctor: Option<String>,
    pub priority: Option<Priority>,
    pub attachments: Vec<Attachment>,
}

/// Partial update of the admission fields of a patient.
///
/// Only the fields that are `Some` are merged into the stored record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_doctor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intake: Option<MedicalIntake>,
}

impl Record for Patient {
    type Draft = PatientDraft;
    const KIND: CollectionKind = CollectionKind::Patients;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: PatientDraft) -> Self {
        let status = draft.status.unwrap_or_default();
        let admitted = matches!(status, PatientStatus::Active | PatientStatus::Emergency);
        Self {
            id,
            demographics: draft.demographics,
            insurance: draft.insurance,
            contact: draft.contact,
            emergency_contact: draft.emergency_contact,
            socio_demographic: draft.socio_demographic,
            intake: draft.intake,
            status,
            room: draft.room,
            bed: draft.bed,
            assigned_doctor: draft.assigned_doctor,
            priority: draft.priority.unwrap_or_default(),
            admission_date: admitted.then_some(now),
            discharge_date: None,
            attachments: draft.attachments,
            created_at: now,
        }
    }

    fn validate(&self) -> Result<(), String> {
        require_text("demographics.firstName", &self.demographics.first_name)?;
        require_text("demographics.lastName", &self.demographics.last_name)?;
        if let Some(stratum) = self.socio_demographic.socioeconomic_stratum {
            if !(1..=6).contains(&stratum) {
                return Err(format!(
                    "socioDemographic.socioeconomicStratum must be between 1 and 6, got {stratum}"
                ));
            }
        }
        Ok(())
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.patients
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.patients
    }
}
