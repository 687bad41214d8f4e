//! Medications, surgeries and lab tests.

use super::{require_text, CollectionKind, Priority, Record};
use crate::state::MedicalState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// MEDICATIONS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MedicationStatus {
    #[default]
    Active,
    Completed,
    Discontinued,
    OnHold,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub patient_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub route: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub prescribed_by: String,
    #[serde(default)]
    pub status: MedicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationDraft {
    pub patient_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub route: String,
    /// Defaults to the day the prescription is recorded.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub prescribed_by: String,
    pub status: Option<MedicationStatus>,
    pub notes: Option<String>,
}

impl Record for Medication {
    type Draft = MedicationDraft;
    const KIND: CollectionKind = CollectionKind::Medications;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: MedicationDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            name: draft.name,
            dosage: draft.dosage,
            frequency: draft.frequency,
            route: draft.route,
            start_date: draft.start_date.unwrap_or_else(|| now.date_naive()),
            end_date: draft.end_date,
            prescribed_by: draft.prescribed_by,
            status: draft.status.unwrap_or_default(),
            notes: draft.notes,
            created_at: now,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        Some(&self.patient_id)
    }

    fn validate(&self) -> Result<(), String> {
        require_text("patientId", &self.patient_id)?;
        require_text("name", &self.name)?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err("endDate cannot be before startDate".into());
            }
        }
        Ok(())
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.medications
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.medications
    }
}

// ============================================================================
// SURGERIES
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurgeryStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Postponed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surgery {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    pub procedure: String,
    pub surgeon: String,
    #[serde(default)]
    pub operating_room: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub status: SurgeryStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgeryDraft {
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    pub procedure: String,
    pub surgeon: String,
    #[serde(default)]
    pub operating_room: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Surgery {
    type Draft = SurgeryDraft;
    const KIND: CollectionKind = CollectionKind::Surgeries;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: SurgeryDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            patient_name: draft.patient_name,
            procedure: draft.procedure,
            surgeon: draft.surgeon,
            operating_room: draft.operating_room,
            scheduled_at: draft.scheduled_at,
            estimated_duration_minutes: draft.estimated_duration_minutes,
            status: SurgeryStatus::Scheduled,
            priority: draft.priority.unwrap_or_default(),
            notes: draft.notes,
            created_at: now,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        Some(&self.patient_id)
    }

    fn validate(&self) -> Result<(), String> {
        require_text("patientId", &self.patient_id)?;
        require_text("procedure", &self.procedure)?;
        require_text("surgeon", &self.surgeon)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.surgeries
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.surgeries
    }
}

// ============================================================================
// LAB TESTS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabTestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabPriority {
    #[default]
    Routine,
    Urgent,
    Stat,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: String,
    pub patient_id: String,
    pub test_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub ordered_by: String,
    pub ordered_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: LabPriority,
    #[serde(default)]
    pub status: LabTestStatus,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabTestDraft {
    pub patient_id: String,
    pub test_name: String,
    pub category: String,
    pub ordered_by: String,
    pub priority: Option<LabPriority>,
}

impl Record for LabTest {
    type Draft = LabTestDraft;
    const KIND: CollectionKind = CollectionKind::LabTests;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: LabTestDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            test_name: draft.test_name,
            category: draft.category,
            ordered_by: draft.ordered_by,
            ordered_at: now,
            priority: draft.priority.unwrap_or_default(),
            status: LabTestStatus::Pending,
            result: None,
            completed_at: None,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        Some(&self.patient_id)
    }

    fn validate(&self) -> Result<(), String> {
        require_text("patientId", &self.patient_id)?;
        require_text("testName", &self.test_name)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.lab_tests
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.lab_tests
    }
}
