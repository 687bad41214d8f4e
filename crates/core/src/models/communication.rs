//! Emergencies, reports, internal messages and patient education.

use super::{require_text, CollectionKind, Priority, Record};
use crate::state::MedicalState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// EMERGENCIES
// ============================================================================

/// Hospital emergency codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmergencyCode {
    Blue,
    Red,
    Pink,
    Orange,
    Yellow,
    Gray,
    Silver,
}

impl EmergencyCode {
    pub fn description(self) -> &'static str {
        match self {
            EmergencyCode::Blue => "Cardiopulmonary arrest",
            EmergencyCode::Red => "Fire",
            EmergencyCode::Pink => "Infant or child abduction",
            EmergencyCode::Orange => "Mass casualty incident",
            EmergencyCode::Yellow => "Missing patient",
            EmergencyCode::Gray => "Combative person",
            EmergencyCode::Silver => "Armed intruder",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmergencyStatus {
    #[default]
    Active,
    Responding,
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emergency {
    pub id: String,
    pub code: EmergencyCode,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub reported_by: String,
    pub reported_at: DateTime<Utc>,
    #[serde(default)]
    pub status: EmergencyStatus,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyDraft {
    pub code: EmergencyCode,
    pub location: String,
    /// Defaults to the code's standard description.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub reported_by: String,
}

impl Record for Emergency {
    type Draft = EmergencyDraft;
    const KIND: CollectionKind = CollectionKind::Emergencies;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: EmergencyDraft) -> Self {
        Self {
            id,
            description: draft
                .description
                .unwrap_or_else(|| draft.code.description().to_string()),
            code: draft.code,
            location: draft.location,
            patient_id: draft.patient_id,
            reported_by: draft.reported_by,
            reported_at: now,
            status: EmergencyStatus::Active,
            resolved_at: None,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn validate(&self) -> Result<(), String> {
        require_text("location", &self.location)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.emergencies
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.emergencies
    }
}

// ============================================================================
// REPORTS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    #[default]
    Draft,
    Final,
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub title: String,
    /// Report type, e.g. `occupancy`, `epidemiological`, `discharge-summary`.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportDraft {
    pub title: String,
    pub kind: String,
    pub generated_by: String,
    pub summary: String,
    pub patient_id: Option<String>,
}

impl Record for Report {
    type Draft = ReportDraft;
    const KIND: CollectionKind = CollectionKind::Reports;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: ReportDraft) -> Self {
        Self {
            id,
            title: draft.title,
            kind: draft.kind,
            generated_by: draft.generated_by,
            generated_at: now,
            summary: draft.summary,
            patient_id: draft.patient_id,
            status: ReportStatus::Draft,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.reports
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.reports
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageStatus {
    #[default]
    Unread,
    Read,
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub status: MessageStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageDraft {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub priority: Option<Priority>,
    pub patient_id: Option<String>,
}

impl Record for Message {
    type Draft = MessageDraft;
    const KIND: CollectionKind = CollectionKind::Messages;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: MessageDraft) -> Self {
        Self {
            id,
            sender: draft.sender,
            recipient: draft.recipient,
            subject: draft.subject,
            body: draft.body,
            sent_at: now,
            priority: draft.priority.unwrap_or_default(),
            patient_id: draft.patient_id,
            status: MessageStatus::Unread,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    fn validate(&self) -> Result<(), String> {
        require_text("sender", &self.sender)?;
        require_text("recipient", &self.recipient)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.messages
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.messages
    }
}

// ============================================================================
// EDUCATION MODULES
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    /// Intended audience, e.g. `patients`, `nursing`, `caregivers`.
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: EducationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationModuleDraft {
    pub title: String,
    pub category: String,
    pub audience: String,
    pub duration_minutes: u32,
    pub description: String,
    pub status: Option<EducationStatus>,
}

impl Record for EducationModule {
    type Draft = EducationModuleDraft;
    const KIND: CollectionKind = CollectionKind::EducationModules;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: EducationModuleDraft) -> Self {
        Self {
            id,
            title: draft.title,
            category: draft.category,
            audience: draft.audience,
            duration_minutes: draft.duration_minutes,
            description: draft.description,
            status: draft.status.unwrap_or_default(),
            created_at: now,
        }
    }

    fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.education_modules
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.education_modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_description_defaults_to_code() {
        let emergency = Emergency::from_draft(
            "1".into(),
            Utc::now(),
            EmergencyDraft {
                code: EmergencyCode::Blue,
                location: "UCI, cama 3".into(),
                description: None,
                patient_id: Some("2".into()),
                reported_by: "Enf. Castro".into(),
            },
        );

        assert_eq!(emergency.description, "Cardiopulmonary arrest");
        assert_eq!(emergency.status, EmergencyStatus::Active);
        assert_eq!(emergency.patient_id(), Some("2"));
    }

    #[test]
    fn test_emergency_code_wire_names() {
        let code: EmergencyCode = serde_json::from_str("\"silver\"").unwrap();
        assert_eq!(code, EmergencyCode::Silver);
        assert!(serde_json::from_str::<EmergencyCode>("\"purple\"").is_err());
    }

    #[test]
    fn test_message_starts_unread_and_requires_parties() {
        let message = Message::from_draft(
            "1".into(),
            Utc::now(),
            MessageDraft {
                sender: "Dr. Ríos".into(),
                recipient: "".into(),
                ..Default::default()
            },
        );

        assert_eq!(message.status, MessageStatus::Unread);
        assert!(message.validate().unwrap_err().contains("recipient"));
    }

    #[test]
    fn test_report_and_education_defaults() {
        let report = Report::from_draft(
            "1".into(),
            Utc::now(),
            ReportDraft {
                title: "Ocupación semanal".into(),
                ..Default::default()
            },
        );
        assert_eq!(report.status, ReportStatus::Draft);

        let module = EducationModule::from_draft(
            "2".into(),
            Utc::now(),
            EducationModuleDraft {
                title: "Lavado de manos".into(),
                status: Some(EducationStatus::Published),
                ..Default::default()
            },
        );
        assert_eq!(module.status, EducationStatus::Published);
    }
}
