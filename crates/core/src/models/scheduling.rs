//! Appointments and telemedicine sessions.

use super::{require_text, CollectionKind, Record};
use crate::constants::TELEMEDICINE_BASE_URL;
use crate::state::MedicalState;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// APPOINTMENTS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Open appointments still need to happen.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed | AppointmentStatus::InProgress
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    pub doctor: String,
    #[serde(default)]
    pub department: String,
    pub date: NaiveDate,
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Appointment type, e.g. `consultation` or `follow-up`.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_duration() -> u32 {
    30
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    pub doctor: String,
    #[serde(default)]
    pub department: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Appointment {
    type Draft = AppointmentDraft;
    const KIND: CollectionKind = CollectionKind::Appointments;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: AppointmentDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            patient_name: draft.patient_name,
            doctor: draft.doctor,
            department: draft.department,
            date: draft.date,
            time: draft.time,
            duration_minutes: draft.duration_minutes.unwrap_or_else(default_duration),
            kind: draft.kind,
            status: AppointmentStatus::Scheduled,
            notes: draft.notes,
            created_at: now,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        Some(&self.patient_id)
    }

    fn validate(&self) -> Result<(), String> {
        require_text("patientId", &self.patient_id)?;
        require_text("doctor", &self.doctor)?;
        NaiveTime::parse_from_str(&self.time, "%H:%M")
            .map_err(|_| format!("time must be HH:MM, got '{}'", self.time))?;
        Ok(())
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.appointments
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.appointments
    }
}

// ============================================================================
// TELEMEDICINE
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TelemedicineStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemedicineSession {
    pub id: String,
    pub patient_id: String,
    pub doctor: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    pub meeting_url: String,
    #[serde(default)]
    pub status: TelemedicineStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemedicineDraft {
    pub patient_id: String,
    pub doctor: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// A meeting room is allocated when none is supplied.
    #[serde(default)]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for TelemedicineSession {
    type Draft = TelemedicineDraft;
    const KIND: CollectionKind = CollectionKind::TelemedicineSessions;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: TelemedicineDraft) -> Self {
        let meeting_url = draft.meeting_url.unwrap_or_else(|| {
            format!("{TELEMEDICINE_BASE_URL}/{}", Uuid::new_v4().simple())
        });
        Self {
            id,
            patient_id: draft.patient_id,
            doctor: draft.doctor,
            scheduled_at: draft.scheduled_at,
            duration_minutes: draft.duration_minutes.unwrap_or_else(default_duration),
            meeting_url,
            status: TelemedicineStatus::Scheduled,
            notes: draft.notes,
            created_at: now,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        Some(&self.patient_id)
    }

    fn validate(&self) -> Result<(), String> {
        require_text("patientId", &self.patient_id)?;
        require_text("doctor", &self.doctor)?;
        require_text("meetingUrl", &self.meeting_url)
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.telemedicine_sessions
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.telemedicine_sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment_draft(time: &str) -> AppointmentDraft {
        AppointmentDraft {
            patient_id: "p1".into(),
            patient_name: "Lucía Moreno".into(),
            doctor: "Dra. Salazar".into(),
            department: "Cardiología".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            time: time.into(),
            duration_minutes: None,
            kind: "consultation".into(),
            notes: None,
        }
    }

    #[test]
    fn test_appointment_defaults() {
        let appointment = Appointment::from_draft("1".into(), Utc::now(), appointment_draft("09:30"));

        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.duration_minutes, 30);
        assert!(appointment.validate().is_ok());
    }

    #[test]
    fn test_appointment_rejects_malformed_time() {
        let appointment = Appointment::from_draft("1".into(), Utc::now(), appointment_draft("9.30am"));
        assert!(appointment.validate().is_err());
    }

    #[test]
    fn test_open_statuses() {
        assert!(AppointmentStatus::Confirmed.is_open());
        assert!(!AppointmentStatus::Cancelled.is_open());
        assert!(!AppointmentStatus::Completed.is_open());
    }

    #[test]
    fn test_telemedicine_allocates_meeting_url() {
        let session = TelemedicineSession::from_draft(
            "1".into(),
            Utc::now(),
            TelemedicineDraft {
                patient_id: "p1".into(),
                doctor: "Dr. Ríos".into(),
                scheduled_at: Utc::now(),
                duration_minutes: Some(20),
                meeting_url: None,
                notes: None,
            },
        );

        assert!(session.meeting_url.starts_with(TELEMEDICINE_BASE_URL));
        assert_eq!(session.duration_minutes, 20);
        assert_eq!(
            serde_json::to_string(&TelemedicineStatus::NoShow).unwrap(),
            "\"no-show\""
        );
    }
}
