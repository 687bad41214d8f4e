//! Derived read-only views over the store.
//!
//! Each query is a linear scan over one collection, recomputed on every call.

use super::MedicalStore;
use crate::models::*;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Headline figures for the hospital dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: usize,
    pub active_patients: usize,
    pub critical_patients: usize,
    pub todays_appointments: usize,
    pub upcoming_surgeries: usize,
    pub pending_lab_tests: usize,
    pub active_emergencies: usize,
    pub total_beds: usize,
    pub available_beds: usize,
    pub occupied_beds: usize,
    /// Occupied beds as a percentage of all beds; zero when there are no beds.
    pub bed_occupancy_rate: f64,
    pub unread_messages: usize,
    pub low_stock_items: usize,
    pub pending_admissions: usize,
}

impl MedicalStore {
    pub fn active_patients(&self) -> Vec<&Patient> {
        self.patients_by_status(PatientStatus::Active)
    }

    pub fn patients_by_status(&self, status: PatientStatus) -> Vec<&Patient> {
        self.all::<Patient>()
            .iter()
            .filter(|p| p.status == status)
            .collect()
    }

    /// Patients flagged as emergencies or triaged as critical.
    pub fn critical_patients(&self) -> Vec<&Patient> {
        self.all::<Patient>()
            .iter()
            .filter(|p| p.status == PatientStatus::Emergency || p.priority == Priority::Critical)
            .collect()
    }

    /// Case-insensitive match on name, document number or id.
    pub fn search_patients(&self, query: &str) -> Vec<&Patient> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.all::<Patient>().iter().collect();
        }
        self.all::<Patient>()
            .iter()
            .filter(|p| {
                p.full_name().to_lowercase().contains(&needle)
                    || p.demographics.document_number.contains(&needle)
                    || p.id == needle
            })
            .collect()
    }

    /// A patient's readings, oldest first.
    pub fn vitals_for_patient(&self, patient_id: &str) -> Vec<&VitalSigns> {
        let mut vitals: Vec<_> = self
            .all::<VitalSigns>()
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .collect();
        vitals.sort_by_key(|v| v.timestamp);
        vitals
    }

    pub fn latest_vitals(&self, patient_id: &str) -> Option<&VitalSigns> {
        self.all::<VitalSigns>()
            .iter()
            .filter(|v| v.patient_id == patient_id)
            .max_by_key(|v| v.timestamp)
    }

    pub fn medications_for_patient(&self, patient_id: &str) -> Vec<&Medication> {
        self.all::<Medication>()
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .collect()
    }

    pub fn active_medications(&self) -> Vec<&Medication> {
        self.all::<Medication>()
            .iter()
            .filter(|m| m.status == MedicationStatus::Active)
            .collect()
    }

    /// Appointments on `date`, ordered by time of day.
    ///
    /// The caller supplies "today" so results do not depend on the server's clock or zone.
    pub fn appointments_on(&self, date: NaiveDate) -> Vec<&Appointment> {
        let mut appointments: Vec<_> = self
            .all::<Appointment>()
            .iter()
            .filter(|a| a.date == date)
            .collect();
        appointments.sort_by(|a, b| a.time.cmp(&b.time));
        appointments
    }

    pub fn appointments_for_patient(&self, patient_id: &str) -> Vec<&Appointment> {
        self.all::<Appointment>()
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .collect()
    }

    /// Scheduled surgeries from `now` on, soonest first.
    pub fn upcoming_surgeries(&self, now: DateTime<Utc>) -> Vec<&Surgery> {
        let mut surgeries: Vec<_> = self
            .all::<Surgery>()
            .iter()
            .filter(|s| s.status == SurgeryStatus::Scheduled && s.scheduled_at >= now)
            .collect();
        surgeries.sort_by_key(|s| s.scheduled_at);
        surgeries
    }

    /// Pending tests, most urgent first.
    pub fn pending_lab_tests(&self) -> Vec<&LabTest> {
        let mut tests: Vec<_> = self
            .all::<LabTest>()
            .iter()
            .filter(|t| t.status == LabTestStatus::Pending)
            .collect();
        tests.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.ordered_at.cmp(&b.ordered_at)));
        tests
    }

    /// Emergencies that are not resolved yet.
    pub fn active_emergencies(&self) -> Vec<&Emergency> {
        self.all::<Emergency>()
            .iter()
            .filter(|e| e.status != EmergencyStatus::Resolved)
            .collect()
    }

    pub fn available_beds(&self) -> Vec<&Bed> {
        self.all::<Bed>().iter().filter(|b| b.is_available()).collect()
    }

    pub fn occupied_beds(&self) -> Vec<&Bed> {
        self.all::<Bed>().iter().filter(|b| b.is_occupied()).collect()
    }

    /// Unread messages, optionally only those addressed to `recipient`.
    pub fn unread_messages(&self, recipient: Option<&str>) -> Vec<&Message> {
        self.all::<Message>()
            .iter()
            .filter(|m| m.status == MessageStatus::Unread)
            .filter(|m| recipient.map_or(true, |r| m.recipient == r))
            .collect()
    }

    /// Items at or below their minimum stock, including those out of stock.
    pub fn low_stock_inventory(&self) -> Vec<&InventoryItem> {
        self.all::<InventoryItem>()
            .iter()
            .filter(|i| i.is_low())
            .collect()
    }

    /// Pending requests, highest priority first, then oldest first.
    pub fn pending_admission_requests(&self) -> Vec<&AdmissionRequest> {
        let mut requests: Vec<_> = self
            .all::<AdmissionRequest>()
            .iter()
            .filter(|r| r.status == AdmissionStatus::Pending)
            .collect();
        requests.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.requested_at.cmp(&b.requested_at))
        });
        requests
    }

    pub fn published_education_modules(&self) -> Vec<&EducationModule> {
        self.all::<EducationModule>()
            .iter()
            .filter(|m| m.status == EducationStatus::Published)
            .collect()
    }

    pub fn upcoming_telemedicine_sessions(&self, now: DateTime<Utc>) -> Vec<&TelemedicineSession> {
        let mut sessions: Vec<_> = self
            .all::<TelemedicineSession>()
            .iter()
            .filter(|s| s.status == TelemedicineStatus::Scheduled && s.scheduled_at >= now)
            .collect();
        sessions.sort_by_key(|s| s.scheduled_at);
        sessions
    }

    pub fn dashboard_stats(&self, today: NaiveDate, now: DateTime<Utc>) -> DashboardStats {
        let total_beds = self.all::<Bed>().len();
        let occupied_beds = self.occupied_beds().len();
        let bed_occupancy_rate = if total_beds == 0 {
            0.0
        } else {
            occupied_beds as f64 * 100.0 / total_beds as f64
        };

        DashboardStats {
            total_patients: self.all::<Patient>().len(),
            active_patients: self.active_patients().len(),
            critical_patients: self.critical_patients().len(),
            todays_appointments: self.appointments_on(today).len(),
            upcoming_surgeries: self.upcoming_surgeries(now).len(),
            pending_lab_tests: self.pending_lab_tests().len(),
            active_emergencies: self.active_emergencies().len(),
            total_beds,
            available_beds: self.available_beds().len(),
            occupied_beds,
            bed_occupancy_rate,
            unread_messages: self.unread_messages(None).len(),
            low_stock_items: self.low_stock_inventory().len(),
            pending_admissions: self.pending_admission_requests().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_state;
    use chrono::Duration;

    fn vitals(patient_id: &str, at: DateTime<Utc>, heart_rate: u32) -> VitalSignsDraft {
        VitalSignsDraft {
            patient_id: patient_id.into(),
            timestamp: Some(at),
            heart_rate,
            systolic_pressure: 118,
            diastolic_pressure: 76,
            temperature: 36.7,
            respiratory_rate: 15,
            oxygen_saturation: 97,
            ..Default::default()
        }
    }

    fn appointment(date: NaiveDate, time: &str) -> AppointmentDraft {
        AppointmentDraft {
            patient_id: "1".into(),
            patient_name: "Carlos Rodríguez".into(),
            doctor: "Dra. Salazar".into(),
            department: "Cardiología".into(),
            date,
            time: time.into(),
            duration_minutes: None,
            kind: "consultation".into(),
            notes: None,
        }
    }

    #[test]
    fn test_vitals_for_patient_are_chronological() {
        let mut store = MedicalStore::empty();
        let now = Utc::now();
        store.add_vital_signs(vitals("1", now, 80)).unwrap();
        store
            .add_vital_signs(vitals("1", now - Duration::minutes(10), 70))
            .unwrap();
        store.add_vital_signs(vitals("2", now, 90)).unwrap();

        let series = store.vitals_for_patient("1");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].heart_rate, 70);
        assert_eq!(series[1].heart_rate, 80);
        assert_eq!(store.latest_vitals("1").unwrap().heart_rate, 80);
        assert!(store.latest_vitals("3").is_none());
    }

    #[test]
    fn test_appointments_on_filters_by_date_and_orders_by_time() {
        let mut store = MedicalStore::empty();
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        store.add_appointment(appointment(today, "14:00")).unwrap();
        store.add_appointment(appointment(today, "08:30")).unwrap();
        store
            .add_appointment(appointment(today.succ_opt().unwrap(), "09:00"))
            .unwrap();

        let todays: Vec<_> = store
            .appointments_on(today)
            .iter()
            .map(|a| a.time.as_str())
            .collect();
        assert_eq!(todays, ["08:30", "14:00"]);
        assert_eq!(store.appointments_for_patient("1").len(), 3);
    }

    #[test]
    fn test_bed_queries_on_seed_data() {
        let store = MedicalStore::new(seed_state());

        assert_eq!(store.occupied_beds().len(), 2);
        assert_eq!(store.available_beds().len(), 2);
    }

    #[test]
    fn test_search_patients_matches_name_and_document() {
        let store = MedicalStore::new(seed_state());

        assert_eq!(store.search_patients("rodríguez").len(), 1);
        assert_eq!(store.search_patients("ANA").len(), 1);
        assert_eq!(store.search_patients("").len(), 2);
        assert!(store.search_patients("zzz").is_empty());
    }

    #[test]
    fn test_pending_lists_are_priority_ordered() {
        let mut store = MedicalStore::empty();
        store
            .add_lab_test(LabTestDraft {
                patient_id: "1".into(),
                test_name: "Perfil lipídico".into(),
                ..Default::default()
            })
            .unwrap();
        let stat = store
            .add_lab_test(LabTestDraft {
                patient_id: "2".into(),
                test_name: "Troponina".into(),
                priority: Some(LabPriority::Stat),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(store.pending_lab_tests()[0].id, stat.id);

        store
            .add_admission_request(AdmissionRequestDraft {
                patient_name: "Jorge Pérez".into(),
                priority: Some(Priority::Low),
                ..Default::default()
            })
            .unwrap();
        let urgent = store
            .add_admission_request(AdmissionRequestDraft {
                patient_name: "Marta Díaz".into(),
                priority: Some(Priority::Critical),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.pending_admission_requests()[0].id, urgent.id);
    }

    #[test]
    fn test_upcoming_excludes_past_and_cancelled() {
        let mut store = MedicalStore::empty();
        let now = Utc::now();
        let draft = |at| TelemedicineDraft {
            patient_id: "1".into(),
            doctor: "Dr. Ríos".into(),
            scheduled_at: at,
            duration_minutes: None,
            meeting_url: None,
            notes: None,
        };
        store
            .add_telemedicine_session(draft(now - Duration::hours(1)))
            .unwrap();
        let later = store
            .add_telemedicine_session(draft(now + Duration::hours(2)))
            .unwrap();
        let cancelled = store
            .add_telemedicine_session(draft(now + Duration::hours(1)))
            .unwrap();
        store
            .update::<TelemedicineSession>(&cancelled.id, serde_json::json!({ "status": "cancelled" }))
            .unwrap();

        let upcoming = store.upcoming_telemedicine_sessions(now);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, later.id);
    }

    #[test]
    fn test_dashboard_stats_on_seed_data() {
        let store = MedicalStore::new(seed_state());
        let now = Utc::now();

        let stats = store.dashboard_stats(now.date_naive(), now);

        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.total_beds, 5);
        assert_eq!(stats.occupied_beds, 2);
        assert!((stats.bed_occupancy_rate - 40.0).abs() < f64::EPSILON);
        assert_eq!(stats.pending_admissions, 0);
    }

    #[test]
    fn test_dashboard_stats_without_beds_has_zero_occupancy() {
        let store = MedicalStore::empty();
        let now = Utc::now();

        assert_eq!(store.dashboard_stats(now.date_naive(), now).bed_occupancy_rate, 0.0);
    }
}
