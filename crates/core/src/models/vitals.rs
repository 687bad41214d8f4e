//! Vital-sign readings.
//!
//! Readings form an append-only time series per patient: once recorded, a reading is never
//! changed.

use super::{require_text, CollectionKind, Record};
use crate::state::MedicalState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub id: String,
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    /// Beats per minute.
    pub heart_rate: u32,
    /// mmHg.
    pub systolic_pressure: u32,
    /// mmHg.
    pub diastolic_pressure: u32,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Breaths per minute.
    pub respiratory_rate: u32,
    /// SpO2 percentage.
    pub oxygen_saturation: u32,
    /// mg/dL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_glucose: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
}

impl VitalSigns {
    /// Returns the reasons this reading falls outside the alerting thresholds.
    pub fn alerts(&self) -> Vec<String> {
        let mut alerts = Vec::new();

        if self.heart_rate > 120 {
            alerts.push(format!("High heart rate: {} bpm", self.heart_rate));
        } else if self.heart_rate < 50 {
            alerts.push(format!("Low heart rate: {} bpm", self.heart_rate));
        }
        if self.oxygen_saturation < 92 {
            alerts.push(format!(
                "Low oxygen saturation: {}%",
                self.oxygen_saturation
            ));
        }
        if self.systolic_pressure >= 180 || self.diastolic_pressure >= 120 {
            alerts.push(format!(
                "Hypertensive crisis: {}/{} mmHg",
                self.systolic_pressure, self.diastolic_pressure
            ));
        } else if self.systolic_pressure < 90 {
            alerts.push(format!(
                "Hypotension: {}/{} mmHg",
                self.systolic_pressure, self.diastolic_pressure
            ));
        }
        if self.temperature >= 39.0 {
            alerts.push(format!("Fever: {:.1} °C", self.temperature));
        } else if self.temperature < 35.0 {
            alerts.push(format!("Hypothermia: {:.1} °C", self.temperature));
        }

        alerts
    }

    pub fn is_critical(&self) -> bool {
        !self.alerts().is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalSignsDraft {
    pub patient_id: String,
    /// Defaults to the time the reading is recorded.
    pub timestamp: Option<DateTime<Utc>>,
    pub heart_rate: u32,
    pub systolic_pressure: u32,
    pub diastolic_pressure: u32,
    pub temperature: f64,
    pub respiratory_rate: u32,
    pub oxygen_saturation: u32,
    pub blood_glucose: Option<f64>,
    pub recorded_by: Option<String>,
}

impl Record for VitalSigns {
    type Draft = VitalSignsDraft;
    const KIND: CollectionKind = CollectionKind::VitalSigns;
    const APPEND_ONLY: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, now: DateTime<Utc>, draft: VitalSignsDraft) -> Self {
        Self {
            id,
            patient_id: draft.patient_id,
            timestamp: draft.timestamp.unwrap_or(now),
            heart_rate: draft.heart_rate,
            systolic_pressure: draft.systolic_pressure,
            diastolic_pressure: draft.diastolic_pressure,
            temperature: draft.temperature,
            respiratory_rate: draft.respiratory_rate,
            oxygen_saturation: draft.oxygen_saturation,
            blood_glucose: draft.blood_glucose,
            recorded_by: draft.recorded_by,
        }
    }

    fn patient_id(&self) -> Option<&str> {
        Some(&self.patient_id)
    }

    fn validate(&self) -> Result<(), String> {
        require_text("patientId", &self.patient_id)?;
        if self.oxygen_saturation > 100 {
            return Err(format!(
                "oxygenSaturation cannot exceed 100%, got {}",
                self.oxygen_saturation
            ));
        }
        if !(20.0..=45.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 20 and 45 °C, got {}",
                self.temperature
            ));
        }
        if self.diastolic_pressure >= self.systolic_pressure {
            return Err("diastolicPressure must be lower than systolicPressure".into());
        }
        Ok(())
    }

    fn collection(state: &MedicalState) -> &Vec<Self> {
        &state.vital_signs
    }

    fn collection_mut(state: &mut MedicalState) -> &mut Vec<Self> {
        &mut state.vital_signs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(heart_rate: u32, spo2: u32, temperature: f64) -> VitalSigns {
        VitalSigns::from_draft(
            "1".into(),
            Utc::now(),
            VitalSignsDraft {
                patient_id: "p1".into(),
                heart_rate,
                systolic_pressure: 120,
                diastolic_pressure: 80,
                temperature,
                respiratory_rate: 16,
                oxygen_saturation: spo2,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_normal_reading_has_no_alerts() {
        let vitals = reading(72, 98, 36.8);
        assert!(vitals.alerts().is_empty());
        assert!(!vitals.is_critical());
        assert!(vitals.validate().is_ok());
    }

    #[test]
    fn test_abnormal_reading_reports_each_alert() {
        let vitals = reading(135, 88, 39.4);
        let alerts = vitals.alerts();

        assert_eq!(alerts.len(), 3);
        assert!(alerts[0].contains("High heart rate"));
        assert!(alerts[1].contains("oxygen"));
        assert!(alerts[2].contains("Fever"));
    }

    #[test]
    fn test_validate_rejects_impossible_values() {
        assert!(reading(72, 101, 36.8).validate().is_err());
        assert!(reading(72, 98, 0.0).validate().is_err());

        let mut inverted = reading(72, 98, 36.8);
        inverted.diastolic_pressure = 130;
        assert!(inverted.validate().is_err());
    }
}
