//! Sample data for a fresh store, and a simulated vital-signs feed.
//!
//! The seed functions are pure: every call returns the same records, so a state seeded twice
//! compares equal.

use crate::models::*;
use crate::state::MedicalState;
use crate::store::{MedicalStore, StoreHandle};
use crate::StoreResult;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::task::JoinHandle;

fn at(unix_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(unix_secs, 0).unwrap_or_default()
}

/// Two admitted patients, each occupying one of the sample beds.
pub fn sample_patients() -> Vec<Patient> {
    vec![
        Patient {
            id: "1".into(),
            demographics: Demographics {
                first_name: "Carlos".into(),
                last_name: "Rodríguez".into(),
                document_type: "CC".into(),
                document_number: "79845123".into(),
                birth_date: "1968-03-22".into(),
                gender: "male".into(),
                blood_type: "O+".into(),
            },
            insurance: Insurance {
                eps: "Nueva EPS".into(),
                regime: "contributivo".into(),
                policy_number: "NEPS-2024-118734".into(),
            },
            contact: ContactInfo {
                phone: "+57 310 555 0142".into(),
                email: "carlos.rodriguez@example.com".into(),
                address: "Calle 45 # 12-30".into(),
                city: "Bogotá".into(),
            },
            emergency_contact: EmergencyContact {
                name: "María Rodríguez".into(),
                phone: "+57 311 555 0198".into(),
                relationship: "esposa".into(),
            },
            socio_demographic: SocioDemographics {
                occupation: "Contador".into(),
                marital_status: "casado".into(),
                education_level: "universitario".into(),
                socioeconomic_stratum: Some(3),
                ethnicity: "ninguna".into(),
            },
            intake: MedicalIntake {
                reason_for_consultation: "Dolor torácico opresivo".into(),
                symptoms: "Dolor en el pecho irradiado al brazo izquierdo, sudoración".into(),
                allergies: "Penicilina".into(),
                current_medications: "Losartán 50 mg".into(),
                medical_history: "Hipertensión arterial".into(),
            },
            status: PatientStatus::Active,
            room: Some("101".into()),
            bed: Some("101-A".into()),
            assigned_doctor: Some("Dra. Laura Salazar".into()),
            priority: Priority::High,
            admission_date: Some(at(1_705_307_400)),
            discharge_date: None,
            attachments: Vec::new(),
            created_at: at(1_705_307_400),
        },
        Patient {
            id: "2".into(),
            demographics: Demographics {
                first_name: "Ana".into(),
                last_name: "Martínez".into(),
                document_type: "CC".into(),
                document_number: "1032456789".into(),
                birth_date: "1990-11-05".into(),
                gender: "female".into(),
                blood_type: "A+".into(),
            },
            insurance: Insurance {
                eps: "Sura EPS".into(),
                regime: "contributivo".into(),
                policy_number: "SURA-2024-552310".into(),
            },
            contact: ContactInfo {
                phone: "+57 315 555 0123".into(),
                email: "ana.martinez@example.com".into(),
                address: "Carrera 7 # 80-15".into(),
                city: "Medellín".into(),
            },
            emergency_contact: EmergencyContact {
                name: "Jorge Martínez".into(),
                phone: "+57 316 555 0177".into(),
                relationship: "hermano".into(),
            },
            socio_demographic: SocioDemographics {
                occupation: "Docente".into(),
                marital_status: "soltera".into(),
                education_level: "posgrado".into(),
                socioeconomic_stratum: Some(4),
                ethnicity: "ninguna".into(),
            },
            intake: MedicalIntake {
                reason_for_consultation: "Dificultad respiratoria".into(),
                symptoms: "Disnea, fiebre de 38.5 °C, tos productiva".into(),
                allergies: "Ninguna conocida".into(),
                current_medications: "Ninguno".into(),
                medical_history: "Asma en la infancia".into(),
            },
            status: PatientStatus::Active,
            room: Some("UCI".into()),
            bed: Some("UCI-01".into()),
            assigned_doctor: Some("Dr. Andrés Ríos".into()),
            priority: Priority::Critical,
            admission_date: Some(at(1_705_414_500)),
            discharge_date: None,
            attachments: Vec::new(),
            created_at: at(1_705_414_500),
        },
    ]
}

/// Five beds: two occupied by the sample patients, two available, one under maintenance.
pub fn sample_beds() -> Vec<Bed> {
    let bed = |id: &str,
               number: &str,
               room: &str,
               ward: &str,
               kind: BedKind,
               status: BedStatus,
               patient: Option<&str>| Bed {
        id: id.into(),
        number: number.into(),
        room: room.into(),
        ward: ward.into(),
        kind,
        status,
        patient_id: patient.map(str::to_string),
    };

    vec![
        bed("bed-101a", "101-A", "101", "Medicina Interna", BedKind::General, BedStatus::Occupied, Some("1")),
        bed("bed-101b", "101-B", "101", "Medicina Interna", BedKind::General, BedStatus::Available, None),
        bed("bed-uci01", "UCI-01", "UCI", "Cuidados Intensivos", BedKind::Icu, BedStatus::Occupied, Some("2")),
        bed("bed-uci02", "UCI-02", "UCI", "Cuidados Intensivos", BedKind::Icu, BedStatus::Maintenance, None),
        bed("bed-201a", "201-A", "201", "Pediatría", BedKind::Pediatric, BedStatus::Available, None),
    ]
}

/// Sample patients and beds; every other collection starts empty.
pub fn seed_state() -> MedicalState {
    MedicalState {
        patients: sample_patients(),
        beds: sample_beds(),
        ..Default::default()
    }
}

/// Generates plausible random vital-signs readings, standing in for bedside monitors.
#[derive(Debug)]
pub struct VitalsSimulator {
    rng: StdRng,
}

impl VitalsSimulator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A reproducible simulator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One reading within normal adult ranges.
    pub fn reading(&mut self, patient_id: &str) -> VitalSignsDraft {
        let systolic = self.rng.gen_range(105..=140);
        let diastolic = self.rng.gen_range(60..=90).min(systolic - 20);
        let temperature: f64 = self.rng.gen_range(36.0..37.6);

        VitalSignsDraft {
            patient_id: patient_id.to_string(),
            timestamp: None,
            heart_rate: self.rng.gen_range(60..=100),
            systolic_pressure: systolic,
            diastolic_pressure: diastolic,
            temperature: (temperature * 10.0).round() / 10.0,
            respiratory_rate: self.rng.gen_range(12..=20),
            oxygen_saturation: self.rng.gen_range(94..=100),
            blood_glucose: self
                .rng
                .gen_bool(0.3)
                .then(|| f64::from(self.rng.gen_range(70u32..=140))),
            recorded_by: Some("monitor".to_string()),
        }
    }

    /// Records one reading for every admitted patient.
    pub fn tick(&mut self, store: &mut MedicalStore) -> StoreResult<Vec<VitalSigns>> {
        let admitted: Vec<String> = store
            .all::<Patient>()
            .iter()
            .filter(|p| p.is_admitted())
            .map(|p| p.id.clone())
            .collect();

        admitted
            .iter()
            .map(|id| {
                let draft = self.reading(id);
                store.add_vital_signs(draft)
            })
            .collect()
    }

    /// Runs [`VitalsSimulator::tick`] every `every` until the task is aborted.
    pub fn spawn(mut self, handle: StoreHandle, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let result = {
                    let mut store = handle.write();
                    self.tick(&mut store)
                };
                match result {
                    Ok(readings) => tracing::debug!("simulated {} vital-signs readings", readings.len()),
                    Err(e) => tracing::error!("vital-signs simulation failed: {}", e),
                }
            }
        })
    }
}

impl Default for VitalsSimulator {
    fn default() -> Self {
        Self::new()
    }
}
