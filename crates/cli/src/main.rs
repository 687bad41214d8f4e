use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use hms_core::{
    config::{data_dir_from_env_value, storage_key_from_env_value, storage_quota_from_env_value},
    models::{Bed, CollectionKind, Patient},
    seed::seed_state,
    CoreConfig, FileKeyValueStore, LoadSource, MedicalState, MedicalStore, StateRepository,
    StoreResult,
};
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital medical data store CLI")]
struct Cli {
    /// Data directory (overrides HMS_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Collection {
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

impl From<Collection> for CollectionKind {
    fn from(c: Collection) -> Self {
        match c {
            Collection::Patients => CollectionKind::Patients,
            Collection::VitalSigns => CollectionKind::VitalSigns,
            Collection::Medications => CollectionKind::Medications,
            Collection::Appointments => CollectionKind::Appointments,
            Collection::Surgeries => CollectionKind::Surgeries,
            Collection::LabTests => CollectionKind::LabTests,
            Collection::Emergencies => CollectionKind::Emergencies,
            Collection::Beds => CollectionKind::Beds,
            Collection::Reports => CollectionKind::Reports,
            Collection::Messages => CollectionKind::Messages,
            Collection::TelemedicineSessions => CollectionKind::TelemedicineSessions,
            Collection::Inventory => CollectionKind::Inventory,
            Collection::AdmissionRequests => CollectionKind::AdmissionRequests,
            Collection::EducationModules => CollectionKind::EducationModules,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the records of a collection, one JSON object per line
    List {
        collection: Collection,
        /// Only records referring to this patient
        #[arg(long)]
        patient: Option<String>,
    },
    /// Show one record
    Show { collection: Collection, id: String },
    /// Print the bed board
    Beds,
    /// Print dashboard figures
    Dashboard {
        /// Day used for today's appointments (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Write the sample data set
    Seed {
        /// Overwrite an existing record
        #[arg(long)]
        force: bool,
    },
    /// Discharge a patient and release their bed
    Discharge { patient_id: String },
    /// Mark a bed occupied by a patient
    AssignBed { bed_id: String, patient_id: String },
    /// Make a bed available again
    ReleaseBed { bed_id: String },
    /// Print a patient's vital-sign readings with alerts
    Vitals { patient_id: String },
}

/// Resolves the same storage settings as the server, with `--data-dir` taking precedence.
fn resolve_config(
    data_dir: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> StoreResult<CoreConfig> {
    let data_dir = data_dir.unwrap_or_else(|| data_dir_from_env_value(env("HMS_DATA_DIR")));
    let cfg = CoreConfig::new(data_dir, storage_key_from_env_value(env("HMS_STORAGE_KEY"))?)
        .with_storage_quota(storage_quota_from_env_value(env("HMS_STORAGE_QUOTA_BYTES"))?);
    Ok(cfg)
}

fn open_repository(cfg: &CoreConfig) -> StoreResult<StateRepository> {
    let store = FileKeyValueStore::open(cfg.data_dir())?.with_quota(cfg.storage_quota_bytes());
    Ok(StateRepository::from_config(Arc::new(store), cfg))
}

/// Records of one collection as JSON values, optionally filtered by `patientId`.
fn records_of(
    state: &MedicalState,
    kind: CollectionKind,
    patient: Option<&str>,
) -> Result<Vec<Value>, serde_json::Error> {
    let mut json = serde_json::to_value(state)?;
    let records = match json.get_mut(kind.as_str()).map(Value::take) {
        Some(Value::Array(records)) => records,
        _ => Vec::new(),
    };
    Ok(records
        .into_iter()
        .filter(|r| match patient {
            Some(patient) => r.get("patientId").and_then(Value::as_str) == Some(patient),
            None => true,
        })
        .collect())
}

fn describe_source(source: &LoadSource) -> String {
    match source {
        LoadSource::Persisted {
            last_updated: Some(at),
        } => format!("stored record (last updated {at})"),
        LoadSource::Persisted { last_updated: None } => "stored record".to_string(),
        LoadSource::Seeded { reason } => format!("sample data ({reason:?} record)"),
        LoadSource::Empty => "empty store".to_string(),
    }
}

fn print_bed(bed: &Bed, patients: &[Patient]) {
    let occupant = bed
        .patient_id
        .as_deref()
        .map(|id| {
            patients
                .iter()
                .find(|p| p.id == id)
                .map(|p| format!("{} ({})", p.full_name(), id))
                .unwrap_or_else(|| id.to_string())
        })
        .unwrap_or_default();
    println!(
        "{:<8} {:<6} {:<12} {:<12} {}",
        bed.number,
        bed.room,
        format!("{:?}", bed.kind),
        format!("{:?}", bed.status),
        occupant
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'hms --help' for commands");
        return Ok(());
    };

    let cfg = resolve_config(cli.data_dir, |name| std::env::var(name).ok())?;
    let repo = open_repository(&cfg)?;

    if let Commands::Seed { force } = command {
        let existing = repo.load()?;
        if matches!(existing.source, LoadSource::Persisted { .. }) && !force {
            eprintln!("A stored record already exists; use --force to overwrite it.");
            return Ok(());
        }
        let bytes = repo.save(&seed_state())?;
        println!("Wrote sample data ({bytes} bytes) under '{}'", repo.key());
        return Ok(());
    }

    let outcome = repo.load()?;
    eprintln!("Loaded {}", describe_source(&outcome.source));
    let mut store = MedicalStore::new(outcome.state);

    let mutated = match command {
        Commands::List {
            collection,
            patient,
        } => {
            let records = records_of(store.state(), collection.into(), patient.as_deref())?;
            if records.is_empty() {
                println!("No records found.");
            }
            for record in records {
                println!("{record}");
            }
            false
        }
        Commands::Show { collection, id } => {
            let kind = CollectionKind::from(collection);
            let records = records_of(store.state(), kind, None)?;
            match records
                .iter()
                .find(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str()))
            {
                Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                None => eprintln!("No {kind} record with id {id}"),
            }
            false
        }
        Commands::Beds => {
            let patients = store.all::<Patient>();
            for bed in store.all::<Bed>() {
                print_bed(bed, patients);
            }
            false
        }
        Commands::Dashboard { today } => {
            let now = Utc::now();
            let stats = store.dashboard_stats(today.unwrap_or_else(|| now.date_naive()), now);
            println!("{}", serde_json::to_string_pretty(&stats)?);
            false
        }
        Commands::Discharge { patient_id } => match store.discharge_patient(&patient_id) {
            Ok(patient) => {
                println!("Discharged {} ({})", patient.full_name(), patient.id);
                true
            }
            Err(e) => {
                eprintln!("Error discharging patient: {}", e);
                false
            }
        },
        Commands::AssignBed { bed_id, patient_id } => {
            match store.assign_bed(&bed_id, &patient_id) {
                Ok(bed) => {
                    println!("Bed {} assigned to patient {}", bed.number, patient_id);
                    true
                }
                Err(e) => {
                    eprintln!("Error assigning bed: {}", e);
                    false
                }
            }
        }
        Commands::ReleaseBed { bed_id } => match store.release_bed(&bed_id) {
            Ok(bed) => {
                println!("Bed {} is available", bed.number);
                true
            }
            Err(e) => {
                eprintln!("Error releasing bed: {}", e);
                false
            }
        },
        Commands::Vitals { patient_id } => {
            let readings = store.vitals_for_patient(&patient_id);
            if readings.is_empty() {
                println!("No vital signs recorded for patient {patient_id}.");
            }
            for v in readings {
                println!(
                    "{}  HR {} bpm  BP {}/{}  T {:.1} °C  RR {}  SpO2 {}%",
                    v.timestamp.format("%Y-%m-%d %H:%M"),
                    v.heart_rate,
                    v.systolic_pressure,
                    v.diastolic_pressure,
                    v.temperature,
                    v.respiratory_rate,
                    v.oxygen_saturation
                );
                for alert in v.alerts() {
                    println!("    ! {alert}");
                }
            }
            false
        }
        Commands::Seed { .. } => false,
    };

    if mutated {
        let bytes = repo.save(store.state())?;
        eprintln!("Saved {bytes} bytes under '{}'", repo.key());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names_match_storage_kinds() {
        for collection in Collection::value_variants() {
            let kind = CollectionKind::from(*collection);
            let name = collection.to_possible_value().unwrap();
            assert_eq!(
                name.get_name().replace('-', ""),
                kind.as_str().to_lowercase()
            );
        }
    }

    #[test]
    fn test_records_of_filters_by_patient() {
        let state = seed_state();

        let beds = records_of(&state, CollectionKind::Beds, None).unwrap();
        assert_eq!(beds.len(), 5);

        let held = records_of(&state, CollectionKind::Beds, Some("2")).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0]["number"], "UCI-01");
    }

    #[test]
    fn test_records_of_empty_collection() {
        let records = records_of(&seed_state(), CollectionKind::Reports, None).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_repository_enforces_configured_quota() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = resolve_config(Some(dir.path().to_path_buf()), |name| match name {
            "HMS_STORAGE_QUOTA_BYTES" => Some("64".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.storage_quota_bytes(), Some(64));

        let repo = open_repository(&cfg).unwrap();
        let err = repo.save(&seed_state()).unwrap_err();

        assert!(matches!(
            err,
            hms_core::StoreError::QuotaExceeded { quota: 64, .. }
        ));
    }

    #[test]
    fn test_resolve_config_defaults() {
        let cfg = resolve_config(None, |_| None).unwrap();

        assert_eq!(cfg.storage_quota_bytes(), None);
        assert_eq!(cfg.storage_key().as_str(), "medical_data");
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from(["hms", "list", "vital-signs", "--patient", "1"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::List {
                collection: Collection::VitalSigns,
                patient: Some(_)
            })
        ));

        let cli = Cli::try_parse_from(["hms", "--data-dir", "/tmp/x", "assign-bed", "b", "p"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Some(Commands::AssignBed { .. })));
    }
}
