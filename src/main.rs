use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use hms_core::{
    AutoSave, CoreConfig, FileKeyValueStore, MedicalStore, StateRepository, StoreHandle,
    config::{
        autosave_debounce_from_env_value, data_dir_from_env_value, storage_key_from_env_value,
        storage_quota_from_env_value,
    },
    seed::VitalsSimulator,
};

/// Reads `HMS_VITALS_SIM_INTERVAL_SECS`; unset, blank or `0` disables the simulator.
fn simulator_interval_from_env_value(value: Option<String>) -> anyhow::Result<Option<Duration>> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let secs: u64 = value.trim().parse().map_err(|e| {
        anyhow::anyhow!("HMS_VITALS_SIM_INTERVAL_SECS must be a whole number of seconds: {e}")
    })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Main entry point for the HMS application
///
/// Loads the persisted medical state (falling back to sample data), serves it over the REST
/// API, writes changes back through the debounced auto-save, and optionally feeds simulated
/// vital signs for admitted patients.
///
/// # Environment Variables
/// - `HMS_DATA_DIR`: Directory holding the persisted record (default: "hospital_data")
/// - `HMS_STORAGE_KEY`: Key of the persisted record (default: "medical_data")
/// - `HMS_AUTOSAVE_DEBOUNCE_MS`: Quiet period before a write-back (default: 1000)
/// - `HMS_STORAGE_QUOTA_BYTES`: Maximum record size (default: unlimited)
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HMS_API_TOKEN`: Bearer token for protected routes (default: none, API open)
/// - `HMS_VITALS_SIM_INTERVAL_SECS`: Vital-signs simulation period (default: disabled)
///
/// # Returns
/// * `Ok(())` - If the server runs and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, loading or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var("HMS_DATA_DIR").ok()),
        storage_key_from_env_value(std::env::var("HMS_STORAGE_KEY").ok())?,
    )
    .with_autosave_debounce(autosave_debounce_from_env_value(
        std::env::var("HMS_AUTOSAVE_DEBOUNCE_MS").ok(),
    )?)
    .with_storage_quota(storage_quota_from_env_value(
        std::env::var("HMS_STORAGE_QUOTA_BYTES").ok(),
    )?);
    let rest_addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let api_token = std::env::var("HMS_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    let sim_interval =
        simulator_interval_from_env_value(std::env::var("HMS_VITALS_SIM_INTERVAL_SECS").ok())?;

    let kv = FileKeyValueStore::open(cfg.data_dir())?.with_quota(cfg.storage_quota_bytes());
    let repo = StateRepository::from_config(Arc::new(kv), &cfg);
    let outcome = repo.load()?;
    tracing::info!(
        "-- Loaded medical state from {:?} ({} patients, {} beds)",
        outcome.source,
        outcome.state.patients.len(),
        outcome.state.beds.len()
    );

    let handle = StoreHandle::new(MedicalStore::new(outcome.state));
    let autosave = AutoSave::spawn(handle.clone(), repo, cfg.autosave_debounce());

    let simulator = sim_interval.map(|every| {
        tracing::info!("-- Simulating vital signs every {:?}", every);
        VitalsSimulator::new().spawn(handle.clone(), every)
    });

    if api_token.is_none() {
        tracing::warn!("HMS_API_TOKEN not set; REST API is unauthenticated");
    }
    let app = router(AppState::new(handle, api_token));

    tracing::info!("-- Starting HMS REST API on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {:?}", e);
            }
        })
        .await?;

    tracing::info!("-- Shutting down");
    if let Some(simulator) = simulator {
        simulator.abort();
    }
    let stats = autosave.shutdown().await;
    tracing::info!(
        "-- Auto-save finished: {} writes, {} failures",
        stats.writes,
        stats.failures
    );

    Ok(())
}
