//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API on its own over a seeded, in-memory store.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the HTTP surface.
//! Nothing is persisted; the workspace's main `hms-run` binary adds storage, auto-save and the
//! vitals simulator.

use api_rest::{router, AppState};
use hms_core::{seed::seed_state, MedicalStore, StoreHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the HMS REST API server
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `HMS_API_TOKEN`: Bearer token required by protected routes (default: none, API open)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let api_token = std::env::var("HMS_API_TOKEN").ok().filter(|t| !t.trim().is_empty());
    if api_token.is_none() {
        tracing::warn!("HMS_API_TOKEN not set; REST API is unauthenticated");
    }

    tracing::info!("-- Starting HMS REST API on {}", addr);

    let store = StoreHandle::new(MedicalStore::new(seed_state()));
    let app = router(AppState::new(store, api_token));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
