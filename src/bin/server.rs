//! CardioPredict Server - heart disease risk classifier over HTTP
//!
//! Obtains the model once at startup (persisted artifact, else fit from the
//! reference dataset, else the built-in fallback records) and then serves the
//! name -> assessment -> results flow plus `POST /predict`.
//!
//! # Usage
//! ```sh
//! DATASET_PATH=heart.csv PORT=5000 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `MODEL_PATH` - Persisted model artifact (default: data/model/heart_disease_model.json)
//! - `DATASET_PATH` - Reference dataset CSV (default: heart.csv)
//! - `CLASSIFIER_ALGORITHM` - `linear` or `tree_ensemble` (default: tree_ensemble)
//! - `USE_SCALING` - Fit a feature scaler (default: true)
//! - `BIND_ADDRESS` / `PORT` - Listener (default: 0.0.0.0:5000)
//! - `SESSION_TTL_SECS` - Session lifetime (default: 3600)

use anyhow::{Context, Result};
use cardiorisk::application::ml::model_provider::ModelProvider;
use cardiorisk::config::Config;
use cardiorisk::domain::session::SessionRepository;
use cardiorisk::infrastructure::repositories::InMemorySessionRepository;
use cardiorisk::interfaces::http::{AppState, router};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("CardioPredict Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Algorithm={}, Scaling={}, Seed={}, Model={:?}",
        config.model.algorithm,
        config.model.use_scaling,
        config.model.random_seed,
        config.model.model_path
    );

    // Fit-or-load runs once, before the listener binds
    info!("Loading and training model...");
    let provider = ModelProvider::new(config.model.clone());
    let (inference, source) = provider
        .obtain()
        .context("Model provider failed; refusing to serve without a model")?;
    info!(
        model = inference.model_name(),
        scaled = inference.uses_scaling(),
        source = ?source,
        "Model ready!"
    );

    let sessions = Arc::new(InMemorySessionRepository::new(chrono::Duration::seconds(
        config.server.session_ttl_secs,
    )));

    let sweeper = sessions.clone();
    let sweep_every = Duration::from_secs(config.server.session_sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            match sweeper.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Expired sessions purged"),
                Err(e) => error!(error = %e, "Session purge failed"),
            }
        }
    });

    let state = AppState::new(Arc::new(inference), sessions);
    let app = router(state);

    let address = config.server.socket_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received. Exiting...");
        })
        .await?;

    Ok(())
}
