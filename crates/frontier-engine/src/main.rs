//! Frontier Tower engine binary.
//!
//! Wires the tower store, camera frame loop, pulse scheduler, optional
//! push channel, and snapshot API together, then serves until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `frontier-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the HTTP pulse source
//! 4. Start the tower runtime (layout, store, camera, scheduler)
//! 5. Spawn the push listener when enabled
//! 6. Serve the snapshot API until shutdown
//! 7. Stop the scheduler and frame task

mod error;
mod pulse;
mod push;

use std::path::Path;
use std::sync::Arc;

use frontier_core::config::{LoggingConfig, TowerConfig};
use frontier_core::runtime::TowerRuntime;
use frontier_observer::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::pulse::HttpPulseSource;
use crate::push::run_push_listener;

const CONFIG_PATH: &str = "frontier-config.yaml";

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let (config, from_file) = load_config()?;
    init_tracing(&config.logging);

    info!(
        config_file = from_file,
        poll_interval_ms = config.scheduler.poll_interval_ms,
        pulse_url = config.pulse.base_url,
        push_enabled = config.push.enabled,
        "frontier-engine starting"
    );

    let source = HttpPulseSource::new(&config.pulse)?;
    let runtime = TowerRuntime::start(&config, source).await;

    let push_task = if config.push.enabled {
        info!(
            nats_url = config.push.nats_url,
            subject = config.push.subject,
            "Starting push listener"
        );
        Some(tokio::spawn(run_push_listener(
            config.push.clone(),
            runtime.tower().clone(),
        )))
    } else {
        None
    };

    let state = Arc::new(AppState::new(
        runtime.tower().clone(),
        runtime.camera().clone(),
    ));
    let served =
        frontier_observer::start_server(&config.observer, state, shutdown_signal()).await;

    if let Some(task) = push_task {
        task.abort();
    }
    runtime.shutdown().await;
    served?;

    info!("frontier-engine shutdown complete");
    Ok(())
}

/// Load `frontier-config.yaml` from the working directory.
///
/// A missing file yields defaults (with environment overrides applied).
fn load_config() -> Result<(TowerConfig, bool), EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok((TowerConfig::from_file(path)?, true))
    } else {
        Ok((TowerConfig::parse("")?, false))
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
