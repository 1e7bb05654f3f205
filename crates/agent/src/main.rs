//! Wellness Agent - personal baseline and anomaly-detection service
//!
//! Hosts a single monitoring session, polls the room-sensor feed and serves
//! the presentation API, health checks and Prometheus metrics.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wellness_agent::{api, config};
use wellness_engine::{
    demo,
    health::{components, HealthRegistry},
    observability::EngineMetrics,
    providers::{HttpDetectionProvider, SensorFeedClient, SensorPoller},
    FileStore, KeyValueStore, MonitorSession, SystemClock,
};

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting wellness-agent");

    let config = config::AgentConfig::load()?;
    info!(
        data_dir = %config.data_dir.display(),
        api_port = config.api_port,
        "Agent configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::INGEST).await;
    health_registry.register(components::SENSOR_FEED).await;
    health_registry.register(components::INFERENCE).await;
    health_registry.register(components::STORAGE).await;

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        // Session keeps running in memory; persisted state is unavailable
        warn!(error = %e, "Data directory not writable");
        health_registry
            .set_unhealthy(components::STORAGE, format!("data directory: {e}"))
            .await;
    }

    let metrics = EngineMetrics::new();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
    let mut session = MonitorSession::load(store, Arc::new(SystemClock), config.session_settings());

    if session.sensor_feed_url().is_none() {
        if let Some(url) = &config.sensor_feed_url {
            session.set_sensor_feed_url(Some(url.clone()));
        }
    }
    if config.demo_data {
        demo::seed(&mut session);
        info!("Seeded session with demo history");
    }

    let logger = session.logger().clone();
    logger.log_startup(AGENT_VERSION, session.baseline().is_some());
    let session = Arc::new(Mutex::new(session));

    let feed_client = SensorFeedClient::new(config.http_timeout())
        .context("Failed to build sensor feed client")?;

    let mut app_state = api::AppState::new(
        session.clone(),
        health_registry.clone(),
        metrics,
        feed_client.clone(),
    );
    if let Some(inference) = config.inference_config() {
        let provider = HttpDetectionProvider::new(inference)
            .context("Failed to build inference provider")?;
        app_state = app_state.with_detector(Arc::new(provider));
        info!("Inference provider configured");
    }
    let app_state = Arc::new(app_state);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let poller = SensorPoller::new(session.clone(), feed_client, config.sensor_poll_interval());
    let poller_handle = tokio::spawn(poller.run(shutdown_tx.subscribe()));

    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            logger.log_shutdown("SIGINT received");
        }
        result = api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server stopped"),
                Ok(Err(e)) => {
                    logger.log_shutdown("API server failed");
                    return Err(e.context("API server failed"));
                }
                Err(e) => return Err(e).context("API server task panicked"),
            }
        }
    }

    let _ = shutdown_tx.send(());
    if let Err(e) = poller_handle.await {
        warn!(error = %e, "Sensor poller did not shut down cleanly");
    }
    info!("Shutting down");

    Ok(())
}
