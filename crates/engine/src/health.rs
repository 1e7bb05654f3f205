//! Health reporting for the wellness agent
//!
//! Tracks the state of each collaborator the session depends on. External
//! failures never take the engine down, so they surface as `degraded`; only
//! an unusable settings store is reported `unhealthy`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::providers::FeedStatus;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Working on stale or synthetic data
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Epoch milliseconds
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn healthy() -> Self {
        Self::with(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with(ComponentStatus::Unhealthy, Some(message.into()))
    }

    /// Sensor feed health from the session's last fetch
    pub fn from_feed_status(status: &FeedStatus) -> Self {
        match &status.last_error {
            Some(error) => Self::degraded(format!("last fetch failed: {error}")),
            None => Self::healthy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|h| h.status)
            .fold(ComponentStatus::Healthy, |worst, status| match (worst, status) {
                (ComponentStatus::Unhealthy, _) | (_, ComponentStatus::Unhealthy) => {
                    ComponentStatus::Unhealthy
                }
                (ComponentStatus::Degraded, _) | (_, ComponentStatus::Degraded) => {
                    ComponentStatus::Degraded
                }
                _ => ComponentStatus::Healthy,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const INGEST: &str = "ingest";
    pub const SENSOR_FEED: &str = "sensor_feed";
    pub const INFERENCE: &str = "inference";
    pub const STORAGE: &str = "storage";
}

#[derive(Debug, Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            ready: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn register(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    /// Refresh provider components from the latest session state
    pub async fn report_providers(&self, feed: &FeedStatus, inference_error: Option<&str>) {
        self.update(components::SENSOR_FEED, ComponentHealth::from_feed_status(feed))
            .await;
        match inference_error {
            Some(error) => {
                self.set_degraded(
                    components::INFERENCE,
                    format!("using fallback samples: {error}"),
                )
                .await
            }
            None => self.set_healthy(components::INFERENCE).await,
        }
    }

    /// Reflect the session's last settings write on the storage component
    ///
    /// A failed write degrades storage; a later successful write clears
    /// only that degradation, never an `unhealthy` set at startup.
    pub async fn report_storage(&self, write_error: Option<&str>) {
        let mut components = self.components.write().await;
        let current = components.get(components::STORAGE).map(|h| h.status);
        match (write_error, current) {
            (_, Some(ComponentStatus::Unhealthy)) => {}
            (Some(error), _) => {
                components.insert(
                    components::STORAGE.to_string(),
                    ComponentHealth::degraded(format!("settings write failed: {error}")),
                );
            }
            (None, Some(ComponentStatus::Degraded)) => {
                components.insert(components::STORAGE.to_string(), ComponentHealth::healthy());
            }
            (None, _) => {}
        }
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let ready = *self.ready.read().await;
        let health = self.health().await;

        let reason = if !ready {
            Some("Session not yet loaded".to_string())
        } else if health.status == ComponentStatus::Unhealthy {
            Some("Critical component unhealthy".to_string())
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_state_is_healthy_but_not_ready() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("Session not yet loaded"));
    }

    #[tokio::test]
    async fn test_feed_error_degrades_without_blocking_readiness() {
        let registry = HealthRegistry::new();
        registry.register(components::INGEST).await;
        registry.set_ready(true).await;

        let feed = FeedStatus {
            last_error: Some("HTTP error: 503".to_string()),
            ..FeedStatus::default()
        };
        registry.report_providers(&feed, None).await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(
            health.components[components::INFERENCE].status,
            ComponentStatus::Healthy
        );
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_unhealthy_storage_blocks_readiness() {
        let registry = HealthRegistry::new();
        registry.register(components::STORAGE).await;
        registry.set_ready(true).await;
        registry
            .set_unhealthy(components::STORAGE, "data directory not writable")
            .await;

        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);
        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(!ComponentStatus::Unhealthy.is_operational());
    }

    #[tokio::test]
    async fn test_inference_fallback_is_degraded() {
        let registry = HealthRegistry::new();
        registry
            .report_providers(&FeedStatus::default(), Some("timeout"))
            .await;

        let health = registry.health().await;
        let inference = &health.components[components::INFERENCE];
        assert_eq!(inference.status, ComponentStatus::Degraded);
        assert!(inference.message.as_deref().unwrap_or_default().contains("timeout"));
    }

    #[tokio::test]
    async fn test_storage_write_failure_degrades_then_recovers() {
        let registry = HealthRegistry::new();
        registry.register(components::STORAGE).await;

        registry.report_storage(Some("disk full")).await;
        let health = registry.health().await;
        let storage = &health.components[components::STORAGE];
        assert_eq!(storage.status, ComponentStatus::Degraded);
        assert!(storage.message.as_deref().unwrap_or_default().contains("disk full"));

        registry.report_storage(None).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_storage_report_keeps_startup_failure() {
        let registry = HealthRegistry::new();
        registry
            .set_unhealthy(components::STORAGE, "data directory not writable")
            .await;

        registry.report_storage(None).await;
        registry.report_storage(Some("disk full")).await;

        let health = registry.health().await;
        assert_eq!(
            health.components[components::STORAGE].status,
            ComponentStatus::Unhealthy
        );
    }
}
