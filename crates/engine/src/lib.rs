//! Baseline and anomaly-detection engine for personal wellness monitoring
//!
//! This crate provides:
//! - Rolling per-channel sample buffers (blink rate, eye redness, emotion,
//!   environment)
//! - Baseline calibration from recent history
//! - Z-score anomaly scoring with per-channel thresholds
//! - Alert lifecycle (snooze, dismissal, bounded history)
//! - Providers for inference results and the room-sensor feed
//! - Health checks and observability

pub mod anomaly;
pub mod baseline;
pub mod clock;
pub mod demo;
pub mod error;
pub mod health;
pub mod ingest;
pub mod models;
pub mod observability;
pub mod persistence;
pub mod providers;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{EngineError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use persistence::{FileStore, KeyValueStore, MemoryStore};
pub use session::{MonitorSession, SessionSettings, SessionSnapshot};
