//! Anomaly detection and alert lifecycle
//!
//! This module provides:
//! - Z-score scoring of samples against the personal baseline
//! - Per-group coverage of which sub-metrics are checked
//! - Alert creation, snooze gating, retention and dismissal

mod alerter;
mod coverage;
mod detector;

pub use alerter::{AlertManager, AlertText, DEFAULT_ALERT_RETENTION};
pub use coverage::ChannelCoverage;
pub use detector::{is_anomaly, severity, z_score, Deviation, Direction, ZScoreDetector};
