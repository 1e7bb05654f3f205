//! Observability infrastructure for the wellness engine
//!
//! Provides:
//! - Prometheus metrics (ingest volume, anomalies, calibration, feed health)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, Gauge, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::models::{AnomalyEvent, Baseline, Severity};

/// Histogram buckets for sensor feed fetch latency (in seconds)
const FETCH_LATENCY_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    samples_ingested: IntCounterVec,
    anomalies_detected: IntCounterVec,
    alerts_active: IntGauge,
    calibration_progress: Gauge,
    baseline_calibrated: IntGauge,
    persistence_errors: IntCounter,
    sensor_feed_errors: IntCounter,
    inference_fallbacks: IntCounter,
    sensor_fetch_latency_seconds: Histogram,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            samples_ingested: register_int_counter_vec!(
                "wellness_samples_ingested_total",
                "Samples appended to the rolling buffers",
                &["channel"]
            )
            .expect("Failed to register samples_ingested"),

            anomalies_detected: register_int_counter_vec!(
                "wellness_anomalies_detected_total",
                "Alerts raised by the anomaly detector",
                &["type", "severity"]
            )
            .expect("Failed to register anomalies_detected"),

            alerts_active: register_int_gauge!(
                "wellness_alerts_active",
                "Alerts currently retained"
            )
            .expect("Failed to register alerts_active"),

            calibration_progress: register_gauge!(
                "wellness_calibration_progress_percent",
                "Progress of the running calibration window"
            )
            .expect("Failed to register calibration_progress"),

            baseline_calibrated: register_int_gauge!(
                "wellness_baseline_calibrated",
                "1 when a baseline is present, 0 otherwise"
            )
            .expect("Failed to register baseline_calibrated"),

            persistence_errors: register_int_counter!(
                "wellness_persistence_errors_total",
                "Failed writes to the settings store"
            )
            .expect("Failed to register persistence_errors"),

            sensor_feed_errors: register_int_counter!(
                "wellness_sensor_feed_errors_total",
                "Failed polls of the remote sensor feed"
            )
            .expect("Failed to register sensor_feed_errors"),

            inference_fallbacks: register_int_counter!(
                "wellness_inference_fallbacks_total",
                "Frames replaced with a synthetic sample after an inference failure"
            )
            .expect("Failed to register inference_fallbacks"),

            sensor_fetch_latency_seconds: register_histogram!(
                "wellness_sensor_fetch_latency_seconds",
                "Time spent fetching the remote sensor feed",
                FETCH_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register sensor_fetch_latency_seconds"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    pub fn inc_samples_ingested(&self, channel: &str) {
        self.inner()
            .samples_ingested
            .with_label_values(&[channel])
            .inc();
    }

    pub fn inc_anomalies_detected(&self, anomaly_type: &str, severity: Severity) {
        self.inner()
            .anomalies_detected
            .with_label_values(&[anomaly_type, &severity.to_string()])
            .inc();
    }

    pub fn set_alerts_active(&self, count: usize) {
        self.inner().alerts_active.set(count as i64);
    }

    pub fn set_calibration_progress(&self, percent: f64) {
        self.inner().calibration_progress.set(percent);
    }

    pub fn set_baseline_calibrated(&self, present: bool) {
        self.inner().baseline_calibrated.set(i64::from(present));
    }

    pub fn inc_persistence_errors(&self) {
        self.inner().persistence_errors.inc();
    }

    pub fn inc_sensor_feed_errors(&self) {
        self.inner().sensor_feed_errors.inc();
    }

    pub fn inc_inference_fallbacks(&self) {
        self.inner().inference_fallbacks.inc();
    }

    pub fn observe_sensor_fetch_latency(&self, duration_secs: f64) {
        self.inner()
            .sensor_fetch_latency_seconds
            .observe(duration_secs);
    }
}

/// Structured logger for session events
#[derive(Clone)]
pub struct StructuredLogger {
    session: String,
}

impl StructuredLogger {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }

    pub fn log_anomaly(&self, event: &AnomalyEvent, value: f64, z_score: f64) {
        match event.severity {
            Severity::High => {
                warn!(
                    event = "anomaly_detected",
                    session = %self.session,
                    alert_id = event.id,
                    anomaly_type = %event.anomaly_type,
                    severity = %event.severity,
                    value = value,
                    z_score = z_score,
                    message = %event.message,
                    "High severity anomaly detected"
                );
            }
            _ => {
                info!(
                    event = "anomaly_detected",
                    session = %self.session,
                    alert_id = event.id,
                    anomaly_type = %event.anomaly_type,
                    severity = %event.severity,
                    value = value,
                    z_score = z_score,
                    message = %event.message,
                    "Anomaly detected"
                );
            }
        }
    }

    pub fn log_calibration_started(&self, duration_ms: i64) {
        info!(
            event = "calibration_started",
            session = %self.session,
            duration_ms = duration_ms,
            "Calibration window started"
        );
    }

    pub fn log_calibration_completed(&self) {
        info!(
            event = "calibration_completed",
            session = %self.session,
            "Calibration window elapsed"
        );
    }

    pub fn log_calibration_cancelled(&self, progress: f64) {
        info!(
            event = "calibration_cancelled",
            session = %self.session,
            progress = progress,
            "Calibration window cancelled"
        );
    }

    pub fn log_baseline_saved(&self, baseline: &Baseline) {
        info!(
            event = "baseline_saved",
            session = %self.session,
            calibrated_at = baseline.calibrated_at,
            blink_rate_mean = baseline.blink_rate.mean,
            blink_rate_std = baseline.blink_rate.std,
            eye_redness_mean = baseline.eye_redness.mean,
            "Baseline saved"
        );
    }

    pub fn log_baseline_deleted(&self) {
        info!(
            event = "baseline_deleted",
            session = %self.session,
            "Baseline deleted"
        );
    }

    pub fn log_persistence_failure(&self, key: &str, error: &str) {
        warn!(
            event = "persistence_failed",
            session = %self.session,
            key = %key,
            error = %error,
            "Failed to persist value, keeping in-memory state"
        );
    }

    pub fn log_sensor_feed_error(&self, error: &str) {
        warn!(
            event = "sensor_feed_error",
            session = %self.session,
            error = %error,
            "Sensor feed fetch failed, retaining last known values"
        );
    }

    pub fn log_inference_fallback(&self, error: &str) {
        warn!(
            event = "inference_fallback",
            session = %self.session,
            error = %error,
            "Inference failed, substituting synthetic sample"
        );
    }

    pub fn log_startup(&self, version: &str, has_baseline: bool) {
        info!(
            event = "startup",
            session = %self.session,
            version = %version,
            has_baseline = has_baseline,
            "Wellness agent starting"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "shutdown",
            session = %self.session,
            reason = %reason,
            "Wellness agent shutting down"
        );
    }
}
