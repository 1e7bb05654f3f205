//! Monitoring session
//!
//! `MonitorSession` owns all per-user state: rolling buffers, live values,
//! baseline, thresholds, alert settings and alert history. Every mutation
//! takes `&mut self`; callers that share a session across tasks wrap it in a
//! `tokio::sync::Mutex` so mutations never interleave.
//!
//! Ingest order per sample: append to the channel buffer, refresh the live
//! snapshot, then score against the baseline. Scoring runs only when a
//! baseline exists, alerts are enabled and no snooze is in effect.

use serde::Serialize;
use std::sync::Arc;

use crate::anomaly::{AlertManager, ChannelCoverage, ZScoreDetector, DEFAULT_ALERT_RETENTION};
use crate::baseline::{
    derive_baseline, BaselineStore, CalibrationController, CalibrationStatus, CalibrationTick,
    DEFAULT_CALIBRATION_DURATION_MS, DEFAULT_CALIBRATION_TICK_MS, DEFAULT_CALIBRATION_WINDOW,
};
use crate::clock::Clock;
use crate::error::Result;
use crate::ingest::{SampleBuffers, SeriesSnapshot, DEFAULT_BUFFER_CAPACITY};
use crate::models::{
    AlertConfig, AnomalyEvent, AnomalyThresholds, Baseline, Channel, ChannelStat, EmotionSample,
    EmotionScores, EnvironmentalReading, EnvironmentalSample, LiveMetrics, LiveMetricsUpdate,
    MetricSample,
};
use crate::observability::{EngineMetrics, StructuredLogger};
use crate::persistence::{keys, load_json, save_json, KeyValueStore};
use crate::providers::{BlinkStats, FeedStatus, FrameAnalysis};

const MS_PER_MINUTE: i64 = 60_000;

/// Tunables for a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Samples retained per channel
    pub buffer_capacity: usize,
    /// Most recent samples per channel used to derive a baseline
    pub calibration_window: usize,
    /// Alerts retained, newest first
    pub alert_retention: usize,
    pub calibration_duration_ms: i64,
    pub calibration_tick_ms: i64,
    pub coverage: ChannelCoverage,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            calibration_window: DEFAULT_CALIBRATION_WINDOW,
            alert_retention: DEFAULT_ALERT_RETENTION,
            calibration_duration_ms: DEFAULT_CALIBRATION_DURATION_MS,
            calibration_tick_ms: DEFAULT_CALIBRATION_TICK_MS,
            coverage: ChannelCoverage::default(),
        }
    }
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub live: LiveMetrics,
    pub baseline: Option<Baseline>,
    pub calibration: CalibrationStatus,
    pub thresholds: AnomalyThresholds,
    pub alert_config: AlertConfig,
    pub snoozed: bool,
    pub alert_count: usize,
    pub sensor_feed_url: Option<String>,
    pub feed_status: FeedStatus,
    pub inference_error: Option<String>,
    /// Last settings write failure; cleared by the next successful write
    pub storage_error: Option<String>,
    pub now: i64,
}

pub struct MonitorSession {
    settings: SessionSettings,
    clock: Arc<dyn Clock>,
    store: Arc<dyn KeyValueStore>,
    baseline_store: BaselineStore,
    buffers: SampleBuffers,
    live: LiveMetrics,
    baseline: Option<Baseline>,
    thresholds: AnomalyThresholds,
    alert_config: AlertConfig,
    alerts: AlertManager,
    calibration: CalibrationController,
    detector: ZScoreDetector,
    sensor_feed_url: Option<String>,
    feed_status: FeedStatus,
    inference_error: Option<String>,
    storage_error: Option<String>,
    metrics: EngineMetrics,
    logger: StructuredLogger,
}

impl MonitorSession {
    /// Build a session from persisted state, falling back to defaults for
    /// anything missing or unreadable
    pub fn load(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Self {
        let baseline_store = BaselineStore::new(store.clone());
        let baseline = baseline_store.load_baseline();
        let thresholds = load_json(store.as_ref(), keys::THRESHOLDS).unwrap_or_default();
        let alert_config = load_json(store.as_ref(), keys::ALERT_CONFIG).unwrap_or_default();
        let sensor_feed_url: Option<String> = load_json(store.as_ref(), keys::SENSOR_FEED_URL);

        let metrics = EngineMetrics::new();
        metrics.set_baseline_calibrated(baseline.is_some());
        metrics.set_alerts_active(0);
        metrics.set_calibration_progress(0.0);

        let logger = StructuredLogger::new(format!("session-{}", clock.now_ms()));

        Self {
            buffers: SampleBuffers::new(settings.buffer_capacity),
            alerts: AlertManager::new(settings.alert_retention),
            calibration: CalibrationController::new(
                settings.calibration_duration_ms,
                settings.calibration_tick_ms,
            ),
            settings,
            clock,
            store,
            baseline_store,
            live: LiveMetrics::default(),
            baseline,
            thresholds,
            alert_config,
            detector: ZScoreDetector::new(),
            sensor_feed_url,
            feed_status: FeedStatus::default(),
            inference_error: None,
            storage_error: None,
            metrics,
            logger,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    // ------------------------------------------------------------------
    // Ingest
    // ------------------------------------------------------------------

    pub fn add_blink_rate_point(&mut self, value: f64) -> Vec<AnomalyEvent> {
        let sample = MetricSample::new(self.now(), value);
        self.buffers.blink_rate.push(sample);
        self.live.blink_rate = value;
        self.metrics.inc_samples_ingested(Channel::BlinkRate.as_str());

        let targets = self
            .baseline
            .map(|b| vec![(value, b.blink_rate)])
            .unwrap_or_default();
        self.score(Channel::BlinkRate, targets)
    }

    pub fn add_eye_redness_point(&mut self, value: f64) -> Vec<AnomalyEvent> {
        let sample = MetricSample::new(self.now(), value);
        self.buffers.eye_redness.push(sample);
        self.live.eye_redness = value;
        self.metrics.inc_samples_ingested(Channel::EyeRedness.as_str());

        let targets = self
            .baseline
            .map(|b| vec![(value, b.eye_redness)])
            .unwrap_or_default();
        self.score(Channel::EyeRedness, targets)
    }

    pub fn add_emotion_point(&mut self, emotions: EmotionScores) -> Vec<AnomalyEvent> {
        let sample = EmotionSample {
            timestamp: self.now(),
            emotions,
        };
        self.buffers.emotion.push(sample);
        self.live.emotion = emotions;
        self.metrics.inc_samples_ingested(Channel::Emotion.as_str());

        let targets = self
            .baseline
            .map(|b| self.settings.coverage.emotion_targets(&emotions, &b))
            .unwrap_or_default();
        self.score(Channel::Emotion, targets)
    }

    /// Append a reading observed now
    pub fn add_environmental_point(&mut self, reading: EnvironmentalReading) -> Vec<AnomalyEvent> {
        let sample = EnvironmentalSample {
            timestamp: self.now(),
            reading,
        };
        self.add_environmental_sample(sample)
    }

    /// Append a reading carrying its own (feed-supplied) timestamp
    pub fn add_environmental_sample(&mut self, sample: EnvironmentalSample) -> Vec<AnomalyEvent> {
        self.buffers.environmental.push(sample);
        self.live.environmental = sample.reading;
        self.metrics
            .inc_samples_ingested(Channel::Environmental.as_str());

        let targets = self
            .baseline
            .map(|b| {
                self.settings
                    .coverage
                    .environmental_targets(&sample.reading, &b)
            })
            .unwrap_or_default();
        self.score(Channel::Environmental, targets)
    }

    /// Overwrite live values without appending samples
    pub fn update_live_metrics(&mut self, update: LiveMetricsUpdate) {
        self.live.apply(update);
    }

    /// Score (value, stat) pairs for one channel and raise alerts
    fn score(&mut self, channel: Channel, targets: Vec<(f64, ChannelStat)>) -> Vec<AnomalyEvent> {
        if targets.is_empty() {
            return Vec::new();
        }

        let now = self.now();
        if AlertManager::should_suppress(&self.alert_config, now) {
            return Vec::new();
        }

        let threshold = self.thresholds.for_channel(channel);
        let mut raised = Vec::new();
        for (value, stat) in targets {
            let Some(deviation) = self.detector.detect(channel, value, &stat, threshold) else {
                continue;
            };
            let event = self.alerts.raise(&deviation, now);
            self.metrics
                .inc_anomalies_detected(channel.as_str(), event.severity);
            self.logger
                .log_anomaly(&event, deviation.value, deviation.z_score);
            raised.push(event);
        }

        if !raised.is_empty() {
            self.metrics.set_alerts_active(self.alerts.len());
        }
        raised
    }

    // ------------------------------------------------------------------
    // Provider results
    // ------------------------------------------------------------------

    pub fn apply_blink_stats(&mut self, stats: &BlinkStats) -> Vec<AnomalyEvent> {
        self.add_blink_rate_point(stats.blink_rate())
    }

    /// Ingest one analyzed frame; failures substitute a synthetic sample
    pub fn apply_frame_result(&mut self, result: Result<FrameAnalysis>) -> Vec<AnomalyEvent> {
        let analysis = match result {
            Ok(analysis) => {
                self.inference_error = None;
                analysis
            }
            Err(e) => {
                let message = e.to_string();
                self.metrics.inc_inference_fallbacks();
                self.logger.log_inference_fallback(&message);
                self.inference_error = Some(message);
                FrameAnalysis::fallback()
            }
        };

        let mut raised = self.add_emotion_point(analysis.emotions);
        raised.extend(self.add_eye_redness_point(analysis.eye_redness));
        raised
    }

    pub fn mark_feed_loading(&mut self) {
        self.feed_status.loading = true;
    }

    /// Apply a sensor feed fetch; only the latest record is appended
    ///
    /// On error the previous samples and live values are kept.
    pub fn apply_sensor_feed(
        &mut self,
        result: Result<Vec<EnvironmentalSample>>,
    ) -> Vec<AnomalyEvent> {
        self.feed_status.loading = false;
        match result {
            Ok(records) => {
                self.feed_status.last_error = None;
                self.feed_status.records = records.len();
                self.feed_status.last_success_at = Some(self.now());
                match records.last() {
                    Some(latest) => self.add_environmental_sample(*latest),
                    None => Vec::new(),
                }
            }
            Err(e) => {
                let message = e.to_string();
                self.metrics.inc_sensor_feed_errors();
                self.logger.log_sensor_feed_error(&message);
                self.feed_status.last_error = Some(message);
                Vec::new()
            }
        }
    }

    // ------------------------------------------------------------------
    // Calibration and baseline
    // ------------------------------------------------------------------

    /// Returns false when a window is already running
    pub fn start_calibration(&mut self) -> bool {
        let now = self.now();
        let started = self.calibration.start(now);
        if started {
            self.metrics.set_calibration_progress(0.0);
            self.logger
                .log_calibration_started(self.calibration.duration_ms());
        }
        started
    }

    pub fn tick_calibration(&mut self) -> CalibrationTick {
        let now = self.now();
        let tick = self.calibration.tick(now);
        match tick {
            CalibrationTick::Idle => {}
            CalibrationTick::InProgress { progress } => {
                self.metrics.set_calibration_progress(progress);
            }
            CalibrationTick::Completed => {
                self.metrics.set_calibration_progress(100.0);
                self.logger.log_calibration_completed();
            }
        }
        tick
    }

    pub fn cancel_calibration(&mut self) -> bool {
        let progress = self.calibration.progress();
        let cancelled = self.calibration.cancel();
        if cancelled {
            self.metrics.set_calibration_progress(0.0);
            self.logger.log_calibration_cancelled(progress);
        }
        cancelled
    }

    pub fn calibration_status(&self) -> CalibrationStatus {
        self.calibration.status()
    }

    /// Derive a baseline from recent samples and make it active
    ///
    /// Replaces any existing baseline.
    pub fn save_current_baseline(&mut self) -> Baseline {
        let baseline = derive_baseline(&self.buffers, self.settings.calibration_window, self.now());
        self.set_baseline(baseline);
        baseline
    }

    /// Install a baseline and persist it
    pub fn set_baseline(&mut self, baseline: Baseline) {
        self.baseline = Some(baseline);
        self.metrics.set_baseline_calibrated(true);
        match self.baseline_store.save_baseline(&baseline) {
            Ok(()) => {
                self.storage_error = None;
                self.logger.log_baseline_saved(&baseline);
            }
            Err(e) => self.persistence_failed(keys::BASELINE, &e.to_string()),
        }
    }

    pub fn delete_baseline(&mut self) {
        self.baseline = None;
        self.metrics.set_baseline_calibrated(false);
        match self.baseline_store.clear_baseline() {
            Ok(()) => {
                self.storage_error = None;
                self.logger.log_baseline_deleted();
            }
            Err(e) => self.persistence_failed(keys::BASELINE, &e.to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Stored as given; callers validate with [`AnomalyThresholds::validate`]
    pub fn set_anomaly_thresholds(&mut self, thresholds: AnomalyThresholds) {
        self.thresholds = thresholds;
        self.persist(keys::THRESHOLDS, &thresholds);
    }

    pub fn set_alert_config(&mut self, config: AlertConfig) {
        self.alert_config = config;
        self.persist(keys::ALERT_CONFIG, &config);
    }

    /// Suppress new alerts for `minutes` from now; returns the expiry
    pub fn snooze(&mut self, minutes: i64) -> i64 {
        let until = self
            .now()
            .saturating_add(minutes.saturating_mul(MS_PER_MINUTE));
        let config = AlertConfig {
            snooze_until: Some(until),
            ..self.alert_config
        };
        self.set_alert_config(config);
        until
    }

    pub fn dismiss_anomaly(&mut self, id: u64) -> bool {
        let removed = self.alerts.dismiss(id);
        if removed {
            self.metrics.set_alerts_active(self.alerts.len());
        }
        removed
    }

    /// Change the sensor feed URL; `None` stops polling
    pub fn set_sensor_feed_url(&mut self, url: Option<String>) {
        self.sensor_feed_url = url;
        self.feed_status = FeedStatus::default();
        let result = match &self.sensor_feed_url {
            Some(url) => save_json(self.store.as_ref(), keys::SENSOR_FEED_URL, url),
            None => self.store.remove(keys::SENSOR_FEED_URL),
        };
        match result {
            Ok(()) => self.storage_error = None,
            Err(e) => self.persistence_failed(keys::SENSOR_FEED_URL, &e.to_string()),
        }
    }

    fn persist<T: Serialize>(&mut self, key: &str, value: &T) {
        match save_json(self.store.as_ref(), key, value) {
            Ok(()) => self.storage_error = None,
            Err(e) => self.persistence_failed(key, &e.to_string()),
        }
    }

    fn persistence_failed(&mut self, key: &str, error: &str) {
        self.storage_error = Some(format!("{key}: {error}"));
        self.metrics.inc_persistence_errors();
        self.logger.log_persistence_failure(key, error);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn thresholds(&self) -> AnomalyThresholds {
        self.thresholds
    }

    pub fn alert_config(&self) -> AlertConfig {
        self.alert_config
    }

    /// Newest first
    pub fn alerts(&self) -> Vec<AnomalyEvent> {
        self.alerts.alerts()
    }

    pub fn live_metrics(&self) -> LiveMetrics {
        self.live
    }

    pub fn buffers(&self) -> &SampleBuffers {
        &self.buffers
    }

    pub fn series(&self, channel: Channel, limit: usize) -> SeriesSnapshot {
        self.buffers.series(channel, limit)
    }

    pub fn sensor_feed_url(&self) -> Option<&str> {
        self.sensor_feed_url.as_deref()
    }

    pub fn feed_status(&self) -> &FeedStatus {
        &self.feed_status
    }

    pub fn inference_error(&self) -> Option<&str> {
        self.inference_error.as_deref()
    }

    pub fn storage_error(&self) -> Option<&str> {
        self.storage_error.as_deref()
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub(crate) fn buffers_mut(&mut self) -> &mut SampleBuffers {
        &mut self.buffers
    }

    pub(crate) fn alert_manager_mut(&mut self) -> &mut AlertManager {
        &mut self.alerts
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.now();
        SessionSnapshot {
            live: self.live,
            baseline: self.baseline,
            calibration: self.calibration.status(),
            thresholds: self.thresholds,
            alert_config: self.alert_config,
            snoozed: self.alert_config.is_snoozed(now),
            alert_count: self.alerts.len(),
            sensor_feed_url: self.sensor_feed_url.clone(),
            feed_status: self.feed_status.clone(),
            inference_error: self.inference_error.clone(),
            storage_error: self.storage_error.clone(),
            now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::EngineError;
    use crate::models::Severity;
    use crate::persistence::MemoryStore;

    /// Store whose writes always fail
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(EngineError::Storage("unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(EngineError::Storage("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(EngineError::Storage("unavailable".to_string()))
        }
    }

    fn session_with(store: Arc<dyn KeyValueStore>) -> (MonitorSession, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let session = MonitorSession::load(store, clock.clone(), SessionSettings::default());
        (session, clock)
    }

    fn calibrated_session() -> (MonitorSession, Arc<ManualClock>) {
        let (mut session, clock) = session_with(Arc::new(MemoryStore::new()));
        for i in 0..30 {
            session.add_blink_rate_point(if i % 2 == 0 { 14.0 } else { 16.0 });
            session.add_eye_redness_point(if i % 2 == 0 { 0.25 } else { 0.35 });
            clock.advance(1_000);
        }
        session.save_current_baseline();
        (session, clock)
    }

    #[test]
    fn test_defaults_without_persisted_state() {
        let (session, _) = session_with(Arc::new(MemoryStore::new()));
        assert!(session.baseline().is_none());
        assert_eq!(session.thresholds(), AnomalyThresholds::default());
        assert_eq!(session.alert_config(), AlertConfig::default());
        assert_eq!(session.live_metrics(), LiveMetrics::default());
        assert!(session.sensor_feed_url().is_none());
    }

    #[test]
    fn test_settings_survive_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let (mut session, _) = session_with(store.clone());
        let thresholds = AnomalyThresholds {
            emotion: 3.5,
            ..AnomalyThresholds::default()
        };
        session.set_anomaly_thresholds(thresholds);
        session.set_sensor_feed_url(Some("http://sensors.local/data".to_string()));
        session.add_blink_rate_point(15.0);
        let baseline = session.save_current_baseline();

        let (reloaded, _) = session_with(store);
        assert_eq!(reloaded.thresholds(), thresholds);
        assert_eq!(reloaded.baseline(), Some(&baseline));
        assert_eq!(reloaded.sensor_feed_url(), Some("http://sensors.local/data"));
    }

    #[test]
    fn test_ingest_updates_live_metrics() {
        let (mut session, _) = session_with(Arc::new(MemoryStore::new()));
        session.add_blink_rate_point(18.0);
        session.add_emotion_point(EmotionScores::neutral());

        let live = session.live_metrics();
        assert_eq!(live.blink_rate, 18.0);
        assert_eq!(live.emotion, EmotionScores::neutral());
        assert_eq!(session.buffers().blink_rate.len(), 1);
    }

    #[test]
    fn test_blink_direction_messages() {
        let (mut session, _) = calibrated_session();

        let high = session.add_blink_rate_point(30.0);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].severity, Severity::High);
        assert!(high[0].message.starts_with("Increased blink rate"));

        let low = session.add_blink_rate_point(5.0);
        assert_eq!(low.len(), 1);
        assert!(low[0].message.starts_with("Decreased blink rate"));
        assert_eq!(session.alerts()[0].id, low[0].id);
    }

    #[test]
    fn test_disabled_alerts_suppress_detection() {
        let (mut session, _) = calibrated_session();
        session.set_alert_config(AlertConfig {
            enabled: false,
            ..AlertConfig::default()
        });
        assert!(session.add_blink_rate_point(40.0).is_empty());
        assert!(session.alerts().is_empty());
        // The sample is still recorded
        assert_eq!(session.live_metrics().blink_rate, 40.0);
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let (mut session, _) = session_with(Arc::new(BrokenStore));
        session.add_blink_rate_point(15.0);
        let baseline = session.save_current_baseline();
        assert_eq!(session.baseline(), Some(&baseline));

        let thresholds = AnomalyThresholds {
            blink_rate: 4.0,
            ..AnomalyThresholds::default()
        };
        session.set_anomaly_thresholds(thresholds);
        assert_eq!(session.thresholds(), thresholds);

        session.delete_baseline();
        assert!(session.baseline().is_none());
    }

    #[test]
    fn test_frame_failure_substitutes_fallback() {
        let (mut session, _) = session_with(Arc::new(MemoryStore::new()));
        session.apply_frame_result(Err(EngineError::Inference("timeout".to_string())));

        assert_eq!(session.live_metrics().eye_redness, 0.3);
        assert!(session.inference_error().unwrap_or_default().contains("timeout"));
        assert_eq!(session.buffers().emotion.len(), 1);

        session.apply_frame_result(Ok(FrameAnalysis {
            emotions: EmotionScores::neutral(),
            eye_redness: 0.2,
            fallback: false,
        }));
        assert!(session.inference_error().is_none());
    }

    #[test]
    fn test_calibration_through_session() {
        let (mut session, clock) = session_with(Arc::new(MemoryStore::new()));
        assert!(session.start_calibration());
        assert!(!session.start_calibration());

        clock.advance(45_000);
        assert_eq!(
            session.tick_calibration(),
            CalibrationTick::InProgress { progress: 50.0 }
        );

        clock.advance(45_000);
        assert_eq!(session.tick_calibration(), CalibrationTick::Completed);
        assert!(!session.calibration_status().is_calibrating);
        // Completion alone does not create a baseline
        assert!(session.baseline().is_none());
    }

    #[test]
    fn test_snapshot_reports_snooze() {
        let (mut session, clock) = session_with(Arc::new(MemoryStore::new()));
        let until = session.snooze(15);
        assert_eq!(until, clock.now_ms() + 15 * 60_000);
        assert!(session.snapshot().snoozed);

        clock.advance(15 * 60_000);
        let snapshot = session.snapshot();
        assert!(!snapshot.snoozed);
        // Expired snooze is not cleared
        assert_eq!(snapshot.alert_config.snooze_until, Some(until));
    }

    #[test]
    fn test_snooze_saturates_for_huge_durations() {
        let (mut session, clock) = session_with(Arc::new(MemoryStore::new()));
        let until = session.snooze(i64::MAX / MS_PER_MINUTE + 1);
        assert_eq!(until, i64::MAX);
        assert!(session.snapshot().snoozed);

        clock.advance(365 * 24 * 60 * MS_PER_MINUTE);
        assert!(session.snapshot().snoozed);

        let until = session.snooze(i64::MAX);
        assert_eq!(until, i64::MAX);
    }

    #[test]
    fn test_storage_error_tracks_last_write() {
        let (mut session, _) = session_with(Arc::new(BrokenStore));
        assert!(session.storage_error().is_none());

        session.set_anomaly_thresholds(AnomalyThresholds::default());
        let error = session.snapshot().storage_error.unwrap_or_default();
        assert!(error.contains(keys::THRESHOLDS));
        assert!(error.contains("quota exceeded"));

        let (mut session, _) = session_with(Arc::new(MemoryStore::new()));
        session.set_alert_config(AlertConfig::default());
        assert!(session.storage_error().is_none());
    }
}
