//! Core data models for the wellness engine
//!
//! Field names serialize in camelCase so persisted baselines, thresholds and
//! alert settings stay readable by the dashboard that consumes them.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Lowest accepted σ-multiplier for anomaly thresholds
pub const MIN_THRESHOLD_SIGMA: f64 = 0.5;

/// Highest accepted σ-multiplier for anomaly thresholds
pub const MAX_THRESHOLD_SIGMA: f64 = 5.0;

/// Default σ-multiplier for every channel
pub const DEFAULT_THRESHOLD_SIGMA: f64 = 2.0;

/// Monitored metric stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    BlinkRate,
    EyeRedness,
    Emotion,
    Environmental,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::BlinkRate,
        Channel::EyeRedness,
        Channel::Emotion,
        Channel::Environmental,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::BlinkRate => "blink_rate",
            Channel::EyeRedness => "eye_redness",
            Channel::Emotion => "emotion",
            Channel::Environmental => "environmental",
        }
    }

    /// Parse either the snake_case name or the kebab-case URL form
    pub fn parse(name: &str) -> Option<Self> {
        match name.replace('-', "_").as_str() {
            "blink_rate" => Some(Channel::BlinkRate),
            "eye_redness" => Some(Channel::EyeRedness),
            "emotion" => Some(Channel::Emotion),
            "environmental" => Some(Channel::Environmental),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single scalar observation (blink rate, eye redness)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: i64,
    pub value: f64,
}

impl MetricSample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Facial emotion distribution, each class in [0, 1]
///
/// Classes are not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores {
    pub happy: f64,
    pub sad: f64,
    pub neutral: f64,
    pub surprised: f64,
    pub angry: f64,
}

impl EmotionScores {
    /// Full-confidence neutral face
    pub fn neutral() -> Self {
        Self {
            happy: 0.0,
            sad: 0.0,
            neutral: 1.0,
            surprised: 0.0,
            angry: 0.0,
        }
    }
}

impl Default for EmotionScores {
    fn default() -> Self {
        Self {
            happy: 0.5,
            sad: 0.1,
            neutral: 0.3,
            surprised: 0.05,
            angry: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionSample {
    pub timestamp: i64,
    #[serde(flatten)]
    pub emotions: EmotionScores,
}

/// Room conditions from the remote sensor feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
    /// Light level, lux
    pub light: f64,
}

impl Default for EnvironmentalReading {
    fn default() -> Self {
        Self {
            temperature: 22.0,
            humidity: 45.0,
            light: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSample {
    pub timestamp: i64,
    #[serde(flatten)]
    pub reading: EnvironmentalReading,
}

/// Mean and population standard deviation of one metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelStat {
    pub mean: f64,
    pub std: f64,
}

impl ChannelStat {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }
}

/// Emotion sub-metrics that carry a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionMetric {
    Happy,
    Sad,
    Neutral,
}

impl EmotionMetric {
    pub fn value_of(&self, scores: &EmotionScores) -> f64 {
        match self {
            EmotionMetric::Happy => scores.happy,
            EmotionMetric::Sad => scores.sad,
            EmotionMetric::Neutral => scores.neutral,
        }
    }
}

/// Environmental sub-metrics that carry a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentalMetric {
    Temperature,
    Humidity,
    Light,
}

impl EnvironmentalMetric {
    pub fn value_of(&self, reading: &EnvironmentalReading) -> f64 {
        match self {
            EnvironmentalMetric::Temperature => reading.temperature,
            EnvironmentalMetric::Humidity => reading.humidity,
            EnvironmentalMetric::Light => reading.light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionBaseline {
    pub happy: ChannelStat,
    pub sad: ChannelStat,
    pub neutral: ChannelStat,
}

impl EmotionBaseline {
    pub fn stat(&self, metric: EmotionMetric) -> ChannelStat {
        match metric {
            EmotionMetric::Happy => self.happy,
            EmotionMetric::Sad => self.sad,
            EmotionMetric::Neutral => self.neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentalBaseline {
    pub temperature: ChannelStat,
    pub humidity: ChannelStat,
    pub light: ChannelStat,
}

impl EnvironmentalBaseline {
    pub fn stat(&self, metric: EnvironmentalMetric) -> ChannelStat {
        match metric {
            EnvironmentalMetric::Temperature => self.temperature,
            EnvironmentalMetric::Humidity => self.humidity,
            EnvironmentalMetric::Light => self.light,
        }
    }
}

/// Personal baseline captured by a calibration run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub blink_rate: ChannelStat,
    pub eye_redness: ChannelStat,
    pub emotions: EmotionBaseline,
    pub environmental: EnvironmentalBaseline,
    /// Epoch milliseconds
    pub calibrated_at: i64,
}

/// Per-channel σ-multipliers
///
/// The setter does not clamp; callers run [`AnomalyThresholds::validate`]
/// before handing user input to the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyThresholds {
    pub blink_rate: f64,
    pub eye_redness: f64,
    pub emotion: f64,
    pub environmental: f64,
}

impl AnomalyThresholds {
    pub fn for_channel(&self, channel: Channel) -> f64 {
        match channel {
            Channel::BlinkRate => self.blink_rate,
            Channel::EyeRedness => self.eye_redness,
            Channel::Emotion => self.emotion,
            Channel::Environmental => self.environmental,
        }
    }

    /// Check every value lies in [0.5, 5.0]
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("blinkRate", self.blink_rate),
            ("eyeRedness", self.eye_redness),
            ("emotion", self.emotion),
            ("environmental", self.environmental),
        ];
        for (name, value) in fields {
            if !(MIN_THRESHOLD_SIGMA..=MAX_THRESHOLD_SIGMA).contains(&value) {
                return Err(EngineError::InvalidThreshold {
                    name,
                    value,
                    min: MIN_THRESHOLD_SIGMA,
                    max: MAX_THRESHOLD_SIGMA,
                });
            }
        }
        Ok(())
    }
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            blink_rate: DEFAULT_THRESHOLD_SIGMA,
            eye_redness: DEFAULT_THRESHOLD_SIGMA,
            emotion: DEFAULT_THRESHOLD_SIGMA,
            environmental: DEFAULT_THRESHOLD_SIGMA,
        }
    }
}

/// Global alert switches and snooze state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    pub enabled: bool,
    pub sound_enabled: bool,
    /// Epoch milliseconds; never cleared automatically after expiry
    pub snooze_until: Option<i64>,
}

impl AlertConfig {
    /// Snooze is evaluated lazily against `now`
    pub fn is_snoozed(&self, now: i64) -> bool {
        matches!(self.snooze_until, Some(until) if now < until)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_enabled: false,
            snooze_until: None,
        }
    }
}

/// Alert severity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Advisory alert raised by the lifecycle manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    /// Session-unique identity, monotonically increasing
    pub id: u64,
    /// Creation time, epoch milliseconds (display only)
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub anomaly_type: Channel,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

/// Latest value of every channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    pub blink_rate: f64,
    pub eye_redness: f64,
    pub emotion: EmotionScores,
    pub environmental: EnvironmentalReading,
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self {
            blink_rate: 15.0,
            eye_redness: 0.3,
            emotion: EmotionScores::default(),
            environmental: EnvironmentalReading::default(),
        }
    }
}

/// Partial overwrite of [`LiveMetrics`]; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetricsUpdate {
    pub blink_rate: Option<f64>,
    pub eye_redness: Option<f64>,
    pub emotion: Option<EmotionScores>,
    pub environmental: Option<EnvironmentalReading>,
}

impl LiveMetrics {
    pub fn apply(&mut self, update: LiveMetricsUpdate) {
        if let Some(v) = update.blink_rate {
            self.blink_rate = v;
        }
        if let Some(v) = update.eye_redness {
            self.eye_redness = v;
        }
        if let Some(v) = update.emotion {
            self.emotion = v;
        }
        if let Some(v) = update.environmental {
            self.environmental = v;
        }
    }
}
