//! Demo history
//!
//! Fills a fresh session with one hour of synthetic samples per channel and a
//! handful of past alerts so dashboards have something to draw before live
//! data arrives. Seeded samples bypass anomaly scoring.

use crate::models::{
    AnomalyEvent, Channel, EmotionSample, EmotionScores, EnvironmentalReading,
    EnvironmentalSample, MetricSample, Severity,
};
use crate::session::MonitorSession;

/// Samples generated per channel
pub const DEMO_POINTS: usize = 120;

/// Spacing between generated samples
pub const DEMO_SPACING_MS: i64 = 30_000;

/// Deterministic noise in [-0.5, 0.5)
fn noise(i: usize, salt: f64) -> f64 {
    let x = ((i as f64) * 12.9898 + salt).sin() * 43_758.545_3;
    x - x.floor() - 0.5
}

fn timestamp_for(now: i64, i: usize) -> i64 {
    now - (DEMO_POINTS - i) as i64 * DEMO_SPACING_MS
}

fn in_window(i: usize, lo: usize, hi: usize) -> bool {
    i > lo && i < hi
}

pub fn blink_rate_history(now: i64) -> Vec<MetricSample> {
    (0..DEMO_POINTS)
        .map(|i| {
            let base = 15.0 + (i as f64 / 10.0).sin() * 3.0;
            let spike = if in_window(i, 80, 90) { 10.0 } else { 0.0 };
            let value = (base + spike + noise(i, 1.0) * 2.0).max(0.0);
            MetricSample::new(timestamp_for(now, i), value)
        })
        .collect()
}

pub fn eye_redness_history(now: i64) -> Vec<MetricSample> {
    (0..DEMO_POINTS)
        .map(|i| {
            let base = 0.3 + (i as f64 / 15.0).sin() * 0.1;
            let spike = if in_window(i, 95, 105) { 0.25 } else { 0.0 };
            let value = (base + spike + noise(i, 2.0) * 0.05).clamp(0.0, 1.0);
            MetricSample::new(timestamp_for(now, i), value)
        })
        .collect()
}

pub fn emotion_history(now: i64) -> Vec<EmotionSample> {
    (0..DEMO_POINTS)
        .map(|i| {
            let sad_spike = if in_window(i, 70, 85) { 0.3 } else { 0.0 };
            EmotionSample {
                timestamp: timestamp_for(now, i),
                emotions: EmotionScores {
                    happy: (0.5 + noise(i, 3.0) * 0.2 - sad_spike).max(0.0),
                    sad: (0.1 + sad_spike + noise(i, 4.0) * 0.1).max(0.0),
                    neutral: (0.3 + noise(i, 5.0) * 0.15).max(0.0),
                    surprised: (0.05 + noise(i, 6.0) * 0.05).max(0.0),
                    angry: (0.05 + noise(i, 7.0) * 0.05).max(0.0),
                },
            }
        })
        .collect()
}

pub fn environmental_history(now: i64) -> Vec<EnvironmentalSample> {
    (0..DEMO_POINTS)
        .map(|i| {
            let humidity_drop = if in_window(i, 60, 75) { -15.0 } else { 0.0 };
            EnvironmentalSample {
                timestamp: timestamp_for(now, i),
                reading: EnvironmentalReading {
                    temperature: 22.0 + (i as f64 / 20.0).sin() * 2.0 + noise(i, 8.0),
                    humidity: (45.0 + humidity_drop + noise(i, 9.0) * 3.0).max(20.0),
                    light: 300.0 + (i as f64 / 25.0).sin() * 100.0 + noise(i, 10.0) * 50.0,
                },
            }
        })
        .collect()
}

/// Past alerts, oldest first
pub fn alert_history(now: i64) -> Vec<AnomalyEvent> {
    let alert = |steps_ago: i64, channel, severity, message: &str, suggestion: &str| AnomalyEvent {
        id: 0,
        timestamp: now - steps_ago * DEMO_SPACING_MS,
        anomaly_type: channel,
        severity,
        message: message.to_string(),
        suggestion: suggestion.to_string(),
    };

    vec![
        alert(
            50,
            Channel::BlinkRate,
            Severity::High,
            "Increased blink rate detected (25 blinks/min)",
            "Take a 20-second eye break. Look at something 20 feet away.",
        ),
        alert(
            40,
            Channel::Emotion,
            Severity::Medium,
            "Elevated sadness levels detected",
            "Consider taking a break. Try a 2-minute breathing exercise.",
        ),
        alert(
            30,
            Channel::Environmental,
            Severity::Medium,
            "Low humidity detected (30%)",
            "Low humidity can cause eye dryness. Consider using a humidifier.",
        ),
        alert(
            15,
            Channel::EyeRedness,
            Severity::High,
            "High eye redness detected (0.68)",
            "Your eyes may be strained. Reduce screen brightness and take a 5-minute break.",
        ),
    ]
}

/// Load demo history into `session`
pub fn seed(session: &mut MonitorSession) {
    let now = session.now();

    let buffers = session.buffers_mut();
    buffers.blink_rate.extend(blink_rate_history(now));
    buffers.eye_redness.extend(eye_redness_history(now));
    buffers.emotion.extend(emotion_history(now));
    buffers.environmental.extend(environmental_history(now));

    let alerts = session.alert_manager_mut();
    for event in alert_history(now) {
        alerts.insert_with_new_id(event);
    }

    let buffers = session.buffers();
    let live = crate::models::LiveMetricsUpdate {
        blink_rate: buffers.blink_rate.latest().map(|s| s.value),
        eye_redness: buffers.eye_redness.latest().map(|s| s.value),
        emotion: buffers.emotion.latest().map(|s| s.emotions),
        environmental: buffers.environmental.latest().map(|s| s.reading),
    };
    session.update_live_metrics(live);
}
