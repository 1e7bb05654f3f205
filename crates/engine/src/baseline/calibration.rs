//! Calibration window state machine
//!
//! Idle -> Calibrating -> Idle. The controller never reads the clock; callers
//! feed it timestamps and it reports progress quantized to the tick
//! resolution. Completing the window does not save a baseline by itself.

use serde::{Deserialize, Serialize};

use super::stats::stat_of;
use crate::ingest::SampleBuffers;
use crate::models::{Baseline, EmotionBaseline, EnvironmentalBaseline};

/// Length of the calibration window (90 seconds)
pub const DEFAULT_CALIBRATION_DURATION_MS: i64 = 90_000;

/// Progress sampling resolution
pub const DEFAULT_CALIBRATION_TICK_MS: i64 = 100;

/// Samples per channel used to derive a baseline
pub const DEFAULT_CALIBRATION_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    Idle,
    Calibrating { started_at: i64 },
}

/// Result of feeding the controller a timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationTick {
    /// Not calibrating
    Idle,
    /// Still inside the window
    InProgress { progress: f64 },
    /// The window elapsed on this tick; the controller is Idle again
    Completed,
}

/// Observable calibration status for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStatus {
    pub is_calibrating: bool,
    /// Percentage in [0, 100]
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub struct CalibrationController {
    state: CalibrationState,
    progress: f64,
    duration_ms: i64,
    tick_ms: i64,
}

impl CalibrationController {
    pub fn new(duration_ms: i64, tick_ms: i64) -> Self {
        Self {
            state: CalibrationState::Idle,
            progress: 0.0,
            duration_ms: duration_ms.max(1),
            tick_ms: tick_ms.max(1),
        }
    }

    /// Begin a window at `now`. A second call while calibrating is a no-op.
    ///
    /// Returns whether a new window was started.
    pub fn start(&mut self, now: i64) -> bool {
        if self.is_calibrating() {
            return false;
        }
        self.state = CalibrationState::Calibrating { started_at: now };
        self.progress = 0.0;
        true
    }

    /// Advance progress to `now`
    pub fn tick(&mut self, now: i64) -> CalibrationTick {
        let started_at = match self.state {
            CalibrationState::Idle => return CalibrationTick::Idle,
            CalibrationState::Calibrating { started_at } => started_at,
        };

        let elapsed = (now - started_at).max(0);
        if elapsed >= self.duration_ms {
            self.state = CalibrationState::Idle;
            self.progress = 100.0;
            return CalibrationTick::Completed;
        }

        let sampled = elapsed - elapsed % self.tick_ms;
        let progress = (sampled as f64 / self.duration_ms as f64 * 100.0).min(100.0);
        // Never move backwards, even if the caller's clock does
        self.progress = self.progress.max(progress);

        CalibrationTick::InProgress {
            progress: self.progress,
        }
    }

    /// Abandon the current window; partial progress is discarded
    ///
    /// Returns whether a window was running.
    pub fn cancel(&mut self) -> bool {
        if !self.is_calibrating() {
            return false;
        }
        self.state = CalibrationState::Idle;
        self.progress = 0.0;
        true
    }

    pub fn is_calibrating(&self) -> bool {
        matches!(self.state, CalibrationState::Calibrating { .. })
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn tick_ms(&self) -> i64 {
        self.tick_ms
    }

    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            is_calibrating: self.is_calibrating(),
            progress: self.progress,
        }
    }
}

impl Default for CalibrationController {
    fn default() -> Self {
        Self::new(DEFAULT_CALIBRATION_DURATION_MS, DEFAULT_CALIBRATION_TICK_MS)
    }
}

/// Derive a baseline from the last `window` samples of every channel
///
/// Channels with no samples get `{mean: 0, std: 0}`.
pub fn derive_baseline(buffers: &SampleBuffers, window: usize, calibrated_at: i64) -> Baseline {
    let blink_rate = buffers.blink_rate.recent(window);
    let eye_redness = buffers.eye_redness.recent(window);
    let emotion = buffers.emotion.recent(window);
    let environmental = buffers.environmental.recent(window);

    Baseline {
        blink_rate: stat_of(&blink_rate, |s| s.value),
        eye_redness: stat_of(&eye_redness, |s| s.value),
        emotions: EmotionBaseline {
            happy: stat_of(&emotion, |s| s.emotions.happy),
            sad: stat_of(&emotion, |s| s.emotions.sad),
            neutral: stat_of(&emotion, |s| s.emotions.neutral),
        },
        environmental: EnvironmentalBaseline {
            temperature: stat_of(&environmental, |s| s.reading.temperature),
            humidity: stat_of(&environmental, |s| s.reading.humidity),
            light: stat_of(&environmental, |s| s.reading.light),
        },
        calibrated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelStat, EmotionSample, EmotionScores, MetricSample};

    #[test]
    fn test_start_is_idempotent() {
        let mut controller = CalibrationController::default();
        assert!(controller.start(0));
        assert!(!controller.start(5_000));

        // The second call did not restart the window
        assert_eq!(
            controller.state(),
            CalibrationState::Calibrating { started_at: 0 }
        );
    }

    #[test]
    fn test_progress_quantized_and_monotonic() {
        let mut controller = CalibrationController::default();
        controller.start(1_000);

        // 45_050ms elapsed samples down to 45_000ms -> 50%
        assert_eq!(
            controller.tick(46_050),
            CalibrationTick::InProgress { progress: 50.0 }
        );

        // Clock going backwards does not reduce progress
        assert_eq!(
            controller.tick(10_000),
            CalibrationTick::InProgress { progress: 50.0 }
        );
    }

    #[test]
    fn test_completion_returns_to_idle() {
        let mut controller = CalibrationController::default();
        controller.start(0);

        assert_eq!(controller.tick(90_000), CalibrationTick::Completed);
        assert!(!controller.is_calibrating());
        assert_eq!(controller.progress(), 100.0);
        assert_eq!(controller.tick(95_000), CalibrationTick::Idle);
    }

    #[test]
    fn test_cancel_discards_progress() {
        let mut controller = CalibrationController::default();
        assert!(!controller.cancel());

        controller.start(0);
        controller.tick(30_000);
        assert!(controller.cancel());
        assert_eq!(controller.status(), CalibrationStatus {
            is_calibrating: false,
            progress: 0.0,
        });
    }

    #[test]
    fn test_derive_baseline_uses_last_window() {
        let mut buffers = SampleBuffers::new(120);
        // 90 samples at 100 followed by 30 at 7: only the last 30 count
        for i in 0..90 {
            buffers.blink_rate.push(MetricSample::new(i, 100.0));
        }
        for i in 90..120 {
            buffers.blink_rate.push(MetricSample::new(i, 7.0));
        }

        let baseline = derive_baseline(&buffers, 30, 42);
        assert_eq!(baseline.blink_rate, ChannelStat::new(7.0, 0.0));
        assert_eq!(baseline.calibrated_at, 42);
    }

    #[test]
    fn test_derive_baseline_empty_channels_are_zero() {
        let mut buffers = SampleBuffers::new(120);
        buffers.emotion.push(EmotionSample {
            timestamp: 0,
            emotions: EmotionScores::default(),
        });

        let baseline = derive_baseline(&buffers, 30, 0);
        assert_eq!(baseline.blink_rate, ChannelStat::new(0.0, 0.0));
        assert_eq!(baseline.environmental.humidity, ChannelStat::new(0.0, 0.0));
        assert!(!baseline.eye_redness.mean.is_nan());
        assert_eq!(baseline.emotions.sad, ChannelStat::new(0.1, 0.0));
    }
}
