//! Sample ingest
//!
//! One rolling buffer per channel. The session appends here, refreshes the
//! live snapshot and then runs the anomaly check for the new sample.

mod buffer;

pub use buffer::{RollingBuffer, DEFAULT_BUFFER_CAPACITY};

use serde::Serialize;

use crate::models::{Channel, EmotionSample, EnvironmentalSample, MetricSample};

/// Rolling buffers for every channel
#[derive(Debug, Clone)]
pub struct SampleBuffers {
    pub blink_rate: RollingBuffer<MetricSample>,
    pub eye_redness: RollingBuffer<MetricSample>,
    pub emotion: RollingBuffer<EmotionSample>,
    pub environmental: RollingBuffer<EnvironmentalSample>,
}

impl SampleBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            blink_rate: RollingBuffer::new(capacity),
            eye_redness: RollingBuffer::new(capacity),
            emotion: RollingBuffer::new(capacity),
            environmental: RollingBuffer::new(capacity),
        }
    }

    pub fn len(&self, channel: Channel) -> usize {
        match channel {
            Channel::BlinkRate => self.blink_rate.len(),
            Channel::EyeRedness => self.eye_redness.len(),
            Channel::Emotion => self.emotion.len(),
            Channel::Environmental => self.environmental.len(),
        }
    }

    /// Last `limit` samples of a channel, for charting
    pub fn series(&self, channel: Channel, limit: usize) -> SeriesSnapshot {
        match channel {
            Channel::BlinkRate => SeriesSnapshot::Metric(self.blink_rate.recent(limit)),
            Channel::EyeRedness => SeriesSnapshot::Metric(self.eye_redness.recent(limit)),
            Channel::Emotion => SeriesSnapshot::Emotion(self.emotion.recent(limit)),
            Channel::Environmental => {
                SeriesSnapshot::Environmental(self.environmental.recent(limit))
            }
        }
    }
}

impl Default for SampleBuffers {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

/// Read-only copy of one channel's buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesSnapshot {
    Metric(Vec<MetricSample>),
    Emotion(Vec<EmotionSample>),
    Environmental(Vec<EnvironmentalSample>),
}

impl SeriesSnapshot {
    pub fn len(&self) -> usize {
        match self {
            SeriesSnapshot::Metric(v) => v.len(),
            SeriesSnapshot::Emotion(v) => v.len(),
            SeriesSnapshot::Environmental(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
