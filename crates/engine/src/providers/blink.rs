//! Blink detector stats messages
//!
//! The blink detector pushes `{"blink_stats": {...}}` frames. Only decoding
//! lives here; the transport is the caller's concern.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlinkStats {
    pub total_blinks: u64,
    /// Blinks per minute since the detector started
    pub overall_bpm: f64,
    /// Blinks per minute over the detector's recent window
    pub recent_bpm: f64,
    /// Seconds since the detector started
    pub elapsed_time: f64,
}

impl BlinkStats {
    /// Value appended to the blink-rate channel
    pub fn blink_rate(&self) -> f64 {
        self.recent_bpm
    }
}

#[derive(Debug, Deserialize)]
struct BlinkMessage {
    blink_stats: Option<BlinkStats>,
}

/// Decode a detector message
///
/// Messages without a `blink_stats` member (status pings) yield `Ok(None)`.
pub fn decode_blink_message(text: &str) -> Result<Option<BlinkStats>> {
    let message: BlinkMessage = serde_json::from_str(text)
        .map_err(|e| EngineError::Inference(format!("malformed blink message: {e}")))?;
    Ok(message.blink_stats)
}
