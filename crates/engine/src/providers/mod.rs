//! External signal providers
//!
//! Adapters between outside collaborators (detection service, blink
//! detector, room-sensor feed) and the session's ingest operations.

pub mod blink;
pub mod inference;
pub mod sensor_feed;

pub use blink::{decode_blink_message, BlinkStats};
pub use inference::{
    analyze_frame, map_emotions, map_redness, DetectionProvider, FrameAnalysis,
    HttpDetectionProvider, InferenceConfig, Prediction,
};
pub use sensor_feed::{
    parse_feed, poll_once, FeedStatus, SensorFeedClient, SensorPoller, SharedSession,
    DEFAULT_POLL_INTERVAL,
};
