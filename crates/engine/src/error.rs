//! Error types for the wellness engine

use thiserror::Error;

/// Errors raised at the engine's I/O boundaries.
///
/// Input-degenerate cases (empty windows, zero variance) never surface here;
/// they resolve to safe defaults inside the estimator and detector.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sensor feed error: {0}")]
    SensorFeed(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("threshold `{name}` = {value} is outside [{min}, {max}]")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
