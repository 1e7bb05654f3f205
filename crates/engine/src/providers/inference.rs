//! Emotion and eye-redness inference
//!
//! The detection service is opaque: given a base64 frame it returns ranked
//! `{class, confidence}` predictions. This module maps those predictions onto
//! the engine's emotion distribution and redness scale, and defines the
//! provider seam used by the agent.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{EngineError, Result};
use crate::models::EmotionScores;

/// Redness reported when nothing (or nothing red) is detected
const REDNESS_FLOOR: f64 = 0.1;

/// One detection returned by the inference service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// Emotion target slot for a service label
fn emotion_slot(label: &str) -> Option<&'static str> {
    match label.to_lowercase().as_str() {
        "happy" | "joy" | "happiness" => Some("happy"),
        // fear folds into sad, disgust into angry
        "sad" | "sadness" | "fear" => Some("sad"),
        "neutral" => Some("neutral"),
        "surprise" | "surprised" => Some("surprised"),
        "anger" | "angry" | "disgust" => Some("angry"),
        _ => None,
    }
}

fn best_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    predictions.iter().fold(None, |best, p| match best {
        Some(b) if b.confidence >= p.confidence => Some(b),
        _ => Some(p),
    })
}

/// Map ranked predictions onto an emotion distribution
///
/// The top prediction's confidence goes to its class and the remaining mass
/// to neutral. No predictions or an unknown label yield full neutral.
pub fn map_emotions(predictions: &[Prediction]) -> EmotionScores {
    let Some(best) = best_prediction(predictions) else {
        return EmotionScores::neutral();
    };
    let Some(slot) = emotion_slot(&best.class) else {
        return EmotionScores::neutral();
    };

    let mut scores = EmotionScores {
        happy: 0.0,
        sad: 0.0,
        neutral: 0.0,
        surprised: 0.0,
        angry: 0.0,
    };
    match slot {
        "happy" => scores.happy = best.confidence,
        "sad" => scores.sad = best.confidence,
        "surprised" => scores.surprised = best.confidence,
        "angry" => scores.angry = best.confidence,
        _ => {}
    }
    // Remainder goes to neutral; a neutral top label is overwritten by it
    scores.neutral = 1.0 - best.confidence;
    scores
}

/// Map ranked predictions onto a [0, 1] redness value
pub fn map_redness(predictions: &[Prediction]) -> f64 {
    if predictions.is_empty() {
        return REDNESS_FLOOR;
    }

    if let Some(red) = predictions
        .iter()
        .find(|p| p.class.to_lowercase().contains("red"))
    {
        return red.confidence.min(1.0);
    }

    let best = best_prediction(predictions)
        .map(|p| p.confidence)
        .unwrap_or(0.0);
    (1.0 - best).max(REDNESS_FLOOR)
}

/// Emotion and redness derived from one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnalysis {
    pub emotions: EmotionScores,
    pub eye_redness: f64,
    /// True when this is a synthetic stand-in for a failed inference
    pub fallback: bool,
}

impl FrameAnalysis {
    /// Typical resting values used when inference fails
    pub fn fallback() -> Self {
        Self {
            emotions: EmotionScores::default(),
            eye_redness: 0.3,
            fallback: true,
        }
    }
}

/// Remote detection service
#[async_trait]
pub trait DetectionProvider: Send + Sync {
    async fn detect_emotion(&self, image_base64: &str) -> Result<Vec<Prediction>>;

    async fn detect_redness(&self, image_base64: &str) -> Result<Vec<Prediction>>;
}

/// Run both detections concurrently and map the results
pub async fn analyze_frame(
    provider: &dyn DetectionProvider,
    image_base64: &str,
) -> Result<FrameAnalysis> {
    let (emotion, redness) = tokio::join!(
        provider.detect_emotion(image_base64),
        provider.detect_redness(image_base64)
    );

    Ok(FrameAnalysis {
        emotions: map_emotions(&emotion?),
        eye_redness: map_redness(&redness?),
        fallback: false,
    })
}

/// HTTP detection endpoints
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub emotion_url: String,
    pub redness_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Detection provider backed by hosted model endpoints
///
/// The frame is posted as a form-encoded base64 body with the API key as a
/// query parameter.
pub struct HttpDetectionProvider {
    client: Client,
    emotion_url: Url,
    redness_url: Url,
    api_key: String,
}

impl HttpDetectionProvider {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            emotion_url: Url::parse(&config.emotion_url)?,
            redness_url: Url::parse(&config.redness_url)?,
            api_key: config.api_key,
        })
    }

    async fn detect(&self, url: &Url, image_base64: &str) -> Result<Vec<Prediction>> {
        let response = self
            .client
            .post(url.clone())
            .query(&[("api_key", self.api_key.as_str())])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(image_base64.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EngineError::Inference(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let body: DetectionResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Inference(format!("malformed response: {e}")))?;
        debug!(url = %url, predictions = body.predictions.len(), "Detection complete");
        Ok(body.predictions)
    }
}

#[async_trait]
impl DetectionProvider for HttpDetectionProvider {
    async fn detect_emotion(&self, image_base64: &str) -> Result<Vec<Prediction>> {
        self.detect(&self.emotion_url, image_base64).await
    }

    async fn detect_redness(&self, image_base64: &str) -> Result<Vec<Prediction>> {
        self.detect(&self.redness_url, image_base64).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(class: &str, confidence: f64) -> Prediction {
        Prediction {
            class: class.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_empty_predictions_are_neutral() {
        assert_eq!(map_emotions(&[]), EmotionScores::neutral());
        assert_eq!(map_redness(&[]), 0.1);
    }

    #[test]
    fn test_top_label_takes_confidence() {
        let scores = map_emotions(&[p("Happy", 0.3), p("Sadness", 0.8)]);
        assert_eq!(scores.sad, 0.8);
        assert_eq!(scores.happy, 0.0);
        assert!((scores.neutral - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_synonyms() {
        assert_eq!(map_emotions(&[p("fear", 0.6)]).sad, 0.6);
        assert_eq!(map_emotions(&[p("disgust", 0.7)]).angry, 0.7);
        assert_eq!(map_emotions(&[p("surprise", 0.9)]).surprised, 0.9);
        assert_eq!(map_emotions(&[p("joy", 0.5)]).happy, 0.5);
    }

    #[test]
    fn test_unknown_label_is_neutral() {
        assert_eq!(map_emotions(&[p("contempt", 0.99)]), EmotionScores::neutral());
    }

    #[test]
    fn test_neutral_label_gets_remainder() {
        let scores = map_emotions(&[p("neutral", 0.75)]);
        assert_eq!(scores.neutral, 0.25);
    }

    #[test]
    fn test_redness_mapping() {
        assert_eq!(map_redness(&[p("normal", 0.2), p("red-eyes", 0.7)]), 0.7);
        assert_eq!(map_redness(&[p("Redness", 1.4)]), 1.0);
        // No red label: inverse of best confidence, floored
        assert!((map_redness(&[p("normal", 0.6)]) - 0.4).abs() < 1e-12);
        assert_eq!(map_redness(&[p("normal", 0.95)]), 0.1);
    }

    struct StaticProvider {
        fail: bool,
    }

    #[async_trait]
    impl DetectionProvider for StaticProvider {
        async fn detect_emotion(&self, _image: &str) -> Result<Vec<Prediction>> {
            Ok(vec![p("happy", 0.9)])
        }

        async fn detect_redness(&self, _image: &str) -> Result<Vec<Prediction>> {
            if self.fail {
                Err(EngineError::Inference("service unavailable".to_string()))
            } else {
                Ok(vec![p("red", 0.4)])
            }
        }
    }

    #[tokio::test]
    async fn test_analyze_frame() {
        let analysis = analyze_frame(&StaticProvider { fail: false }, "aGVsbG8=")
            .await
            .unwrap();
        assert_eq!(analysis.emotions.happy, 0.9);
        assert_eq!(analysis.eye_redness, 0.4);
        assert!(!analysis.fallback);
    }

    #[tokio::test]
    async fn test_analyze_frame_propagates_failure() {
        let result = analyze_frame(&StaticProvider { fail: true }, "aGVsbG8=").await;
        assert!(matches!(result, Err(EngineError::Inference(_))));
    }

    #[tokio::test]
    async fn test_http_provider_posts_frame() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/emotion")
            .match_query(mockito::Matcher::UrlEncoded(
                "api_key".into(),
                "secret".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"predictions":[{"class":"sad","confidence":0.66,"x":1}]}"#)
            .create_async()
            .await;

        let provider = HttpDetectionProvider::new(InferenceConfig {
            emotion_url: format!("{}/emotion", server.url()),
            redness_url: format!("{}/redness", server.url()),
            api_key: "secret".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let predictions = provider.detect_emotion("ZnJhbWU=").await.unwrap();
        assert_eq!(predictions, vec![p("sad", 0.66)]);
        mock.assert_async().await;
    }
}
