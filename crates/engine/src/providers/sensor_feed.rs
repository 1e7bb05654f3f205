//! Remote room-sensor feed
//!
//! The feed is a small HTTP service returning
//! `{"status": "ok", "data": [{timestamp, temperature, humidity, ldr}]}`
//! where numbers may arrive string-encoded. Only the most recent record is
//! appended on each poll.

use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::models::{AnomalyEvent, EnvironmentalReading, EnvironmentalSample};
use crate::observability::EngineMetrics;
use crate::session::MonitorSession;

/// Default poll interval (5 seconds)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Fetch state exposed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub loading: bool,
    /// Message from the most recent failed fetch; cleared on success
    pub last_error: Option<String>,
    /// Records returned by the most recent successful fetch
    pub records: usize,
    /// Epoch milliseconds of the most recent successful fetch
    pub last_success_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    status: Option<String>,
    data: Option<Value>,
}

/// Read a numeric field that may be encoded as a JSON number or string
fn number_field(record: &Value, field: &str) -> Result<f64> {
    match record.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| EngineError::SensorFeed(format!("`{field}` is not a finite number"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| EngineError::SensorFeed(format!("`{field}` is not numeric: {s:?}"))),
        Some(other) => Err(EngineError::SensorFeed(format!(
            "`{field}` has unexpected type: {other}"
        ))),
        None => Err(EngineError::SensorFeed(format!("record is missing `{field}`"))),
    }
}

/// Parse a record timestamp into epoch milliseconds
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (taken as UTC) and raw epoch
/// milliseconds.
fn parse_timestamp(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| EngineError::SensorFeed(format!("invalid timestamp {n}"))),
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.timestamp_millis());
            }
            for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Ok(naive.and_utc().timestamp_millis());
                }
            }
            s.parse::<i64>()
                .map_err(|_| EngineError::SensorFeed(format!("invalid timestamp {s:?}")))
        }
        other => Err(EngineError::SensorFeed(format!(
            "invalid timestamp {other}"
        ))),
    }
}

/// Decode a feed response body into samples, oldest first as delivered
pub fn parse_feed(body: &str) -> Result<Vec<EnvironmentalSample>> {
    let envelope: FeedEnvelope = serde_json::from_str(body)
        .map_err(|e| EngineError::SensorFeed(format!("malformed response: {e}")))?;

    let status = envelope.status.unwrap_or_default();
    if status != "ok" {
        return Err(EngineError::SensorFeed(format!(
            "feed returned status {status:?}"
        )));
    }

    let records = match envelope.data {
        Some(Value::Array(records)) => records,
        _ => {
            return Err(EngineError::SensorFeed(
                "feed data is not an array".to_string(),
            ))
        }
    };

    records
        .iter()
        .map(|record| {
            let timestamp = record
                .get("timestamp")
                .ok_or_else(|| EngineError::SensorFeed("record is missing `timestamp`".into()))
                .and_then(parse_timestamp)?;
            Ok(EnvironmentalSample {
                timestamp,
                reading: EnvironmentalReading {
                    temperature: number_field(record, "temperature")?,
                    humidity: number_field(record, "humidity")?,
                    light: number_field(record, "ldr")?,
                },
            })
        })
        .collect()
}

/// HTTP client for the sensor feed
#[derive(Clone)]
pub struct SensorFeedClient {
    client: Client,
    metrics: EngineMetrics,
}

impl SensorFeedClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            metrics: EngineMetrics::new(),
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<EnvironmentalSample>> {
        let url = url::Url::parse(url)?;
        let start = Instant::now();

        let result = async {
            let response = self
                .client
                .get(url.clone())
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| EngineError::SensorFeed(format!("request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(EngineError::SensorFeed(format!(
                    "HTTP error: {}",
                    response.status()
                )));
            }

            let body = response
                .text()
                .await
                .map_err(|e| EngineError::SensorFeed(format!("failed to read body: {e}")))?;
            parse_feed(&body)
        }
        .await;

        self.metrics
            .observe_sensor_fetch_latency(start.elapsed().as_secs_f64());
        result
    }
}

pub type SharedSession = Arc<Mutex<MonitorSession>>;

/// Fetch once and apply the result to the session
///
/// The session lock is not held across the request. Returns the alerts raised
/// by the appended sample, or `None` when no feed URL is configured.
pub async fn poll_once(
    session: &SharedSession,
    client: &SensorFeedClient,
) -> Option<Vec<AnomalyEvent>> {
    let url = {
        let mut guard = session.lock().await;
        let url = guard.sensor_feed_url()?.to_string();
        guard.mark_feed_loading();
        url
    };

    let result = client.fetch(&url).await;
    let mut guard = session.lock().await;
    Some(guard.apply_sensor_feed(result))
}

/// Periodically polls the sensor feed into a session
pub struct SensorPoller {
    session: SharedSession,
    client: SensorFeedClient,
    interval: Duration,
}

impl SensorPoller {
    pub fn new(session: SharedSession, client: SensorFeedClient, interval: Duration) -> Self {
        Self {
            session,
            client,
            interval,
        }
    }

    /// Run until a shutdown signal arrives
    pub async fn run(self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting sensor feed poller"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match poll_once(&self.session, &self.client).await {
                        Some(alerts) => {
                            polls += 1;
                            debug!(polls = polls, alerts = alerts.len(), "Sensor feed poll complete");
                        }
                        None => debug!("No sensor feed configured, skipping poll"),
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutting down sensor feed poller");
                    break;
                }
            }
        }
    }
}
