//! HTTP API: presentation endpoints, health checks and Prometheus metrics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};
use wellness_engine::{
    baseline::{CalibrationStatus, CalibrationTimer, CalibrationTimerHandle, TimerOutcome},
    health::{ComponentStatus, HealthRegistry},
    ingest::SeriesSnapshot,
    observability::EngineMetrics,
    providers::{
        analyze_frame, poll_once, BlinkStats, DetectionProvider, FeedStatus, FrameAnalysis,
        SensorFeedClient, SharedSession,
    },
    AlertConfig, AnomalyEvent, AnomalyThresholds, Baseline, Channel, EmotionScores, EngineError,
    EnvironmentalReading, SessionSnapshot,
};

/// Default number of samples returned by the series endpoint
const DEFAULT_SERIES_LIMIT: usize = 60;

/// API error with a JSON body of the form `{"error": {"code", "message"}}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(message) = &self {
            error!(error = %message, "Request failed");
        }
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));
        (self.status_code(), body).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidThreshold { .. } | EngineError::Url(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Shared application state
pub struct AppState {
    pub session: SharedSession,
    pub health_registry: HealthRegistry,
    pub metrics: EngineMetrics,
    pub feed_client: SensorFeedClient,
    pub detector: Option<Arc<dyn DetectionProvider>>,
    calibration_tick: Duration,
    calibration_timer: Mutex<Option<CalibrationTimerHandle>>,
}

impl AppState {
    pub fn new(
        session: SharedSession,
        health_registry: HealthRegistry,
        metrics: EngineMetrics,
        feed_client: SensorFeedClient,
    ) -> Self {
        Self {
            session,
            health_registry,
            metrics,
            feed_client,
            detector: None,
            calibration_tick: Duration::from_millis(100),
            calibration_timer: Mutex::new(None),
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn DetectionProvider>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_calibration_tick(mut self, tick: Duration) -> Self {
        self.calibration_tick = tick;
        self
    }
}

// ----------------------------------------------------------------------
// Health and metrics
// ----------------------------------------------------------------------

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (feed, inference_error, storage_error) = {
        let session = state.session.lock().await;
        (
            session.feed_status().clone(),
            session.inference_error().map(str::to_string),
            session.storage_error().map(str::to_string),
        )
    };
    state
        .health_registry
        .report_providers(&feed, inference_error.as_deref())
        .await;
    state
        .health_registry
        .report_storage(storage_error.as_deref())
        .await;

    let health = state.health_registry.health().await;
    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> ApiResult<impl IntoResponse> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(format!("failed to encode metrics: {e}")))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

// ----------------------------------------------------------------------
// Session state
// ----------------------------------------------------------------------

async fn get_state(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.lock().await.snapshot())
}

#[derive(Debug, Deserialize)]
struct SeriesQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SeriesResponse {
    channel: Channel,
    samples: SeriesSnapshot,
}

async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(channel): Path<String>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Json<SeriesResponse>> {
    let channel = Channel::parse(&channel)
        .ok_or_else(|| ApiError::NotFound(format!("unknown channel `{channel}`")))?;
    let limit = query.limit.unwrap_or(DEFAULT_SERIES_LIMIT);
    let samples = state.session.lock().await.series(channel, limit);
    Ok(Json(SeriesResponse { channel, samples }))
}

// ----------------------------------------------------------------------
// Ingest
// ----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ValueSample {
    value: f64,
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    alerts: Vec<AnomalyEvent>,
}

async fn post_blink_rate(
    State(state): State<Arc<AppState>>,
    Json(sample): Json<ValueSample>,
) -> Json<IngestResponse> {
    let alerts = state.session.lock().await.add_blink_rate_point(sample.value);
    Json(IngestResponse { alerts })
}

async fn post_eye_redness(
    State(state): State<Arc<AppState>>,
    Json(sample): Json<ValueSample>,
) -> Json<IngestResponse> {
    let alerts = state.session.lock().await.add_eye_redness_point(sample.value);
    Json(IngestResponse { alerts })
}

async fn post_emotion(
    State(state): State<Arc<AppState>>,
    Json(scores): Json<EmotionScores>,
) -> Json<IngestResponse> {
    let alerts = state.session.lock().await.add_emotion_point(scores);
    Json(IngestResponse { alerts })
}

async fn post_environmental(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<EnvironmentalReading>,
) -> Json<IngestResponse> {
    let alerts = state.session.lock().await.add_environmental_point(reading);
    Json(IngestResponse { alerts })
}

async fn post_blink_stats(
    State(state): State<Arc<AppState>>,
    Json(stats): Json<BlinkStats>,
) -> Json<IngestResponse> {
    let alerts = state.session.lock().await.apply_blink_stats(&stats);
    Json(IngestResponse { alerts })
}

#[derive(Debug, Deserialize)]
struct FrameRequest {
    /// Base64-encoded image
    image: String,
}

#[derive(Debug, Serialize)]
struct FrameResponse {
    analysis: FrameAnalysis,
    alerts: Vec<AnomalyEvent>,
}

/// Run both detections on a frame and ingest the result
async fn post_frame(
    State(state): State<Arc<AppState>>,
    Json(frame): Json<FrameRequest>,
) -> ApiResult<Json<FrameResponse>> {
    let detector = state
        .detector
        .clone()
        .ok_or_else(|| ApiError::Unavailable("no inference provider configured".to_string()))?;

    let result = analyze_frame(detector.as_ref(), &frame.image).await;
    let analysis = match &result {
        Ok(analysis) => *analysis,
        Err(_) => FrameAnalysis::fallback(),
    };
    let alerts = state.session.lock().await.apply_frame_result(result);
    Ok(Json(FrameResponse { analysis, alerts }))
}

// ----------------------------------------------------------------------
// Alerts
// ----------------------------------------------------------------------

async fn get_alerts(State(state): State<Arc<AppState>>) -> Json<Vec<AnomalyEvent>> {
    Json(state.session.lock().await.alerts())
}

async fn delete_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    if state.session.lock().await.dismiss_anomaly(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("no alert with id {id}")))
    }
}

// ----------------------------------------------------------------------
// Calibration and baseline
// ----------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CalibrationResponse {
    changed: bool,
    status: CalibrationStatus,
}

async fn start_calibration(State(state): State<Arc<AppState>>) -> Json<CalibrationResponse> {
    let mut timer = state.calibration_timer.lock().await;
    let (started, status) = {
        let mut session = state.session.lock().await;
        let started = session.start_calibration();
        (started, session.calibration_status())
    };

    if started {
        // Any previous timer has already stopped: the window was idle
        *timer = Some(CalibrationTimer::spawn(
            state.session.clone(),
            state.calibration_tick,
        ));
    }

    Json(CalibrationResponse {
        changed: started,
        status,
    })
}

async fn cancel_calibration(State(state): State<Arc<AppState>>) -> Json<CalibrationResponse> {
    // Slot stays held until the old timer has stopped ticking the session
    let mut timer = state.calibration_timer.lock().await;
    let mut timer_cancelled = false;
    if let Some(handle) = timer.take() {
        handle.cancel();
        timer_cancelled = handle.join().await == Some(TimerOutcome::Cancelled);
    }

    let mut session = state.session.lock().await;
    let cancelled = session.cancel_calibration() || timer_cancelled;
    Json(CalibrationResponse {
        changed: cancelled,
        status: session.calibration_status(),
    })
}

async fn save_baseline(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Baseline>) {
    let baseline = state.session.lock().await.save_current_baseline();
    (StatusCode::CREATED, Json(baseline))
}

async fn get_baseline(State(state): State<Arc<AppState>>) -> ApiResult<Json<Baseline>> {
    state
        .session
        .lock()
        .await
        .baseline()
        .copied()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no baseline calibrated".to_string()))
}

async fn delete_baseline(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.lock().await.delete_baseline();
    StatusCode::NO_CONTENT
}

// ----------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------

async fn put_thresholds(
    State(state): State<Arc<AppState>>,
    Json(thresholds): Json<AnomalyThresholds>,
) -> ApiResult<Json<AnomalyThresholds>> {
    thresholds.validate()?;
    state.session.lock().await.set_anomaly_thresholds(thresholds);
    Ok(Json(thresholds))
}

async fn put_alert_config(
    State(state): State<Arc<AppState>>,
    Json(config): Json<AlertConfig>,
) -> Json<AlertConfig> {
    state.session.lock().await.set_alert_config(config);
    Json(config)
}

#[derive(Debug, Deserialize)]
struct SnoozeRequest {
    minutes: i64,
}

async fn post_snooze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SnoozeRequest>,
) -> ApiResult<Json<AlertConfig>> {
    if request.minutes <= 0 {
        return Err(ApiError::BadRequest(
            "snooze minutes must be positive".to_string(),
        ));
    }
    let mut session = state.session.lock().await;
    session.snooze(request.minutes);
    Ok(Json(session.alert_config()))
}

#[derive(Debug, Deserialize)]
struct SensorFeedRequest {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SensorFeedResponse {
    url: Option<String>,
    feed_status: FeedStatus,
}

async fn put_sensor_feed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SensorFeedRequest>,
) -> ApiResult<Json<SensorFeedResponse>> {
    let url = match request.url.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(raw) => {
            let parsed = url::Url::parse(raw)
                .map_err(|e| ApiError::BadRequest(format!("invalid feed url: {e}")))?;
            Some(parsed.to_string())
        }
    };

    let mut session = state.session.lock().await;
    session.set_sensor_feed_url(url);
    Ok(Json(SensorFeedResponse {
        url: session.sensor_feed_url().map(str::to_string),
        feed_status: session.feed_status().clone(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    feed_status: FeedStatus,
    alerts: Vec<AnomalyEvent>,
}

async fn refresh_sensor_feed(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RefreshResponse>> {
    let alerts = poll_once(&state.session, &state.feed_client)
        .await
        .ok_or_else(|| ApiError::Conflict("no sensor feed configured".to_string()))?;
    let feed_status = state.session.lock().await.feed_status().clone();
    Ok(Json(RefreshResponse {
        feed_status,
        alerts,
    }))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/state", get(get_state))
        .route("/api/v1/series/:channel", get(get_series))
        .route("/api/v1/samples/blink-rate", post(post_blink_rate))
        .route("/api/v1/samples/eye-redness", post(post_eye_redness))
        .route("/api/v1/samples/emotion", post(post_emotion))
        .route("/api/v1/samples/environmental", post(post_environmental))
        .route("/api/v1/samples/blink-stats", post(post_blink_stats))
        .route("/api/v1/frames", post(post_frame))
        .route("/api/v1/alerts", get(get_alerts))
        .route("/api/v1/alerts/:id", delete(delete_alert))
        .route("/api/v1/calibration/start", post(start_calibration))
        .route("/api/v1/calibration/cancel", post(cancel_calibration))
        .route(
            "/api/v1/baseline",
            get(get_baseline).post(save_baseline).delete(delete_baseline),
        )
        .route("/api/v1/thresholds", put(put_thresholds))
        .route("/api/v1/alert-config", put(put_alert_config))
        .route("/api/v1/snooze", post(post_snooze))
        .route("/api/v1/sensor-feed", put(put_sensor_feed))
        .route("/api/v1/sensor-feed/refresh", post(refresh_sensor_feed))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
