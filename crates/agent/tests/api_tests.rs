//! Integration tests for the agent API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceExt;
use wellness_agent::api::{create_router, AppState};
use wellness_engine::{
    health::{components, HealthRegistry},
    observability::EngineMetrics,
    providers::SensorFeedClient,
    EngineError, KeyValueStore, ManualClock, MemoryStore, MonitorSession, SessionSettings,
};

const START: i64 = 1_700_000_000_000;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    clock: Arc<ManualClock>,
}

async fn setup_test_app() -> TestApp {
    setup_test_app_with_store(Arc::new(MemoryStore::new())).await
}

/// Store that reads nothing and rejects every write
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> wellness_engine::Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> wellness_engine::Result<()> {
        Err(EngineError::Storage("read-only filesystem".to_string()))
    }

    fn remove(&self, _key: &str) -> wellness_engine::Result<()> {
        Err(EngineError::Storage("read-only filesystem".to_string()))
    }
}

async fn setup_test_app_with_store(store: Arc<dyn KeyValueStore>) -> TestApp {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::INGEST).await;
    health_registry.register(components::STORAGE).await;

    let clock = Arc::new(ManualClock::new(START));
    let session = MonitorSession::load(
        store,
        clock.clone(),
        SessionSettings::default(),
    );

    let state = Arc::new(
        AppState::new(
            Arc::new(Mutex::new(session)),
            health_registry,
            EngineMetrics::new(),
            SensorFeedClient::new(Duration::from_secs(5)).unwrap(),
        )
        .with_calibration_tick(Duration::from_millis(5)),
    );
    let router = create_router(state.clone());

    TestApp {
        router,
        state,
        clock,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn calibrate_blink_rate(app: &TestApp) {
    for i in 0..30 {
        let value = if i % 2 == 0 { 14.0 } else { 16.0 };
        send(
            &app.router,
            "POST",
            "/api/v1/samples/blink-rate",
            Some(json!({ "value": value })),
        )
        .await;
    }
    let (status, _) = send(&app.router, "POST", "/api/v1/baseline", None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let app = setup_test_app().await;

    let (status, health) = send(&app.router, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["ingest"].is_object());
    assert!(health["components"]["sensor_feed"].is_object());
}

#[tokio::test]
async fn test_healthz_returns_503_when_storage_unhealthy() {
    let app = setup_test_app().await;
    app.state
        .health_registry
        .set_unhealthy(components::STORAGE, "read-only filesystem")
        .await;

    let (status, health) = send(&app.router, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_follows_registry() {
    let app = setup_test_app().await;

    let (status, readiness) = send(&app.router, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    app.state.health_registry.set_ready(true).await;
    let (status, readiness) = send(&app.router, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let app = setup_test_app().await;
    send(
        &app.router,
        "POST",
        "/api/v1/samples/blink-rate",
        Some(json!({ "value": 15.0 })),
    )
    .await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("wellness_samples_ingested_total"));
    assert!(text.contains("wellness_baseline_calibrated"));
}

#[tokio::test]
async fn test_no_alerts_without_baseline() {
    let app = setup_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/v1/samples/blink-rate",
        Some(json!({ "value": 30.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alerts"], json!([]));

    let (status, _) = send(&app.router, "GET", "/api/v1/baseline", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anomaly_flow_and_dismissal() {
    let app = setup_test_app().await;
    calibrate_blink_rate(&app).await;

    let (_, body) = send(
        &app.router,
        "POST",
        "/api/v1/samples/blink-rate",
        Some(json!({ "value": 30.0 })),
    )
    .await;
    let alert = &body["alerts"][0];
    assert_eq!(alert["type"], "blink_rate");
    assert_eq!(alert["severity"], "high");
    let id = alert["id"].as_u64().unwrap();

    let (_, alerts) = send(&app.router, "GET", "/api/v1/alerts", None).await;
    assert_eq!(alerts.as_array().map(Vec::len), Some(1));

    let uri = format!("/api/v1/alerts/{id}");
    let (status, _) = send(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_snooze_suppresses_new_alerts() {
    let app = setup_test_app().await;
    calibrate_blink_rate(&app).await;

    let (status, config) = send(
        &app.router,
        "POST",
        "/api/v1/snooze",
        Some(json!({ "minutes": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["snoozeUntil"], START + 15 * 60_000);

    app.clock.advance(10 * 60_000);
    let (_, body) = send(
        &app.router,
        "POST",
        "/api/v1/samples/blink-rate",
        Some(json!({ "value": 30.0 })),
    )
    .await;
    assert_eq!(body["alerts"], json!([]));

    app.clock.advance(10 * 60_000);
    let (_, body) = send(
        &app.router,
        "POST",
        "/api/v1/samples/blink-rate",
        Some(json!({ "value": 30.0 })),
    )
    .await;
    assert_eq!(body["alerts"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/v1/snooze",
        Some(json!({ "minutes": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_thresholds_are_validated() {
    let app = setup_test_app().await;

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/v1/thresholds",
        Some(json!({
            "blinkRate": 2.5,
            "eyeRedness": 2.0,
            "emotion": 7.0,
            "environmental": 2.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/v1/thresholds",
        Some(json!({
            "blinkRate": 2.5,
            "eyeRedness": 2.0,
            "emotion": 3.0,
            "environmental": 2.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, state) = send(&app.router, "GET", "/api/v1/state", None).await;
    assert_eq!(state["thresholds"]["blinkRate"], 2.5);
}

#[tokio::test]
async fn test_calibration_start_and_cancel() {
    let app = setup_test_app().await;

    let (_, body) = send(&app.router, "POST", "/api/v1/calibration/start", None).await;
    assert_eq!(body["changed"], true);
    assert_eq!(body["status"]["isCalibrating"], true);

    let (_, body) = send(&app.router, "POST", "/api/v1/calibration/start", None).await;
    assert_eq!(body["changed"], false);

    app.clock.advance(30_000);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (_, body) = send(&app.router, "POST", "/api/v1/calibration/cancel", None).await;
    assert_eq!(body["changed"], true);
    assert_eq!(body["status"]["isCalibrating"], false);
    assert_eq!(body["status"]["progress"], 0.0);

    let (status, _) = send(&app.router, "GET", "/api/v1/baseline", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_series_endpoint() {
    let app = setup_test_app().await;
    for i in 0..70 {
        send(
            &app.router,
            "POST",
            "/api/v1/samples/eye-redness",
            Some(json!({ "value": 0.01 * i as f64 })),
        )
        .await;
    }

    let (status, body) = send(&app.router, "GET", "/api/v1/series/eye-redness", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["channel"], "eye_redness");
    assert_eq!(body["samples"].as_array().map(Vec::len), Some(60));

    let (_, body) = send(&app.router, "GET", "/api/v1/series/eye_redness?limit=5", None).await;
    assert_eq!(body["samples"].as_array().map(Vec::len), Some(5));

    let (status, _) = send(&app.router, "GET", "/api/v1/series/pulse", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sensor_feed_configuration() {
    let app = setup_test_app().await;

    let (status, _) = send(&app.router, "POST", "/api/v1/sensor-feed/refresh", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/v1/sensor-feed",
        Some(json!({ "url": "not a url" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/v1/sensor-feed",
        Some(json!({ "url": "http://sensors.local/data" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "http://sensors.local/data");
}

#[tokio::test]
async fn test_frame_requires_inference_provider() {
    let app = setup_test_app().await;
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/v1/frames",
        Some(json!({ "image": "aGVsbG8=" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "UNAVAILABLE");
}

#[tokio::test]
async fn test_healthz_reports_settings_write_failures() {
    let app = setup_test_app_with_store(Arc::new(ReadOnlyStore)).await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/v1/snooze",
        Some(json!({ "minutes": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, health) = send(&app.router, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["components"]["storage"]["status"], "degraded");

    let (_, state) = send(&app.router, "GET", "/api/v1/state", None).await;
    assert!(state["storageError"]
        .as_str()
        .unwrap_or_default()
        .contains("read-only filesystem"));
}

#[tokio::test]
async fn test_snooze_with_huge_duration_saturates() {
    let app = setup_test_app().await;

    let (status, config) = send(
        &app.router,
        "POST",
        "/api/v1/snooze",
        Some(json!({ "minutes": i64::MAX / 60_000 + 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(config["snoozeUntil"], i64::MAX);

    let (_, state) = send(&app.router, "GET", "/api/v1/state", None).await;
    assert_eq!(state["snoozed"], true);
}

#[tokio::test]
async fn test_restart_after_cancel_keeps_new_window() {
    let app = setup_test_app().await;

    send(&app.router, "POST", "/api/v1/calibration/start", None).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let (_, body) = send(&app.router, "POST", "/api/v1/calibration/cancel", None).await;
    assert_eq!(body["changed"], true);

    let (_, body) = send(&app.router, "POST", "/api/v1/calibration/start", None).await;
    assert_eq!(body["changed"], true);

    // Several ticks of the new timer
    tokio::time::sleep(Duration::from_millis(30)).await;
    let (_, state) = send(&app.router, "GET", "/api/v1/state", None).await;
    assert_eq!(state["calibration"]["isCalibrating"], true);
}
