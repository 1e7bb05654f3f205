//! Baseline and calibration commands

use anyhow::Result;
use std::time::Duration;
use tabled::Tabled;

use crate::client::{ApiClient, Baseline, CalibrationResponse, StateSnapshot};
use crate::output::{
    format_progress, format_stat, format_timestamp, print_info, print_json, print_success,
    print_table, print_warning, OutputFormat,
};

const CALIBRATION_POLL: Duration = Duration::from_secs(1);

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Mean ± Std")]
    stat: String,
}

fn stat_rows(baseline: &Baseline) -> Vec<StatRow> {
    let mut rows = vec![
        StatRow {
            metric: "Blink rate".to_string(),
            stat: format_stat(baseline.blink_rate.mean, baseline.blink_rate.std),
        },
        StatRow {
            metric: "Eye redness".to_string(),
            stat: format_stat(baseline.eye_redness.mean, baseline.eye_redness.std),
        },
    ];
    rows.extend(baseline.emotions.iter().map(|(name, s)| StatRow {
        metric: format!("Emotion: {}", name),
        stat: format_stat(s.mean, s.std),
    }));
    rows.extend(baseline.environmental.iter().map(|(name, s)| StatRow {
        metric: format!("Room: {}", name),
        stat: format_stat(s.mean, s.std),
    }));
    rows
}

fn print_baseline(baseline: &Baseline, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(baseline);
    }
    print_table(&stat_rows(baseline));
    println!("\nCalibrated: {}", format_timestamp(baseline.calibrated_at));
    Ok(())
}

/// Show the active baseline
pub async fn show_baseline(client: &ApiClient, format: OutputFormat) -> Result<()> {
    match client.get_optional::<Baseline>("api/v1/baseline").await? {
        Some(baseline) => print_baseline(&baseline, format),
        None => {
            print_warning("No baseline calibrated");
            Ok(())
        }
    }
}

/// Capture a baseline from the most recent samples
pub async fn save_baseline(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let baseline: Baseline = client.post_empty("api/v1/baseline").await?;
    if format == OutputFormat::Table {
        print_success("Baseline saved from recent samples");
    }
    print_baseline(&baseline, format)
}

/// Remove the baseline, disabling detection
pub async fn delete_baseline(client: &ApiClient) -> Result<()> {
    client.delete("api/v1/baseline").await?;
    print_success("Baseline deleted; anomaly detection is off");
    Ok(())
}

/// Start a calibration run, optionally waiting for it and saving the result
pub async fn start_calibration(
    client: &ApiClient,
    wait: bool,
    save: bool,
    format: OutputFormat,
) -> Result<()> {
    let response: CalibrationResponse = client.post_empty("api/v1/calibration/start").await?;

    if !wait && !save {
        if format == OutputFormat::Json {
            return print_json(&response);
        }
        if response.changed {
            print_success("Calibration started");
        } else {
            print_info(&format!(
                "Calibration already running ({})",
                format_progress(response.status.progress)
            ));
        }
        return Ok(());
    }

    let mut last_reported = -1.0;
    loop {
        let state: StateSnapshot = client.get("api/v1/state").await?;
        let status = state.calibration;
        if !status.is_calibrating {
            break;
        }
        if format == OutputFormat::Table && status.progress - last_reported >= 10.0 {
            print_info(&format!("Calibrating... {}", format_progress(status.progress)));
            last_reported = status.progress;
        }
        tokio::time::sleep(CALIBRATION_POLL).await;
    }

    if format == OutputFormat::Table {
        print_success("Calibration finished");
    }
    if save {
        save_baseline(client, format).await?;
    }
    Ok(())
}

/// Abort a running calibration
pub async fn cancel_calibration(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let response: CalibrationResponse = client.post_empty("api/v1/calibration/cancel").await?;

    if format == OutputFormat::Json {
        return print_json(&response);
    }
    if response.changed {
        print_success("Calibration cancelled");
    } else {
        print_info("No calibration was running");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_start_and_wait_then_save() {
        let mut server = mockito::Server::new_async().await;
        let start = server
            .mock("POST", "/api/v1/calibration/start")
            .with_status(200)
            .with_body(json!({"changed": true, "status": {"isCalibrating": true, "progress": 0.0}}).to_string())
            .create_async()
            .await;
        let state = server
            .mock("GET", "/api/v1/state")
            .with_status(200)
            .with_body(
                json!({
                    "live": {"blinkRate": 15.0, "eyeRedness": 0.2, "emotion": {}, "environmental": {}},
                    "baseline": null,
                    "calibration": {"isCalibrating": false, "progress": 0.0},
                    "thresholds": {"blinkRate": 2.0, "eyeRedness": 2.0, "emotion": 2.0, "environmental": 2.0},
                    "alertConfig": {"enabled": true, "soundEnabled": false},
                    "snoozed": false,
                    "alertCount": 0,
                    "feedStatus": {"loading": false, "records": 0},
                    "now": 0
                })
                .to_string(),
            )
            .create_async()
            .await;
        let save = server
            .mock("POST", "/api/v1/baseline")
            .with_status(201)
            .with_body(
                json!({
                    "blinkRate": {"mean": 15.0, "std": 1.0},
                    "eyeRedness": {"mean": 0.2, "std": 0.05},
                    "emotions": {},
                    "environmental": {},
                    "calibratedAt": 0
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        start_calibration(&client, true, true, OutputFormat::Json)
            .await
            .unwrap();

        start.assert_async().await;
        state.assert_async().await;
        save.assert_async().await;
    }

    #[test]
    fn test_stat_rows_cover_nested_metrics() {
        let baseline: Baseline = serde_json::from_value(json!({
            "blinkRate": {"mean": 15.0, "std": 1.0},
            "eyeRedness": {"mean": 0.2, "std": 0.05},
            "emotions": {"happy": {"mean": 0.3, "std": 0.1}},
            "environmental": {"light": {"mean": 300.0, "std": 20.0}},
            "calibratedAt": 0
        }))
        .unwrap();

        let rows = stat_rows(&baseline);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].metric, "Room: light");
        assert_eq!(rows[3].stat, "300.00 ± 20.00");
    }
}
