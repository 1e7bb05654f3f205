//! Session overview

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, StateSnapshot};
use crate::output::{
    color_flag, format_progress, format_stat, format_timestamp, print_info, print_json,
    print_table, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Live")]
    live: String,
    #[tabled(rename = "Baseline")]
    baseline: String,
}

/// Show live metrics, baseline, calibration and alert state
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let state: StateSnapshot = client.get("api/v1/state").await?;

    if format == OutputFormat::Json {
        return print_json(&state);
    }

    println!("{}", "Wellness Monitor".bold());
    println!("Time:        {}", format_timestamp(state.now));
    println!("Alerts:      {} ({} active)", color_flag(state.alert_config.enabled), state.alert_count);
    if state.snoozed {
        if let Some(until) = state.alert_config.snooze_until {
            println!("Snoozed:     until {}", format_timestamp(until));
        }
    }
    if state.calibration.is_calibrating {
        println!(
            "Calibrating: {}",
            format_progress(state.calibration.progress).cyan()
        );
    }
    println!();

    print_table(&metric_rows(&state));

    match &state.baseline {
        Some(baseline) => print_info(&format!(
            "Baseline calibrated {}",
            format_timestamp(baseline.calibrated_at)
        )),
        None => print_warning("No baseline calibrated; anomaly detection is off"),
    }

    match &state.sensor_feed_url {
        Some(url) => {
            let feed = &state.feed_status;
            let last = feed
                .last_success_at
                .map(format_timestamp)
                .unwrap_or_else(|| "never".to_string());
            println!("Sensor feed: {} ({} records, last success {})", url, feed.records, last);
            if let Some(error) = &feed.last_error {
                print_warning(&format!("Sensor feed error: {}", error));
            }
        }
        None => println!("Sensor feed: not configured"),
    }
    if let Some(error) = &state.inference_error {
        print_warning(&format!("Inference error: {}", error));
    }
    if let Some(error) = &state.storage_error {
        print_warning(&format!("Settings not saved: {}", error));
    }

    Ok(())
}

fn metric_rows(state: &StateSnapshot) -> Vec<MetricRow> {
    let baseline = state.baseline.as_ref();
    let stat = |s: Option<&crate::client::Stat>| {
        s.map(|s| format_stat(s.mean, s.std))
            .unwrap_or_else(|| "-".to_string())
    };

    let mut rows = vec![
        MetricRow {
            metric: "Blink rate (/min)".to_string(),
            live: format!("{:.1}", state.live.blink_rate),
            baseline: stat(baseline.map(|b| &b.blink_rate)),
        },
        MetricRow {
            metric: "Eye redness".to_string(),
            live: format!("{:.2}", state.live.eye_redness),
            baseline: stat(baseline.map(|b| &b.eye_redness)),
        },
    ];

    for (name, value) in &state.live.emotion {
        rows.push(MetricRow {
            metric: format!("Emotion: {}", name),
            live: format!("{:.2}", value),
            baseline: stat(baseline.and_then(|b| b.emotions.get(name))),
        });
    }
    for (name, value) in &state.live.environmental {
        rows.push(MetricRow {
            metric: format!("Room: {}", name),
            live: format!("{:.1}", value),
            baseline: stat(baseline.and_then(|b| b.environmental.get(name))),
        });
    }

    rows
}
