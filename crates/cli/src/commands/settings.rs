//! Threshold, snooze and sensor-feed settings

use anyhow::{bail, Result};
use tabled::Tabled;

use crate::client::{
    AlertConfig, ApiClient, RefreshResponse, SensorFeedRequest, SensorFeedResponse, SnoozeRequest,
    StateSnapshot, Thresholds,
};
use crate::commands::alerts::print_alerts;
use crate::output::{
    format_timestamp, print_json, print_success, print_table, print_warning, OutputFormat,
};

/// Per-channel threshold overrides; unset channels keep their value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdChanges {
    pub blink_rate: Option<f64>,
    pub eye_redness: Option<f64>,
    pub emotion: Option<f64>,
    pub environmental: Option<f64>,
}

impl ThresholdChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, current: Thresholds) -> Thresholds {
        Thresholds {
            blink_rate: self.blink_rate.unwrap_or(current.blink_rate),
            eye_redness: self.eye_redness.unwrap_or(current.eye_redness),
            emotion: self.emotion.unwrap_or(current.emotion),
            environmental: self.environmental.unwrap_or(current.environmental),
        }
    }
}

#[derive(Tabled)]
struct ThresholdRow {
    #[tabled(rename = "Channel")]
    channel: &'static str,
    #[tabled(rename = "Sensitivity (σ)")]
    sigma: String,
}

fn print_thresholds(thresholds: &Thresholds, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(thresholds);
    }
    let rows = [
        ("Blink rate", thresholds.blink_rate),
        ("Eye redness", thresholds.eye_redness),
        ("Emotion", thresholds.emotion),
        ("Environment", thresholds.environmental),
    ]
    .into_iter()
    .map(|(channel, sigma)| ThresholdRow {
        channel,
        sigma: format!("{:.1}", sigma),
    })
    .collect::<Vec<_>>();
    print_table(&rows);
    Ok(())
}

/// Show the current σ-multipliers
pub async fn show_thresholds(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let state: StateSnapshot = client.get("api/v1/state").await?;
    print_thresholds(&state.thresholds, format)
}

/// Update selected σ-multipliers; the agent rejects values outside [0.5, 5]
pub async fn set_thresholds(
    client: &ApiClient,
    changes: ThresholdChanges,
    format: OutputFormat,
) -> Result<()> {
    if changes.is_empty() {
        bail!("No thresholds given; pass at least one of --blink-rate, --eye-redness, --emotion, --environmental");
    }

    let state: StateSnapshot = client.get("api/v1/state").await?;
    let updated: Thresholds = client
        .put("api/v1/thresholds", &changes.apply(state.thresholds))
        .await?;

    if format == OutputFormat::Table {
        print_success("Thresholds updated");
    }
    print_thresholds(&updated, format)
}

/// Suppress new alerts for a number of minutes
pub async fn snooze(client: &ApiClient, minutes: i64, format: OutputFormat) -> Result<()> {
    let config: AlertConfig = client
        .post("api/v1/snooze", &SnoozeRequest { minutes })
        .await?;

    if format == OutputFormat::Json {
        return print_json(&config);
    }
    match config.snooze_until {
        Some(until) => print_success(&format!("Alerts snoozed until {}", format_timestamp(until))),
        None => print_warning("Snooze was not applied"),
    }
    Ok(())
}

/// Turn the alert sound flag on or off
pub async fn set_sound(client: &ApiClient, enabled: bool, format: OutputFormat) -> Result<()> {
    let state: StateSnapshot = client.get("api/v1/state").await?;
    let config = AlertConfig {
        sound_enabled: enabled,
        ..state.alert_config
    };
    let config: AlertConfig = client.put("api/v1/alert-config", &config).await?;

    if format == OutputFormat::Json {
        return print_json(&config);
    }
    print_success(if config.sound_enabled {
        "Alert sound enabled"
    } else {
        "Alert sound disabled"
    });
    Ok(())
}

/// Set or clear the room-sensor feed URL
pub async fn set_feed_url(
    client: &ApiClient,
    url: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let response: SensorFeedResponse = client
        .put("api/v1/sensor-feed", &SensorFeedRequest { url })
        .await?;

    if format == OutputFormat::Json {
        return print_json(&response);
    }
    match &response.url {
        Some(url) => print_success(&format!("Sensor feed set to {}", url)),
        None => print_success("Sensor feed cleared"),
    }
    Ok(())
}

/// Poll the sensor feed now and report any alerts it raised
pub async fn refresh_feed(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let response: RefreshResponse = client.post_empty("api/v1/sensor-feed/refresh").await?;

    if format == OutputFormat::Json {
        return print_json(&response);
    }
    match &response.feed_status.last_error {
        Some(error) => print_warning(&format!("Sensor feed error: {}", error)),
        None => print_success(&format!(
            "Sensor feed refreshed ({} records)",
            response.feed_status.records
        )),
    }
    if !response.alerts.is_empty() {
        print_alerts(&response.alerts, format)?;
    }
    Ok(())
}
