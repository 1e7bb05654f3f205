//! Alert commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{Alert, AlertConfig, ApiClient, StateSnapshot};
use crate::output::{
    channel_label, color_severity, format_timestamp, print_json, print_success, print_table,
    print_warning, OutputFormat,
};

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    anomaly_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Suggestion")]
    suggestion: String,
}

impl From<&Alert> for AlertRow {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id,
            time: format_timestamp(alert.timestamp),
            anomaly_type: channel_label(&alert.anomaly_type).to_string(),
            severity: color_severity(&alert.severity),
            message: alert.message.clone(),
            suggestion: alert.suggestion.clone(),
        }
    }
}

/// Print alerts in the shared table layout
pub fn print_alerts(alerts: &[Alert], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(alerts);
    }
    if alerts.is_empty() {
        print_success("No active alerts");
        return Ok(());
    }

    let rows: Vec<AlertRow> = alerts.iter().map(AlertRow::from).collect();
    print_table(&rows);
    println!("\nTotal: {} alerts", alerts.len());
    Ok(())
}

/// List active alerts, newest first
pub async fn list_alerts(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let alerts: Vec<Alert> = client.get("api/v1/alerts").await?;
    print_alerts(&alerts, format)
}

/// Dismiss one alert by id
pub async fn dismiss_alert(client: &ApiClient, id: u64) -> Result<()> {
    client.delete(&format!("api/v1/alerts/{}", id)).await?;
    print_success(&format!("Alert {} dismissed", id));
    Ok(())
}

/// Turn alert generation on or off, keeping the other alert settings
pub async fn set_enabled(client: &ApiClient, enabled: bool, format: OutputFormat) -> Result<()> {
    let state: StateSnapshot = client.get("api/v1/state").await?;
    let config = AlertConfig {
        enabled,
        ..state.alert_config
    };
    let config: AlertConfig = client.put("api/v1/alert-config", &config).await?;

    if format == OutputFormat::Json {
        return print_json(&config);
    }
    if config.enabled {
        print_success("Alerts enabled");
    } else {
        print_warning("Alerts disabled; anomalies will not be reported");
    }
    Ok(())
}
