//! Output formatting utilities

use chrono::{Local, TimeZone};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any response as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format epoch milliseconds in local time
pub fn format_timestamp(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch_ms.to_string(),
    }
}

/// Format a mean/std pair
pub fn format_stat(mean: f64, std: f64) -> String {
    format!("{:.2} ± {:.2}", mean, std)
}

/// Format a calibration progress percentage
pub fn format_progress(progress: f64) -> String {
    format!("{:.0}%", progress.clamp(0.0, 100.0))
}

/// Human name for a channel identifier
pub fn channel_label(channel: &str) -> &str {
    match channel {
        "blink_rate" => "Blink rate",
        "eye_redness" => "Eye redness",
        "emotion" => "Emotion",
        "environmental" => "Environment",
        other => other,
    }
}

/// Color severity based on value
pub fn color_severity(severity: &str) -> String {
    match severity.to_lowercase().as_str() {
        "low" => severity.blue().to_string(),
        "medium" => severity.yellow().to_string(),
        "high" => severity.red().bold().to_string(),
        _ => severity.to_string(),
    }
}

/// Color an on/off flag
pub fn color_flag(enabled: bool) -> String {
    if enabled {
        "on".green().to_string()
    } else {
        "off".red().to_string()
    }
}
