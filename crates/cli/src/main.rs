//! Wellness Monitor CLI
//!
//! A command-line tool for inspecting live metrics, managing the personal
//! baseline and working with alerts on a running wellness agent.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::samples::Sample;
use commands::settings::ThresholdChanges;
use commands::{alerts, baseline, samples, settings, status};

/// Wellness Monitor CLI
#[derive(Parser)]
#[command(name = "wellness")]
#[command(author, version, about = "CLI for the Wellness Monitor agent", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via WELLNESS_API_URL env var or the config file)
    #[arg(long, env = "WELLNESS_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show live metrics, baseline and alert state
    Status,

    /// List, dismiss and toggle alerts
    #[command(subcommand)]
    Alerts(AlertCommands),

    /// Inspect or manage the personal baseline
    #[command(subcommand)]
    Baseline(BaselineCommands),

    /// Run or cancel a calibration
    #[command(subcommand)]
    Calibrate(CalibrateCommands),

    /// Suppress new alerts for a while
    Snooze {
        /// Minutes to snooze
        #[arg(default_value_t = 15, value_parser = clap::value_parser!(i64).range(1..))]
        minutes: i64,
    },

    /// Show or change detection sensitivity
    #[command(subcommand)]
    Thresholds(ThresholdCommands),

    /// Submit a sample by hand
    #[command(subcommand)]
    Sample(SampleCommands),

    /// Configure the room-sensor feed
    #[command(subcommand)]
    Feed(FeedCommands),

    /// Manage the local CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum AlertCommands {
    /// List active alerts, newest first
    List,

    /// Dismiss an alert
    Dismiss {
        /// Alert ID
        id: u64,
    },

    /// Enable alert generation
    Enable,

    /// Disable alert generation
    Disable,

    /// Turn the alert sound on or off
    Sound {
        #[arg(action = clap::ArgAction::Set, value_parser = parse_on_off)]
        state: bool,
    },
}

#[derive(Subcommand)]
pub enum BaselineCommands {
    /// Show the active baseline
    Show,

    /// Capture a baseline from the most recent samples
    Save,

    /// Delete the baseline, turning detection off
    Delete,
}

#[derive(Subcommand)]
pub enum CalibrateCommands {
    /// Start a calibration run
    Start {
        /// Wait for the run to finish
        #[arg(long)]
        wait: bool,

        /// Save a baseline when the run finishes (implies --wait)
        #[arg(long)]
        save: bool,
    },

    /// Cancel a running calibration
    Cancel,
}

#[derive(Subcommand)]
pub enum ThresholdCommands {
    /// Show current thresholds
    Show,

    /// Set one or more thresholds (σ-multipliers in [0.5, 5])
    Set {
        #[arg(long)]
        blink_rate: Option<f64>,

        #[arg(long)]
        eye_redness: Option<f64>,

        #[arg(long)]
        emotion: Option<f64>,

        #[arg(long)]
        environmental: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum SampleCommands {
    /// Blinks per minute
    BlinkRate { value: f64 },

    /// Eye redness in [0, 1]
    EyeRedness { value: f64 },

    /// Emotion distribution
    Emotion {
        #[arg(long, default_value_t = 0.0)]
        happy: f64,
        #[arg(long, default_value_t = 0.0)]
        sad: f64,
        #[arg(long, default_value_t = 1.0)]
        neutral: f64,
        #[arg(long, default_value_t = 0.0)]
        surprised: f64,
        #[arg(long, default_value_t = 0.0)]
        angry: f64,
    },

    /// Room conditions
    Environmental {
        /// Degrees Celsius
        #[arg(long)]
        temperature: f64,
        /// Relative humidity, percent
        #[arg(long)]
        humidity: f64,
        /// Light level, lux
        #[arg(long)]
        light: f64,
    },
}

#[derive(Subcommand)]
pub enum FeedCommands {
    /// Set the feed URL
    Set { url: String },

    /// Stop polling the feed
    Clear,

    /// Poll the feed now
    Refresh,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,

    /// Store the default API URL
    SetUrl { url: String },
}

fn parse_on_off(value: &str) -> Result<bool, String> {
    match value {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(format!("expected `on` or `off`, got `{}`", other)),
    }
}

impl From<SampleCommands> for Sample {
    fn from(command: SampleCommands) -> Self {
        match command {
            SampleCommands::BlinkRate { value } => Sample::BlinkRate(value),
            SampleCommands::EyeRedness { value } => Sample::EyeRedness(value),
            SampleCommands::Emotion {
                happy,
                sad,
                neutral,
                surprised,
                angry,
            } => Sample::Emotion {
                happy,
                sad,
                neutral,
                surprised,
                angry,
            },
            SampleCommands::Environmental {
                temperature,
                humidity,
                light,
            } => Sample::Environmental {
                temperature,
                humidity,
                light,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut local_config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Ignoring CLI config: {:#}", e));
            config::Config::default()
        }
    };

    if let Commands::Config(config_cmd) = &cli.command {
        match config_cmd {
            ConfigCommands::Show => {
                println!("Config file: {}", config::Config::config_path()?.display());
                println!("API URL:     {}", local_config.resolve_api_url(cli.api_url.as_deref()));
            }
            ConfigCommands::SetUrl { url } => {
                url::Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid API URL: {}", e))?;
                local_config.api_url = Some(url.clone());
                local_config.save()?;
                output::print_success(&format!("Default API URL set to {}", url));
            }
        }
        return Ok(());
    }

    // Initialize client
    let api_url = local_config.resolve_api_url(cli.api_url.as_deref());
    let client = client::ApiClient::new(&api_url)?;
    let format = cli.format;

    // Execute command
    match cli.command {
        Commands::Status => status::show_status(&client, format).await?,
        Commands::Alerts(alert_cmd) => match alert_cmd {
            AlertCommands::List => alerts::list_alerts(&client, format).await?,
            AlertCommands::Dismiss { id } => alerts::dismiss_alert(&client, id).await?,
            AlertCommands::Enable => alerts::set_enabled(&client, true, format).await?,
            AlertCommands::Disable => alerts::set_enabled(&client, false, format).await?,
            AlertCommands::Sound { state } => settings::set_sound(&client, state, format).await?,
        },
        Commands::Baseline(baseline_cmd) => match baseline_cmd {
            BaselineCommands::Show => baseline::show_baseline(&client, format).await?,
            BaselineCommands::Save => baseline::save_baseline(&client, format).await?,
            BaselineCommands::Delete => baseline::delete_baseline(&client).await?,
        },
        Commands::Calibrate(calibrate_cmd) => match calibrate_cmd {
            CalibrateCommands::Start { wait, save } => {
                baseline::start_calibration(&client, wait || save, save, format).await?
            }
            CalibrateCommands::Cancel => baseline::cancel_calibration(&client, format).await?,
        },
        Commands::Snooze { minutes } => settings::snooze(&client, minutes, format).await?,
        Commands::Thresholds(threshold_cmd) => match threshold_cmd {
            ThresholdCommands::Show => settings::show_thresholds(&client, format).await?,
            ThresholdCommands::Set {
                blink_rate,
                eye_redness,
                emotion,
                environmental,
            } => {
                let changes = ThresholdChanges {
                    blink_rate,
                    eye_redness,
                    emotion,
                    environmental,
                };
                settings::set_thresholds(&client, changes, format).await?
            }
        },
        Commands::Sample(sample_cmd) => samples::submit(&client, sample_cmd.into(), format).await?,
        Commands::Feed(feed_cmd) => match feed_cmd {
            FeedCommands::Set { url } => settings::set_feed_url(&client, Some(url), format).await?,
            FeedCommands::Clear => settings::set_feed_url(&client, None, format).await?,
            FeedCommands::Refresh => settings::refresh_feed(&client, format).await?,
        },
        Commands::Config(_) => {}
    }

    Ok(())
}
