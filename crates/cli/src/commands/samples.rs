//! Manual sample submission

use anyhow::Result;
use serde_json::json;

use crate::client::{ApiClient, IngestResponse, ValueRequest};
use crate::commands::alerts::print_alerts;
use crate::output::{print_json, print_success, OutputFormat};

/// One sample for any ingest channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    BlinkRate(f64),
    EyeRedness(f64),
    Emotion {
        happy: f64,
        sad: f64,
        neutral: f64,
        surprised: f64,
        angry: f64,
    },
    Environmental {
        temperature: f64,
        humidity: f64,
        light: f64,
    },
}

impl Sample {
    fn path(&self) -> &'static str {
        match self {
            Sample::BlinkRate(_) => "api/v1/samples/blink-rate",
            Sample::EyeRedness(_) => "api/v1/samples/eye-redness",
            Sample::Emotion { .. } => "api/v1/samples/emotion",
            Sample::Environmental { .. } => "api/v1/samples/environmental",
        }
    }

    fn body(&self) -> serde_json::Value {
        match *self {
            Sample::BlinkRate(value) | Sample::EyeRedness(value) => {
                json!(ValueRequest { value })
            }
            Sample::Emotion {
                happy,
                sad,
                neutral,
                surprised,
                angry,
            } => json!({
                "happy": happy,
                "sad": sad,
                "neutral": neutral,
                "surprised": surprised,
                "angry": angry,
            }),
            Sample::Environmental {
                temperature,
                humidity,
                light,
            } => json!({
                "temperature": temperature,
                "humidity": humidity,
                "light": light,
            }),
        }
    }
}

/// Submit a sample and show any alerts it raised
pub async fn submit(client: &ApiClient, sample: Sample, format: OutputFormat) -> Result<()> {
    let response: IngestResponse = client.post(sample.path(), &sample.body()).await?;

    if format == OutputFormat::Json {
        return print_json(&response);
    }
    if response.alerts.is_empty() {
        print_success("Sample recorded");
        return Ok(());
    }
    print_alerts(&response.alerts, format)
}
