//! Which sub-metrics of grouped channels are scored against the baseline
//!
//! Emotion and environmental samples carry several values but only some are
//! checked. By default only sadness (the stress proxy) and humidity are.

use serde::{Deserialize, Serialize};

use crate::models::{
    Baseline, ChannelStat, EmotionMetric, EmotionScores, EnvironmentalMetric,
    EnvironmentalReading,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCoverage {
    pub emotion: Vec<EmotionMetric>,
    pub environmental: Vec<EnvironmentalMetric>,
}

impl Default for ChannelCoverage {
    fn default() -> Self {
        Self {
            emotion: vec![EmotionMetric::Sad],
            environmental: vec![EnvironmentalMetric::Humidity],
        }
    }
}

impl ChannelCoverage {
    /// Every sub-metric with a baseline stat is checked
    pub fn all() -> Self {
        Self {
            emotion: vec![
                EmotionMetric::Happy,
                EmotionMetric::Sad,
                EmotionMetric::Neutral,
            ],
            environmental: vec![
                EnvironmentalMetric::Temperature,
                EnvironmentalMetric::Humidity,
                EnvironmentalMetric::Light,
            ],
        }
    }

    /// (value, stat) pairs to score for an emotion sample
    pub fn emotion_targets(
        &self,
        scores: &EmotionScores,
        baseline: &Baseline,
    ) -> Vec<(f64, ChannelStat)> {
        self.emotion
            .iter()
            .map(|m| (m.value_of(scores), baseline.emotions.stat(*m)))
            .collect()
    }

    /// (value, stat) pairs to score for an environmental sample
    pub fn environmental_targets(
        &self,
        reading: &EnvironmentalReading,
        baseline: &Baseline,
    ) -> Vec<(f64, ChannelStat)> {
        self.environmental
            .iter()
            .map(|m| (m.value_of(reading), baseline.environmental.stat(*m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmotionBaseline, EnvironmentalBaseline};

    fn baseline() -> Baseline {
        Baseline {
            blink_rate: ChannelStat::default(),
            eye_redness: ChannelStat::default(),
            emotions: EmotionBaseline {
                happy: ChannelStat::new(0.5, 0.1),
                sad: ChannelStat::new(0.1, 0.05),
                neutral: ChannelStat::new(0.3, 0.1),
            },
            environmental: EnvironmentalBaseline {
                temperature: ChannelStat::new(22.0, 1.0),
                humidity: ChannelStat::new(45.0, 3.0),
                light: ChannelStat::new(300.0, 40.0),
            },
            calibrated_at: 0,
        }
    }

    #[test]
    fn test_default_checks_sad_and_humidity_only() {
        let coverage = ChannelCoverage::default();
        let scores = EmotionScores::default();
        let targets = coverage.emotion_targets(&scores, &baseline());
        assert_eq!(targets, vec![(0.1, ChannelStat::new(0.1, 0.05))]);

        let reading = EnvironmentalReading {
            temperature: 30.0,
            humidity: 20.0,
            light: 50.0,
        };
        let targets = coverage.environmental_targets(&reading, &baseline());
        assert_eq!(targets, vec![(20.0, ChannelStat::new(45.0, 3.0))]);
    }

    #[test]
    fn test_all_coverage() {
        let coverage = ChannelCoverage::all();
        let reading = EnvironmentalReading::default();
        assert_eq!(coverage.environmental_targets(&reading, &baseline()).len(), 3);
    }
}
