//! Z-score deviation detection
//!
//! Scores a single value against a calibrated baseline stat. The boolean
//! decision uses the channel's σ threshold; severity is classified on fixed
//! tiers independent of that threshold.

use crate::models::{Channel, ChannelStat, Severity};

/// z above this is `High`
const HIGH_SEVERITY_Z: f64 = 3.0;

/// z above this (and at most `HIGH_SEVERITY_Z`) is `Medium`
const MEDIUM_SEVERITY_Z: f64 = 2.0;

/// Absolute z-score, or `None` when the stat has no spread
pub fn z_score(value: f64, stat: &ChannelStat) -> Option<f64> {
    if stat.std == 0.0 {
        return None;
    }
    Some(((value - stat.mean) / stat.std).abs())
}

/// True when `|value - mean| / std > threshold_sigma`
///
/// Always false for a zero-variance baseline.
pub fn is_anomaly(value: f64, stat: &ChannelStat, threshold_sigma: f64) -> bool {
    match z_score(value, stat) {
        Some(z) => z > threshold_sigma,
        None => false,
    }
}

/// Severity tier for a value: z > 3 high, 2 < z <= 3 medium, else low
pub fn severity(value: f64, stat: &ChannelStat) -> Severity {
    match z_score(value, stat) {
        Some(z) if z > HIGH_SEVERITY_Z => Severity::High,
        Some(z) if z > MEDIUM_SEVERITY_Z => Severity::Medium,
        _ => Severity::Low,
    }
}

/// Which side of the baseline mean a value fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Above,
    /// Includes values equal to the mean
    Below,
}

/// Stateless z-score detector
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreDetector;

impl ZScoreDetector {
    pub fn new() -> Self {
        Self
    }

    /// Score a value against its baseline stat
    ///
    /// # Returns
    /// * `Some(Deviation)` if the value exceeds `threshold_sigma`
    /// * `None` otherwise, including when the baseline has zero variance
    pub fn detect(
        &self,
        channel: Channel,
        value: f64,
        stat: &ChannelStat,
        threshold_sigma: f64,
    ) -> Option<Deviation> {
        let z = z_score(value, stat)?;
        if z <= threshold_sigma {
            return None;
        }

        Some(Deviation {
            channel,
            value,
            baseline: *stat,
            z_score: z,
            threshold: threshold_sigma,
            severity: severity(value, stat),
            direction: if value > stat.mean {
                Direction::Above
            } else {
                Direction::Below
            },
        })
    }
}

/// A value that deviated from its baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deviation {
    pub channel: Channel,
    pub value: f64,
    pub baseline: ChannelStat,
    pub z_score: f64,
    /// Threshold that was exceeded
    pub threshold: f64,
    pub severity: Severity,
    pub direction: Direction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> ChannelStat {
        ChannelStat::new(15.0, 2.0)
    }

    #[test]
    fn test_medium_deviation() {
        // z = 2.5
        assert!(is_anomaly(20.0, &baseline(), 2.0));
        assert_eq!(severity(20.0, &baseline()), Severity::Medium);
    }

    #[test]
    fn test_high_deviation() {
        // z = 5
        assert!(is_anomaly(25.0, &baseline(), 2.0));
        assert_eq!(severity(25.0, &baseline()), Severity::High);
    }

    #[test]
    fn test_within_range() {
        // z = 0.5
        assert!(!is_anomaly(16.0, &baseline(), 2.0));
        assert_eq!(severity(16.0, &baseline()), Severity::Low);
    }

    #[test]
    fn test_zero_std_never_anomalous() {
        let flat = ChannelStat::new(10.0, 0.0);
        for value in [-1e9, 0.0, 10.0, 11.0, 1e9] {
            assert!(!is_anomaly(value, &flat, 0.5));
            assert_eq!(severity(value, &flat), Severity::Low);
        }
        assert!(ZScoreDetector::new()
            .detect(Channel::BlinkRate, 1e9, &flat, 0.5)
            .is_none());
    }

    #[test]
    fn test_tier_boundaries_are_exclusive() {
        // z exactly 3 is medium, exactly 2 is low
        assert_eq!(severity(21.0, &baseline()), Severity::Medium);
        assert_eq!(severity(19.0, &baseline()), Severity::Low);
    }

    #[test]
    fn test_severity_ignores_threshold() {
        // Low threshold flags the value, severity still follows fixed tiers
        let deviation = ZScoreDetector::new()
            .detect(Channel::EyeRedness, 18.0, &baseline(), 1.0)
            .unwrap();
        assert_eq!(deviation.severity, Severity::Low);
        assert!((deviation.z_score - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_direction() {
        let detector = ZScoreDetector::new();
        let above = detector
            .detect(Channel::BlinkRate, 30.0, &baseline(), 2.0)
            .unwrap();
        assert_eq!(above.direction, Direction::Above);

        let below = detector
            .detect(Channel::BlinkRate, 5.0, &baseline(), 2.0)
            .unwrap();
        assert_eq!(below.direction, Direction::Below);
        assert_eq!(below.severity, Severity::High);
    }
}
