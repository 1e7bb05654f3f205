//! Mean / standard deviation estimation for calibration windows

use crate::models::ChannelStat;

/// Compute mean and population standard deviation (divide by N)
///
/// An empty window yields `{mean: 0, std: 0}` rather than NaN; calibration
/// over a channel that never received samples is degenerate but valid.
pub fn mean_and_std(values: &[f64]) -> ChannelStat {
    if values.is_empty() {
        return ChannelStat::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    ChannelStat {
        mean,
        std: variance.sqrt(),
    }
}

/// Same as [`mean_and_std`] over a projection of each item
pub fn stat_of<T, F>(items: &[T], project: F) -> ChannelStat
where
    F: Fn(&T) -> f64,
{
    let values: Vec<f64> = items.iter().map(project).collect();
    mean_and_std(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_is_zero() {
        assert_eq!(mean_and_std(&[]), ChannelStat::new(0.0, 0.0));
    }

    #[test]
    fn test_population_std() {
        // 2, 4, 4, 4, 5, 5, 7, 9 -> mean 5, population std 2
        let stat = mean_and_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stat.mean - 5.0).abs() < 1e-12);
        assert!((stat.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_window_has_zero_std() {
        let stat = mean_and_std(&[3.5; 30]);
        assert_eq!(stat.mean, 3.5);
        assert_eq!(stat.std, 0.0);
    }

    #[test]
    fn test_std_never_negative() {
        let windows: [&[f64]; 4] = [&[1.0], &[-5.0, 5.0], &[1e9, -1e9, 0.0], &[0.1, 0.2, 0.3]];
        for window in windows {
            assert!(mean_and_std(window).std >= 0.0);
        }
    }

    #[test]
    fn test_stat_of_projection() {
        let pairs = [(0, 1.0), (1, 3.0)];
        let stat = stat_of(&pairs, |(_, v)| *v);
        assert_eq!(stat.mean, 2.0);
        assert_eq!(stat.std, 1.0);
    }
}
