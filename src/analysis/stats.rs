use serde::{Deserialize, Serialize};

/// Aggregate statistics for one Monte Carlo metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub std_dev: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarizes a sample set. Empty input yields NaN fields rather than a
/// panic; callers guarantee non-empty sets in normal operation.
pub fn summarize(values: &[f64]) -> MetricStats {
    if values.is_empty() {
        return MetricStats {
            mean: f64::NAN,
            std_dev: f64::NAN,
            p95: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() > 1 {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    MetricStats {
        mean,
        std_dev,
        p95: percentile_sorted(&sorted, 95.0),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}

/// Linear-interpolation percentile over an ascending-sorted slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn summarize_basic_set() {
        let stats = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_abs_diff_eq!(stats.mean, 3.0);
        assert_abs_diff_eq!(stats.std_dev, 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(stats.min, 1.0);
        assert_abs_diff_eq!(stats.max, 5.0);
        assert_abs_diff_eq!(stats.p95, 4.8, epsilon = 1e-12);
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [10.0, 20.0];
        assert_abs_diff_eq!(percentile_sorted(&sorted, 50.0), 15.0);
        assert_abs_diff_eq!(percentile_sorted(&sorted, 0.0), 10.0);
        assert_abs_diff_eq!(percentile_sorted(&sorted, 100.0), 20.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let stats = summarize(&[7.5]);
        assert_abs_diff_eq!(stats.mean, 7.5);
        assert_abs_diff_eq!(stats.std_dev, 0.0);
        assert_abs_diff_eq!(stats.p95, 7.5);
    }

    #[test]
    fn empty_input_yields_nan() {
        assert!(summarize(&[]).mean.is_nan());
    }
}
