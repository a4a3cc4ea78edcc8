//! Volume indicators

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpike {
    pub is_spike: bool,
    pub ratio: f64,
}

impl VolumeSpike {
    pub const NONE: VolumeSpike = VolumeSpike {
        is_spike: false,
        ratio: 0.0,
    };
}

/// Last value against the mean of everything before it.
/// Needs at least 3 points and a non-zero baseline, otherwise `(false, 0.0)`.
pub fn detect_volume_spike(series: &[f64], threshold: f64) -> VolumeSpike {
    if series.len() < 3 {
        return VolumeSpike::NONE;
    }

    let (last, baseline) = match series.split_last() {
        Some((last, baseline)) => (*last, baseline),
        None => return VolumeSpike::NONE,
    };
    let mean = baseline.iter().sum::<f64>() / baseline.len() as f64;
    if mean == 0.0 || !mean.is_finite() || !last.is_finite() {
        return VolumeSpike::NONE;
    }

    let ratio = last / mean;
    VolumeSpike {
        is_spike: ratio > threshold,
        ratio,
    }
}

/// Day-over-day fractional changes; `None` if any base value is zero or non-finite
pub fn pct_changes(series: &[f64]) -> Option<Vec<f64>> {
    series
        .windows(2)
        .map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            if prev == 0.0 || !prev.is_finite() || !next.is_finite() {
                None
            } else {
                Some((next - prev) / prev)
            }
        })
        .collect()
}

/// Pearson correlation; 0 for mismatched, short or zero-variance inputs
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Correlation of the percentage changes of two equally long series
pub fn price_volume_correlation(prices: &[f64], volumes: &[f64]) -> f64 {
    if prices.len() != volumes.len() || prices.len() < 2 {
        return 0.0;
    }

    match (pct_changes(prices), pct_changes(volumes)) {
        (Some(price_changes), Some(volume_changes)) => pearson(&price_changes, &volume_changes),
        _ => 0.0,
    }
}

/// Latest value divided by the mean of the `lookback` values before it
pub fn recent_volume_ratio(series: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 || series.len() < lookback + 1 {
        return None;
    }

    let (last, rest) = series.split_last()?;
    let window = &rest[rest.len() - lookback..];
    let mean = window.iter().sum::<f64>() / lookback as f64;
    if mean <= 0.0 || !mean.is_finite() || !last.is_finite() {
        return None;
    }
    Some(last / mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_detected() {
        let spike = detect_volume_spike(&[10.0, 10.0, 10.0, 1000.0], 20.0);
        assert!(spike.is_spike);
        assert_eq!(spike.ratio, 100.0);
    }

    #[test]
    fn test_spike_needs_three_points() {
        assert_eq!(detect_volume_spike(&[1.0, 2.0], 20.0), VolumeSpike::NONE);
    }

    #[test]
    fn test_spike_zero_baseline() {
        assert_eq!(detect_volume_spike(&[0.0, 0.0, 50.0], 20.0), VolumeSpike::NONE);
    }

    #[test]
    fn test_no_spike_below_threshold() {
        let spike = detect_volume_spike(&[10.0, 10.0, 30.0], 20.0);
        assert!(!spike.is_spike);
        assert_eq!(spike.ratio, 3.0);
    }

    #[test]
    fn test_correlation_of_identical_changes_is_one() {
        let prices = [100.0, 110.0, 99.0, 120.0, 118.0];
        let volumes = [1000.0, 1100.0, 990.0, 1200.0, 1180.0];
        let r = price_volume_correlation(&prices, &volumes);
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_degenerate_inputs() {
        assert_eq!(price_volume_correlation(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(price_volume_correlation(&[1.0], &[1.0]), 0.0);
        assert_eq!(price_volume_correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(price_volume_correlation(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_correlation_inverse() {
        let prices = [100.0, 110.0, 100.0, 110.0];
        let volumes = [100.0, 90.0, 99.0, 89.1];
        assert!((price_volume_correlation(&prices, &volumes) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recent_volume_ratio() {
        assert_eq!(recent_volume_ratio(&[999.0, 10.0, 20.0, 30.0, 40.0], 3), Some(2.0));
        assert_eq!(recent_volume_ratio(&[10.0, 20.0], 3), None);
        assert_eq!(recent_volume_ratio(&[0.0, 0.0, 0.0, 5.0], 3), None);
    }
}
