//! Momentum indicators over a time-ordered price series (oldest first)

use serde::{Deserialize, Serialize};

/// Most recent MACD values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Exponential moving average seeded with the first value, multiplier `2/(n+1)`.
/// Returns one value per input point; empty for an empty series or `period == 0`.
pub fn ema(series: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = series.first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut current = first;
    out.push(current);
    for &value in &series[1..] {
        current = (value - current) * multiplier + current;
        out.push(current);
    }
    out
}

/// Relative Strength Index over the trailing `period` changes.
///
/// Gains and losses are averaged with a simple mean over the window (not
/// Wilder smoothing). `RSI = 100 - 100 / (1 + avgGain/avgLoss)`, and exactly
/// 100 when the window has no losses, including a perfectly flat window.
/// `None` with fewer than `period + 1` points.
pub fn calculate_rsi(series: &[f64], period: usize) -> Option<f64> {
    if period == 0 || series.len() < period + 1 {
        return None;
    }

    let window = &series[series.len() - period - 1..];
    if window.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD line, signal line and histogram at the last point.
///
/// The MACD line starts where the slow EMA has seen `slow` points; the
/// signal line is an EMA of that line. `None` when the series is shorter
/// than `slow` or any period is zero.
pub fn calculate_macd(series: &[f64], fast: usize, slow: usize, signal: usize) -> Option<Macd> {
    if fast == 0 || slow == 0 || signal == 0 || series.len() < slow {
        return None;
    }
    if series.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let fast_ema = ema(series, fast);
    let slow_ema = ema(series, slow);

    let macd_line: Vec<f64> = (slow - 1..series.len())
        .map(|i| fast_ema[i] - slow_ema[i])
        .collect();
    let signal_line = ema(&macd_line, signal);

    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;

    Some(Macd {
        macd,
        signal,
        histogram: macd - signal,
    })
}
