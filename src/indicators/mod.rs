//! Indicator engine
//!
//! Pure, stateless functions over time-ordered series (oldest first).
//! Insufficient input yields `None` or a neutral sentinel, never a panic.

pub mod momentum;
pub mod volume;

pub use momentum::{calculate_macd, calculate_rsi, ema, Macd};
pub use volume::{
    detect_volume_spike, pct_changes, pearson, price_volume_correlation, recent_volume_ratio,
    VolumeSpike,
};

use crate::config::IndicatorConfig;
use serde::{Deserialize, Serialize};

/// Indicator parameters; defaults come from `[indicators]`, callers may override
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub spike_threshold: f64,
}

impl From<&IndicatorConfig> for IndicatorParams {
    fn from(config: &IndicatorConfig) -> Self {
        Self {
            rsi_period: config.rsi_period,
            macd_fast: config.macd_fast,
            macd_slow: config.macd_slow,
            macd_signal: config.macd_signal,
            spike_threshold: config.spike_threshold,
        }
    }
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self::from(&IndicatorConfig::default())
    }
}

/// Every indicator for one venue's daily closes and volumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub rsi: Option<f64>,
    pub macd: Option<Macd>,
    pub volume_spike: VolumeSpike,
    pub price_volume_correlation: f64,
}

pub fn summarize(closes: &[f64], volumes: &[f64], params: &IndicatorParams) -> IndicatorSummary {
    IndicatorSummary {
        rsi: calculate_rsi(closes, params.rsi_period),
        macd: calculate_macd(
            closes,
            params.macd_fast,
            params.macd_slow,
            params.macd_signal,
        ),
        volume_spike: detect_volume_spike(volumes, params.spike_threshold),
        price_volume_correlation: price_volume_correlation(closes, volumes),
    }
}
