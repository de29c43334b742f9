//! Chart overlays for the price panel and the analysis view
//!
//! This module provides, aligned bar-for-bar with a `PriceSeries`:
//! - Simple moving averages (20, 50, 200)
//! - Bollinger bands around the 50-bar average
//! - RSI and MACD
//!
//! Values are `None` while an indicator warms up and on bars with a missing close
//! (indicators are not advanced with NaN).

use crate::domain::market::PriceSeries;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{
    BollingerBands, MovingAverageConvergenceDivergence, RelativeStrengthIndex,
    SimpleMovingAverage,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub fast_sma_period: usize,
    pub slow_sma_period: usize,
    pub trend_sma_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_sma_period: 20,
            slow_sma_period: 50,
            trend_sma_period: 200,
            bb_period: 50,
            bb_std_dev: 2.0,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOverlays {
    pub sma_fast: Vec<Option<f64>>,
    pub sma_slow: Vec<Option<f64>>,
    pub sma_trend: Vec<Option<f64>>,
    pub bollinger: Vec<Option<BandPoint>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<MacdPoint>>,
}

/// Most recent value of every overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub sma_trend: Option<f64>,
    pub bollinger: Option<BandPoint>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdPoint>,
}

impl ChartOverlays {
    pub fn compute(series: &PriceSeries, config: &IndicatorConfig) -> Result<Self> {
        let closes = series.closes();

        Ok(Self {
            sma_fast: run(&closes, sma(config.fast_sma_period)?, config.fast_sma_period, |v| v),
            sma_slow: run(&closes, sma(config.slow_sma_period)?, config.slow_sma_period, |v| v),
            sma_trend: run(&closes, sma(config.trend_sma_period)?, config.trend_sma_period, |v| v),
            bollinger: run(
                &closes,
                BollingerBands::new(config.bb_period, config.bb_std_dev)
                    .map_err(|e| anyhow!("Invalid Bollinger parameters: {:?}", e))?,
                config.bb_period,
                |out| BandPoint {
                    upper: out.upper,
                    middle: out.average,
                    lower: out.lower,
                },
            ),
            rsi: run(
                &closes,
                RelativeStrengthIndex::new(config.rsi_period)
                    .map_err(|e| anyhow!("Invalid RSI period: {:?}", e))?,
                // RSI needs `period` price changes
                config.rsi_period + 1,
                |v| v,
            ),
            macd: run(
                &closes,
                MovingAverageConvergenceDivergence::new(
                    config.macd_fast,
                    config.macd_slow,
                    config.macd_signal,
                )
                .map_err(|e| anyhow!("Invalid MACD parameters: {:?}", e))?,
                config.macd_slow,
                |out| MacdPoint {
                    macd: out.macd,
                    signal: out.signal,
                    histogram: out.histogram,
                },
            ),
        })
    }

    pub fn latest(&self) -> IndicatorSnapshot {
        IndicatorSnapshot {
            sma_fast: last_value(&self.sma_fast),
            sma_slow: last_value(&self.sma_slow),
            sma_trend: last_value(&self.sma_trend),
            bollinger: last_value(&self.bollinger),
            rsi: last_value(&self.rsi),
            macd: last_value(&self.macd),
        }
    }
}

fn sma(period: usize) -> Result<SimpleMovingAverage> {
    SimpleMovingAverage::new(period).map_err(|e| anyhow!("Invalid SMA period {}: {:?}", period, e))
}

fn run<I, T>(
    closes: &[f64],
    mut indicator: I,
    warmup: usize,
    map: impl Fn(I::Output) -> T,
) -> Vec<Option<T>>
where
    I: Next<f64>,
{
    let mut seen = 0usize;
    closes
        .iter()
        .map(|&close| {
            if !close.is_finite() {
                return None;
            }
            seen += 1;
            let out = indicator.next(close);
            (seen >= warmup).then(|| map(out))
        })
        .collect()
}

/// Value at the last bar only; a stale value from an earlier bar is not carried forward.
fn last_value<T: Copy>(values: &[Option<T>]) -> Option<T> {
    values.last().copied().flatten()
}
