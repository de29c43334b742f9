// Chart overlays (SMA, Bollinger, RSI, MACD)
pub mod indicators;
