//! Plain-text rendering of a dashboard refresh for the terminal.

use crate::application::forecast_service::{DashboardSnapshot, Forecast};
use crate::application::market_data::indicators::IndicatorSnapshot;
use crate::domain::fundamentals::{Fundamentals, QUARTERLY_METRICS, format_metric};
use std::fmt::{self, Write};

const LABEL_WIDTH: usize = 30;
const QUARTER_COLUMN_WIDTH: usize = 20;

pub fn render_report(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, snapshot);
    out
}

fn write_report(out: &mut String, snapshot: &DashboardSnapshot) -> fmt::Result {
    write_header(out, snapshot)?;
    writeln!(out)?;
    write_sentiment(out, snapshot)?;
    write_forecast(out, &snapshot.forecast)?;
    writeln!(out)?;
    write_indicators(out, &snapshot.overlays.latest())?;

    match &snapshot.fundamentals {
        Some(fundamentals) => write_fundamentals(out, fundamentals)?,
        None => {
            writeln!(out)?;
            writeln!(out, "Fundamentals unavailable")?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Last updated: {}",
        snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn write_header(out: &mut String, snapshot: &DashboardSnapshot) -> fmt::Result {
    let title = format!(
        "{} ({}) | {}",
        snapshot.company_name(),
        snapshot.ticker,
        snapshot.range.label()
    );
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))?;

    let last_close = snapshot.series.last_close();
    let current = snapshot
        .fundamentals
        .as_ref()
        .and_then(|f| f.current_price)
        .or(last_close);

    match current {
        Some(price) => write!(out, "Price: ${:.2}", price)?,
        None => write!(out, "Price: N/A")?,
    }

    if let Some((change, pct)) = snapshot.fundamentals.as_ref().and_then(Fundamentals::day_change) {
        write!(out, "  {:+.2} ({:+.2}%)", change, pct)?;
    }
    writeln!(out)?;

    let series = &snapshot.series;
    if let (Some(first), Some(last)) = (series.first_timestamp(), series.last_timestamp()) {
        writeln!(
            out,
            "History: {} bars ({}) from {} to {}",
            series.len(),
            snapshot.range.timeframe(),
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        )?;
    }

    if let Some(summary) = snapshot
        .fundamentals
        .as_ref()
        .and_then(|f| f.business_summary.as_deref())
    {
        writeln!(out, "{}", truncate(summary, 280))?;
    }

    Ok(())
}

fn write_sentiment(out: &mut String, snapshot: &DashboardSnapshot) -> fmt::Result {
    let report = &snapshot.sentiment;
    writeln!(
        out,
        "News sentiment: {} ({}) from {} articles [{}]",
        report.score,
        report.score.classification(),
        report.articles.len(),
        report.source
    )?;

    for article in report.articles.iter().take(3) {
        writeln!(
            out,
            "  - {}{}",
            article.title,
            article
                .source
                .as_deref()
                .map(|s| format!(" ({})", s))
                .unwrap_or_default()
        )?;
    }

    Ok(())
}

fn write_forecast(out: &mut String, forecast: &Forecast) -> fmt::Result {
    match forecast {
        Forecast::Available {
            predicted,
            change,
            change_pct,
            r_squared,
            training_rows,
            model,
            ..
        } => {
            write!(
                out,
                "Predicted next close: ${:.2} ({:+.2}, {:+.2}%)",
                predicted, change, change_pct
            )?;
            if let Some(r2) = r_squared {
                write!(out, " | R^2 {:.3}", r2)?;
            }
            writeln!(out, " | {} rows | {}", training_rows, model)
        }
        Forecast::Unavailable { reason } => writeln!(out, "No forecast available: {}", reason),
    }
}

fn write_indicators(out: &mut String, latest: &IndicatorSnapshot) -> fmt::Result {
    writeln!(out, "Indicators")?;
    write_row(out, "SMA 20", &price(latest.sma_fast))?;
    write_row(out, "SMA 50", &price(latest.sma_slow))?;
    write_row(out, "SMA 200", &price(latest.sma_trend))?;

    let bands = latest
        .bollinger
        .map(|b| format!("${:.2} / ${:.2} / ${:.2}", b.lower, b.middle, b.upper))
        .unwrap_or_else(|| "N/A".to_string());
    write_row(out, "Bollinger (lower/mid/upper)", &bands)?;

    let rsi = latest
        .rsi
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "N/A".to_string());
    write_row(out, "RSI 14", &rsi)?;

    let macd = latest
        .macd
        .map(|m| format!("{:.3} (signal {:.3}, hist {:+.3})", m.macd, m.signal, m.histogram))
        .unwrap_or_else(|| "N/A".to_string());
    write_row(out, "MACD", &macd)
}

fn write_fundamentals(out: &mut String, fundamentals: &Fundamentals) -> fmt::Result {
    for (title, metrics) in fundamentals.sections() {
        writeln!(out)?;
        writeln!(out, "{}", title)?;
        for (label, value) in metrics {
            write_row(out, label, &format_metric(label, value))?;
        }
    }
    write_quarterly(out, fundamentals)
}

fn write_quarterly(out: &mut String, fundamentals: &Fundamentals) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "Fundamental Trends")?;

    if fundamentals.quarterly.is_empty() {
        return writeln!(out, "  Quarterly fundamental data not available for this stock.");
    }

    write!(out, "  {:<12}", "Quarter End")?;
    for (label, _) in QUARTERLY_METRICS {
        write!(out, "{:>width$}", label, width = QUARTER_COLUMN_WIDTH)?;
    }
    writeln!(out)?;

    for quarter in &fundamentals.quarterly {
        write!(out, "  {:<12}", quarter.period_end.format("%Y-%m-%d"))?;
        for (label, get) in QUARTERLY_METRICS {
            write!(
                out,
                "{:>width$}",
                format_metric(label, get(quarter)),
                width = QUARTER_COLUMN_WIDTH
            )?;
        }
        writeln!(out)?;
    }

    for label in fundamentals.missing_quarterly_metrics() {
        writeln!(out, "  {} data not available.", label)?;
    }
    Ok(())
}

fn write_row(out: &mut String, label: &str, value: &str) -> fmt::Result {
    writeln!(out, "  {:<width$} {}", label, value, width = LABEL_WIDTH)
}

fn price(value: Option<f64>) -> String {
    value
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::market_data::indicators::ChartOverlays;
    use crate::domain::market::{HistoryRange, PriceSeries};
    use crate::domain::sentiment::{SentimentReport, SentimentScore};
    use chrono::Utc;

    fn snapshot(forecast: Forecast, fundamentals: Option<Fundamentals>) -> DashboardSnapshot {
        let series =
            PriceSeries::from_closes("AAPL", &[100.0, 102.0, 101.0, 105.0, 107.0]).unwrap();
        DashboardSnapshot {
            ticker: "AAPL".to_string(),
            range: HistoryRange::default(),
            series,
            fundamentals,
            sentiment: SentimentReport {
                score: SentimentScore(0.2),
                ..SentimentReport::neutral("mock")
            },
            forecast,
            overlays: ChartOverlays::default(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_with_forecast() {
        let fundamentals = Fundamentals {
            company_name: Some("Apple Inc.".to_string()),
            current_price: Some(107.0),
            previous_close: Some(105.0),
            market_cap: Some(2.95e12),
            profit_margin: Some(0.253),
            ..Fundamentals::empty("AAPL")
        };
        let forecast = Forecast::Available {
            predicted: 108.035_714_285_714_29,
            last_close: 107.0,
            change: 1.035_714_285_714_29,
            change_pct: 0.968,
            r_squared: Some(0.81),
            training_rows: 4,
            model: "OLS Linear Regression (standardized)".to_string(),
        };

        let report = render_report(&snapshot(forecast, Some(fundamentals)));

        assert!(report.starts_with("Apple Inc. (AAPL) | 6 Months"));
        assert!(report.contains("Price: $107.00  +2.00 (+1.90%)"));
        assert!(report.contains("News sentiment: +0.200 (Bullish) from 0 articles [mock]"));
        assert!(report.contains("Predicted next close: $108.04 (+1.04, +0.97%)"));
        assert!(report.contains("Valuation Measures"));
        assert!(report.contains("$2950.00B"));
        assert!(report.contains("25.30%"));
        assert!(report.contains("Balance Sheet & Cash Flow"));
        assert!(report.contains("Last updated: "));
    }

    #[test]
    fn test_report_without_forecast_or_fundamentals() {
        let forecast = Forecast::Unavailable {
            reason: "insufficient data".to_string(),
        };
        let report = render_report(&snapshot(forecast, None));

        assert!(report.starts_with("AAPL (AAPL)"));
        assert!(report.contains("Price: $107.00"));
        assert!(report.contains("No forecast available: insufficient data"));
        assert!(report.contains("Fundamentals unavailable"));
        assert!(report.contains("SMA 20"));
        assert!(!report.contains("Predicted next close"));
    }

    #[test]
    fn test_report_quarterly_trends() {
        use crate::domain::fundamentals::QuarterlyFinancials;

        let quarter = |date: &str, revenue: f64, equity: Option<f64>| QuarterlyFinancials {
            period_end: date.parse().unwrap(),
            total_revenue: Some(revenue),
            net_income: Some(revenue * 0.25),
            total_debt: None,
            stockholder_equity: equity,
        };
        let fundamentals = Fundamentals {
            quarterly: vec![
                quarter("2024-03-31", 90.8e9, Some(74.2e9)),
                quarter("2024-06-30", 85.8e9, None),
            ],
            ..Fundamentals::empty("AAPL")
        };
        let forecast = Forecast::Unavailable {
            reason: "n/a".to_string(),
        };
        let report = render_report(&snapshot(forecast, Some(fundamentals)));

        assert!(report.contains("Fundamental Trends"));
        let row = report
            .lines()
            .find(|l| l.trim_start().starts_with("2024-03-31"))
            .unwrap();
        assert!(row.contains("$90.80B"));
        assert!(row.contains("$22.70B"));
        assert!(row.contains("N/A"));
        assert!(row.contains("$74.20B"));
        assert!(report.contains("Total Debt data not available."));
        assert!(!report.contains("Total Revenue data not available."));
        assert!(!report.contains("Stockholder Equity data not available."));
    }

    #[test]
    fn test_report_without_quarterly_data() {
        let forecast = Forecast::Unavailable {
            reason: "n/a".to_string(),
        };
        let report = render_report(&snapshot(forecast, Some(Fundamentals::empty("AAPL"))));

        assert!(report.contains("Quarterly fundamental data not available for this stock."));
        assert!(!report.contains("Quarter End"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }
}
