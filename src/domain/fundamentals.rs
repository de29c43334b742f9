use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One quarter of reported financials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyFinancials {
    pub period_end: NaiveDate,
    pub total_revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub total_debt: Option<f64>,
    pub stockholder_equity: Option<f64>,
}

/// Labelled accessor for one quarterly metric
pub type QuarterlyMetric = (&'static str, fn(&QuarterlyFinancials) -> Option<f64>);

pub const QUARTERLY_METRICS: [QuarterlyMetric; 4] = [
    ("Total Revenue", |q: &QuarterlyFinancials| q.total_revenue),
    ("Net Income", |q: &QuarterlyFinancials| q.net_income),
    ("Total Debt", |q: &QuarterlyFinancials| q.total_debt),
    ("Stockholder Equity", |q: &QuarterlyFinancials| q.stockholder_equity),
];

/// Snapshot of company fundamentals. Every metric is optional because
/// quote providers omit fields freely (ETFs have no margins, etc.).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub company_name: Option<String>,
    pub business_summary: Option<String>,
    pub current_price: Option<f64>,

    // Valuation
    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub price_to_book: Option<f64>,
    pub enterprise_to_revenue: Option<f64>,
    pub enterprise_to_ebitda: Option<f64>,

    // Price / volume
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub dividend_yield: Option<f64>,

    // Profitability
    pub profit_margin: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub total_revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub diluted_eps: Option<f64>,

    // Balance sheet
    pub total_cash: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub levered_free_cash_flow: Option<f64>,

    /// Quarterly statements, oldest first
    #[serde(default)]
    pub quarterly: Vec<QuarterlyFinancials>,
}

/// A titled group of labelled metrics, in display order
pub type MetricSection = (&'static str, Vec<(&'static str, Option<f64>)>);

impl Fundamentals {
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }

    /// Display name, falling back to the ticker
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(&self.ticker)
    }

    /// Absolute and percentage change of the current price against the previous close.
    pub fn day_change(&self) -> Option<(f64, f64)> {
        let current = self.current_price?;
        let previous = self.previous_close?;
        if previous == 0.0 {
            return None;
        }
        let change = current - previous;
        Some((change, change / previous * 100.0))
    }

    /// Labels of quarterly metrics reported in none of the quarters
    pub fn missing_quarterly_metrics(&self) -> Vec<&'static str> {
        QUARTERLY_METRICS
            .iter()
            .filter(|(_, get)| self.quarterly.iter().all(|q| get(q).is_none()))
            .map(|(label, _)| *label)
            .collect()
    }

    pub fn sections(&self) -> Vec<MetricSection> {
        vec![
            (
                "Valuation Measures",
                vec![
                    ("Market Cap", self.market_cap),
                    ("Enterprise Value", self.enterprise_value),
                    ("Trailing P/E", self.trailing_pe),
                    ("Forward P/E", self.forward_pe),
                    ("PEG Ratio (5yr expected)", self.peg_ratio),
                    ("Price/Sales (ttm)", self.price_to_sales),
                    ("Price/Book (mrq)", self.price_to_book),
                    ("Enterprise Value/Revenue", self.enterprise_to_revenue),
                    ("Enterprise Value/EBITDA", self.enterprise_to_ebitda),
                ],
            ),
            (
                "Price / Volume",
                vec![
                    ("52W High", self.fifty_two_week_high),
                    ("52W Low", self.fifty_two_week_low),
                    ("Volume", self.volume),
                    ("Previous Close", self.previous_close),
                    ("Open", self.open),
                    ("Dividend Yield", self.dividend_yield),
                ],
            ),
            (
                "Profitability & Income",
                vec![
                    ("Profit Margin", self.profit_margin),
                    ("Return on Assets (ttm)", self.return_on_assets),
                    ("Return on Equity (ttm)", self.return_on_equity),
                    ("Revenue (ttm)", self.total_revenue),
                    ("Net Income (ttm)", self.net_income),
                    ("Diluted EPS (ttm)", self.diluted_eps),
                ],
            ),
            (
                "Balance Sheet & Cash Flow",
                vec![
                    ("Total Cash (mrq)", self.total_cash),
                    ("Total Debt/Equity (mrq)", self.debt_to_equity),
                    ("Levered Free Cash Flow (ttm)", self.levered_free_cash_flow),
                ],
            ),
        ]
    }
}

/// Formats a metric for display, choosing the unit from its label.
///
/// Ratio-style labels (containing `/`, `Ratio` or `P/E`) are checked before
/// money labels so that "Enterprise Value/EBITDA" renders as a multiple.
pub fn format_metric(label: &str, value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };

    const MONEY: &[&str] = &["Cap", "Value", "Revenue", "Cash", "Income", "Debt", "Equity"];
    const PERCENT: &[&str] = &["Yield", "Margin", "Return"];

    if label.contains('/') || label.contains("Ratio") {
        format!("{:.2}", v)
    } else if PERCENT.iter().any(|k| label.contains(k)) {
        format!("{:.2}%", v * 100.0)
    } else if MONEY.iter().any(|k| label.contains(k)) {
        if v.abs() >= 1e9 {
            format!("${:.2}B", v / 1e9)
        } else if v.abs() >= 1e6 {
            format!("${:.2}M", v / 1e6)
        } else {
            format!("${}", group_thousands(v))
        }
    } else if label.contains("Volume") {
        group_thousands(v.round())
            .trim_end_matches(".00")
            .to_string()
    } else {
        format!("${}", group_thousands(v))
    }
}

/// `1234567.891` -> `1,234,567.89`
fn group_thousands(v: f64) -> String {
    let formatted = format!("{:.2}", v.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch_fundamentals(&self, ticker: &str) -> anyhow::Result<Fundamentals>;
}
