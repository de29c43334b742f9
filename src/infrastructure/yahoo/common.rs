use crate::domain::errors::MarketDataError;
use crate::domain::fundamentals::{Fundamentals, QuarterlyFinancials};
use crate::domain::market::PriceBar;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

// ===== Chart endpoint =====

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
pub struct YahooApiError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

/// Column arrays aligned with `timestamp`. Yahoo sends `null` for halted or missing bars.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Converts a chart payload into bars. Nulls become `NaN`; duplicate timestamps keep the last bar.
pub fn parse_chart_response(
    ticker: &str,
    response: ChartResponse,
) -> Result<Vec<PriceBar>, MarketDataError> {
    if let Some(err) = response.chart.error {
        return Err(MarketDataError::InvalidData {
            ticker: ticker.to_string(),
            reason: format!(
                "{}: {}",
                err.code,
                err.description.unwrap_or_else(|| "no description".to_string())
            ),
        });
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketDataError::NoData {
            ticker: ticker.to_string(),
        })?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let column = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten().unwrap_or(f64::NAN);

    let mut bars: Vec<PriceBar> = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };

        let bar = PriceBar {
            timestamp,
            open: column(&quote.open, i),
            high: column(&quote.high, i),
            low: column(&quote.low, i),
            close: column(&quote.close, i),
            volume: column(&quote.volume, i),
        };

        // Intraday requests repeat the live bar with the same timestamp
        match bars.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            Some(last) if last.timestamp > bar.timestamp => continue,
            _ => bars.push(bar),
        }
    }

    if bars.is_empty() {
        return Err(MarketDataError::NoData {
            ticker: ticker.to_string(),
        });
    }

    Ok(bars)
}

// ===== quoteSummary endpoint =====

pub const QUOTE_SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile,\
     incomeStatementHistoryQuarterly,balanceSheetHistoryQuarterly";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryEnvelope {
    pub result: Option<Vec<QuoteSummaryResult>>,
    pub error: Option<YahooApiError>,
}

/// `{ "raw": 1.23, "fmt": "1.23" }`; only `raw` is used.
#[derive(Debug, Default, Deserialize, Clone, Copy)]
pub struct RawValue {
    pub raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default)]
    pub summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    pub default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(default)]
    pub financial_data: Option<FinancialDataModule>,
    #[serde(default)]
    pub asset_profile: Option<AssetProfileModule>,
    #[serde(default)]
    pub income_statement_history_quarterly: Option<IncomeStatementHistoryModule>,
    #[serde(default)]
    pub balance_sheet_history_quarterly: Option<BalanceSheetHistoryModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub regular_market_price: Option<RawValue>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<RawValue>,
    pub price_to_sales_trailing12_months: Option<RawValue>,
    pub fifty_two_week_high: Option<RawValue>,
    pub fifty_two_week_low: Option<RawValue>,
    pub volume: Option<RawValue>,
    pub previous_close: Option<RawValue>,
    pub open: Option<RawValue>,
    pub dividend_yield: Option<RawValue>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatisticsModule {
    pub enterprise_value: Option<RawValue>,
    pub peg_ratio: Option<RawValue>,
    pub price_to_book: Option<RawValue>,
    pub enterprise_to_revenue: Option<RawValue>,
    pub enterprise_to_ebitda: Option<RawValue>,
    pub net_income_to_common: Option<RawValue>,
    pub trailing_eps: Option<RawValue>,
    pub profit_margins: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataModule {
    pub current_price: Option<RawValue>,
    pub profit_margins: Option<RawValue>,
    pub return_on_assets: Option<RawValue>,
    pub return_on_equity: Option<RawValue>,
    pub total_revenue: Option<RawValue>,
    pub total_cash: Option<RawValue>,
    pub debt_to_equity: Option<RawValue>,
    pub free_cashflow: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfileModule {
    pub long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatementHistoryModule {
    #[serde(default)]
    pub income_statement_history: Vec<IncomeStatement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub end_date: Option<RawValue>,
    pub total_revenue: Option<RawValue>,
    pub net_income: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetHistoryModule {
    #[serde(default)]
    pub balance_sheet_statements: Vec<BalanceSheetStatement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetStatement {
    pub end_date: Option<RawValue>,
    pub short_long_term_debt: Option<RawValue>,
    pub long_term_debt: Option<RawValue>,
    pub total_stockholder_equity: Option<RawValue>,
}

/// `endDate.raw` is a unix timestamp at midnight UTC
fn end_date(value: Option<RawValue>) -> Option<NaiveDate> {
    let secs = raw(value)? as i64;
    Utc.timestamp_opt(secs, 0).single().map(|t| t.date_naive())
}

fn empty_quarter(period_end: NaiveDate) -> QuarterlyFinancials {
    QuarterlyFinancials {
        period_end,
        total_revenue: None,
        net_income: None,
        total_debt: None,
        stockholder_equity: None,
    }
}

/// Joins income and balance statements on their quarter end date, oldest first.
/// Statements without an end date are dropped.
fn merge_quarterly(
    income: Option<IncomeStatementHistoryModule>,
    balance: Option<BalanceSheetHistoryModule>,
) -> Vec<QuarterlyFinancials> {
    let mut quarters: BTreeMap<NaiveDate, QuarterlyFinancials> = BTreeMap::new();

    for statement in income.unwrap_or_default().income_statement_history {
        let Some(date) = end_date(statement.end_date) else {
            continue;
        };
        let quarter = quarters.entry(date).or_insert_with(|| empty_quarter(date));
        quarter.total_revenue = raw(statement.total_revenue);
        quarter.net_income = raw(statement.net_income);
    }

    for statement in balance.unwrap_or_default().balance_sheet_statements {
        let Some(date) = end_date(statement.end_date) else {
            continue;
        };
        let quarter = quarters.entry(date).or_insert_with(|| empty_quarter(date));
        quarter.total_debt = match (
            raw(statement.short_long_term_debt),
            raw(statement.long_term_debt),
        ) {
            (None, None) => None,
            (short, long) => Some(short.unwrap_or(0.0) + long.unwrap_or(0.0)),
        };
        quarter.stockholder_equity = raw(statement.total_stockholder_equity);
    }

    quarters.into_values().collect()
}

impl QuoteSummaryResult {
    pub fn into_fundamentals(self, ticker: &str) -> Fundamentals {
        let price = self.price.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let stats = self.default_key_statistics.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let profile = self.asset_profile.unwrap_or_default();
        let quarterly = merge_quarterly(
            self.income_statement_history_quarterly,
            self.balance_sheet_history_quarterly,
        );

        Fundamentals {
            ticker: ticker.to_string(),
            company_name: price.long_name.or(price.short_name),
            business_summary: profile.long_business_summary,
            current_price: raw(financial.current_price).or(raw(price.regular_market_price)),

            market_cap: raw(detail.market_cap).or(raw(price.market_cap)),
            enterprise_value: raw(stats.enterprise_value),
            trailing_pe: raw(detail.trailing_pe),
            forward_pe: raw(detail.forward_pe),
            peg_ratio: raw(stats.peg_ratio),
            price_to_sales: raw(detail.price_to_sales_trailing12_months),
            price_to_book: raw(stats.price_to_book),
            enterprise_to_revenue: raw(stats.enterprise_to_revenue),
            enterprise_to_ebitda: raw(stats.enterprise_to_ebitda),

            fifty_two_week_high: raw(detail.fifty_two_week_high),
            fifty_two_week_low: raw(detail.fifty_two_week_low),
            volume: raw(detail.volume),
            previous_close: raw(detail.previous_close),
            open: raw(detail.open),
            dividend_yield: raw(detail.dividend_yield),

            profit_margin: raw(financial.profit_margins).or(raw(stats.profit_margins)),
            return_on_assets: raw(financial.return_on_assets),
            return_on_equity: raw(financial.return_on_equity),
            total_revenue: raw(financial.total_revenue),
            net_income: raw(stats.net_income_to_common),
            diluted_eps: raw(stats.trailing_eps),

            total_cash: raw(financial.total_cash),
            debt_to_equity: raw(financial.debt_to_equity),
            levered_free_cash_flow: raw(financial.free_cashflow),

            quarterly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART_JSON: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL"},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {"quote": [{
                    "open":   [187.15, 184.22, null],
                    "high":   [188.44, 185.88, 183.09],
                    "low":    [183.89, 183.43, 180.88],
                    "close":  [185.64, 184.25, null],
                    "volume": [82488700, 58414500, 71983600]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_with_nulls() {
        let response: ChartResponse = serde_json::from_str(CHART_JSON).unwrap();
        let bars = parse_chart_response("AAPL", response).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, 185.64);
        assert_eq!(bars[1].volume, 58_414_500.0);
        assert!(bars[2].close.is_nan());
        assert!(bars[2].open.is_nan());
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn test_parse_chart_api_error() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();

        match parse_chart_response("ZZZZ", response) {
            Err(MarketDataError::InvalidData { ticker, reason }) => {
                assert_eq!(ticker, "ZZZZ");
                assert!(reason.contains("delisted"));
            }
            other => panic!("expected InvalidData, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_no_data() {
        let json = r#"{"chart": {"result": [{"meta": {}, "indicators": {"quote": [{}]}}], "error": null}}"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();

        assert!(matches!(
            parse_chart_response("AAPL", response),
            Err(MarketDataError::NoData { .. })
        ));
    }

    #[test]
    fn test_duplicate_timestamp_keeps_latest() {
        let json = r#"{"chart": {"result": [{
            "timestamp": [100, 200, 200],
            "indicators": {"quote": [{"close": [1.0, 2.0, 2.5]}]}
        }], "error": null}}"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        let bars = parse_chart_response("AAPL", response).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 2.5);
    }

    #[test]
    fn test_quote_summary_into_fundamentals() {
        let json = r#"{"quoteSummary": {"result": [{
            "price": {"longName": "Apple Inc.", "regularMarketPrice": {"raw": 190.5, "fmt": "190.50"}},
            "summaryDetail": {
                "trailingPE": {"raw": 29.4},
                "forwardPE": {"raw": 27.1},
                "previousClose": {"raw": 188.0},
                "dividendYield": {"raw": 0.0051},
                "marketCap": {"raw": 2950000000000}
            },
            "defaultKeyStatistics": {"pegRatio": {}, "trailingEps": {"raw": 6.42}},
            "financialData": {"profitMargins": {"raw": 0.253}, "debtToEquity": {"raw": 181.3}},
            "assetProfile": {"longBusinessSummary": "Designs smartphones."}
        }], "error": null}}"#;

        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let result = response.quote_summary.result.unwrap().into_iter().next().unwrap();
        let f = result.into_fundamentals("AAPL");

        assert_eq!(f.display_name(), "Apple Inc.");
        assert_eq!(f.current_price, Some(190.5));
        assert_eq!(f.forward_pe, Some(27.1));
        assert_eq!(f.market_cap, Some(2.95e12));
        assert_eq!(f.peg_ratio, None);
        assert_eq!(f.diluted_eps, Some(6.42));
        assert_eq!(f.profit_margin, Some(0.253));
        assert_eq!(f.business_summary.as_deref(), Some("Designs smartphones."));
        assert!(f.total_cash.is_none());
        assert!(f.quarterly.is_empty());
    }

    #[test]
    fn test_quarterly_statements_merge_by_end_date() {
        // 1711843200 = 2024-03-31, 1719705600 = 2024-06-30, 1703980800 = 2023-12-31
        let json = r#"{"quoteSummary": {"result": [{
            "incomeStatementHistoryQuarterly": {"incomeStatementHistory": [
                {"endDate": {"raw": 1719705600}, "totalRevenue": {"raw": 85777000000}, "netIncome": {"raw": 21448000000}},
                {"endDate": {"raw": 1711843200}, "totalRevenue": {"raw": 90753000000}, "netIncome": {"raw": 23636000000}},
                {"totalRevenue": {"raw": 1.0}}
            ]},
            "balanceSheetHistoryQuarterly": {"balanceSheetStatements": [
                {"endDate": {"raw": 1719705600}, "shortLongTermDebt": {"raw": 10000000000}, "longTermDebt": {"raw": 86000000000}, "totalStockholderEquity": {"raw": 66708000000}},
                {"endDate": {"raw": 1711843200}, "totalStockholderEquity": {"raw": 74194000000}},
                {"endDate": {"raw": 1703980800}, "longTermDebt": {"raw": 95000000000}}
            ]}
        }], "error": null}}"#;

        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let result = response.quote_summary.result.unwrap().into_iter().next().unwrap();
        let quarterly = result.into_fundamentals("AAPL").quarterly;

        assert_eq!(quarterly.len(), 3);
        assert_eq!(quarterly[0].period_end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(quarterly[0].total_revenue, None);
        assert_eq!(quarterly[0].total_debt, Some(95e9));

        assert_eq!(quarterly[1].period_end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(quarterly[1].net_income, Some(23_636_000_000.0));
        assert_eq!(quarterly[1].total_debt, None);
        assert_eq!(quarterly[1].stockholder_equity, Some(74_194_000_000.0));

        assert_eq!(quarterly[2].total_revenue, Some(85_777_000_000.0));
        assert_eq!(quarterly[2].total_debt, Some(96e9));
    }
}
