//! Market quote capability
//!
//! Fetches the most recent trading-day snapshot for a ticker from the Yahoo
//! Finance chart endpoint. One outbound read per invocation, no retries.

use crate::capabilities::Capability;
use crate::error::AgentError;
use crate::models::QuoteSnapshot;
use crate::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart-endpoint client (connection-pooled)
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .user_agent("financial-analyst-agent/0.1")
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: YAHOO_CHART_URL.to_string(),
        }
    }

    /// Fetch the latest one-day snapshot for `ticker`.
    ///
    /// The ticker is not validated locally; an unknown or delisted symbol is
    /// detected only by the provider returning no data.
    pub async fn latest_quote(&self, ticker: &str) -> Result<QuoteSnapshot> {
        let url = format!(
            "{}/{}?range=1d&interval=1d",
            self.base_url,
            ticker
        );

        debug!(ticker, "Fetching quote");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::Transport(format!("Yahoo Finance request failed: {}", e)))?;

        let status = response.status();
        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Transport(format!("Invalid Yahoo Finance response: {}", e)))?;

        if let Some(chart_error) = body.chart.error {
            warn!(ticker, code = %chart_error.code, "Yahoo Finance reported no data");
            return Err(AgentError::NoDataFound(ticker.to_string()));
        }

        if !status.is_success() {
            return Err(AgentError::Transport(format!(
                "Yahoo Finance returned {}",
                status
            )));
        }

        let result = body
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| AgentError::NoDataFound(ticker.to_string()))?;

        snapshot_from_chart(ticker, &result)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold the chart arrays into a single snapshot of the latest trading period.
fn snapshot_from_chart(ticker: &str, result: &ChartResult) -> Result<QuoteSnapshot> {
    let quote_block = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| AgentError::NoDataFound(ticker.to_string()))?;

    let last_value = |values: &[Option<f64>]| values.iter().rev().flatten().next().copied();

    let close = result
        .meta
        .regular_market_price
        .or_else(|| last_value(&quote_block.close));
    let high = last_value(&quote_block.high);
    let low = last_value(&quote_block.low);
    let volume = quote_block
        .volume
        .iter()
        .rev()
        .flatten()
        .next()
        .copied();

    match (close, high, low, volume) {
        (Some(current_price), Some(day_high), Some(day_low), Some(volume)) => Ok(QuoteSnapshot {
            ticker: ticker.to_string(),
            current_price,
            day_high,
            day_low,
            volume,
        }),
        _ => Err(AgentError::NoDataFound(ticker.to_string())),
    }
}

//
// ================= Wire Types =================
//

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[allow(dead_code)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteBlock {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

//
// ================= Capability =================
//

/// Stock quote capability registered as `get_stock_info`.
pub struct StockInfoCapability {
    client: YahooFinanceClient,
}

impl StockInfoCapability {
    pub fn new() -> Self {
        Self {
            client: YahooFinanceClient::new(),
        }
    }
}

impl Default for StockInfoCapability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Capability for StockInfoCapability {
    fn name(&self) -> &'static str {
        "get_stock_info"
    }

    fn description(&self) -> &'static str {
        "Fetches the current stock price, day high, day low, and trading volume for a given stock ticker."
    }

    async fn invoke(&self, input: &str) -> String {
        let ticker = input.trim();

        match self.client.latest_quote(ticker).await {
            Ok(quote) => format_success(&quote),
            Err(AgentError::NoDataFound(_)) => format_no_data(ticker),
            Err(e) => format_fault(ticker, &e),
        }
    }
}

fn format_success(quote: &QuoteSnapshot) -> String {
    let json = serde_json::to_string(quote)
        .unwrap_or_else(|_| format!("{{\"ticker\":\"{}\"}}", quote.ticker));
    format!("Successfully fetched stock data for {}: {}", quote.ticker, json)
}

fn format_no_data(ticker: &str) -> String {
    format!(
        "Error: No data found for ticker {}. It might be delisted or incorrect.",
        ticker
    )
}

fn format_fault(ticker: &str, error: &AgentError) -> String {
    format!("Error fetching stock data for {}: {}", ticker, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quote() -> QuoteSnapshot {
        QuoteSnapshot {
            ticker: "NVDA".to_string(),
            current_price: 905.12,
            day_high: 912.0,
            day_low: 889.5,
            volume: 41_230_000,
        }
    }

    #[test]
    fn test_success_payload_has_all_four_fields_and_echoes_ticker() {
        let text = format_success(&sample_quote());

        assert!(text.starts_with("Successfully fetched stock data for NVDA"));
        for field in ["current_price", "day_high", "day_low", "volume"] {
            assert!(text.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_no_data_result_is_failure_tagged_and_names_ticker() {
        let text = format_no_data("FAKETICKER");

        assert!(text.starts_with("Error:"));
        assert!(text.contains("FAKETICKER"));
        assert!(text.contains("delisted or incorrect"));
    }

    #[test]
    fn test_fault_result_names_ticker_and_cause() {
        let error = AgentError::Transport("connection reset".to_string());
        let text = format_fault("NVDA", &error);

        assert!(text.starts_with("Error fetching stock data for NVDA"));
        assert!(text.contains("connection reset"));
    }

    #[test]
    fn test_snapshot_from_chart_takes_latest_non_null_values() {
        let json = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 905.12 },
                    "indicators": {
                        "quote": [{
                            "high": [910.0, 912.0, null],
                            "low": [888.0, 889.5, null],
                            "close": [900.0, 904.9, null],
                            "volume": [40_000_000u64, 41_230_000u64, null]
                        }]
                    }
                }],
                "error": null
            }
        });

        let parsed: ChartResponse = serde_json::from_value(json).unwrap();
        let result = parsed.chart.result.unwrap().remove(0);
        let quote = snapshot_from_chart("NVDA", &result).unwrap();

        assert_eq!(quote.current_price, 905.12);
        assert_eq!(quote.day_high, 912.0);
        assert_eq!(quote.day_low, 889.5);
        assert_eq!(quote.volume, 41_230_000);
    }

    #[test]
    fn test_empty_chart_is_no_data() {
        let json = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {},
                    "indicators": { "quote": [{}] }
                }],
                "error": null
            }
        });

        let parsed: ChartResponse = serde_json::from_value(json).unwrap();
        let result = parsed.chart.result.unwrap().remove(0);

        assert!(matches!(
            snapshot_from_chart("GONE", &result),
            Err(AgentError::NoDataFound(ticker)) if ticker == "GONE"
        ));
    }
}
