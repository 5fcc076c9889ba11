//! Yahoo Finance chart API 轉接器

use async_trait::async_trait;
use chrono::Utc;
use polars::prelude::*;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::provider::{ProviderError, UpstreamProvider};
use crate::config::ProviderConfig;
use crate::domain_types::{ColumnName, Interval, Period};
use crate::utils::time_utils::lookback_window_secs;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// 透過 Yahoo Finance `v8/finance/chart` 端點取得 K 線
pub struct YahooChartProvider {
    client: Client,
    base_url: Url,
}

impl YahooChartProvider {
    /// 依設定建立 HTTP 客戶端，逾時由客戶端負責
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::InvalidConfig(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidConfig(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

#[async_trait]
impl UpstreamProvider for YahooChartProvider {
    async fn download(
        &self,
        symbol: &str,
        period: &Period,
        interval: Interval,
    ) -> Result<DataFrame, ProviderError> {
        let (period1, period2) = lookback_window_secs(&Utc::now(), period)
            .ok_or_else(|| ProviderError::InvalidConfig(format!("回溯期間過長: {}", period)))?;

        let url = self.chart_url(symbol)?;
        debug!("請求 {} ({} / {})", url, period, interval);

        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", interval.as_str().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // 錯誤回應通常仍帶有 chart.error
            let message = serde_json::from_str::<ChartEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.chart.error)
                .map(describe_error)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ProviderError::Api(message));
        }

        parse_chart_response(&body, interval)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

fn describe_error(error: ChartError) -> String {
    match error.description {
        Some(description) => format!("{}: {}", error.code, description),
        None => error.code,
    }
}

/// 將 chart API 的 JSON 內容轉為單一商品樣式的表格
///
/// 日內間隔使用 `Datetime` 時間欄，日線以上使用 `Date`；價量欄位可含空值。
pub fn parse_chart_response(body: &str, interval: Interval) -> Result<DataFrame, ProviderError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(error) = envelope.chart.error {
        return Err(ProviderError::Api(describe_error(error)));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::Malformed("chart.result 為空".to_string()))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let rows = result.timestamp.len();

    let columns = [
        (ColumnName::RAW_OPEN, quote.open),
        (ColumnName::RAW_HIGH, quote.high),
        (ColumnName::RAW_LOW, quote.low),
        (ColumnName::RAW_CLOSE, quote.close),
        (ColumnName::RAW_VOLUME, quote.volume),
    ];

    let time_name = if interval.is_intraday() {
        ColumnName::RAW_DATETIME
    } else {
        ColumnName::RAW_DATE
    };
    let millis: Vec<i64> = result.timestamp.iter().map(|secs| secs * 1000).collect();
    let time = Series::new(time_name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let mut frame_columns: Vec<Column> = vec![time.into()];
    for (name, values) in columns {
        // 整欄缺失時不建立欄位，交由正規化視為未解析；長度不一致代表回應損毀
        if values.is_empty() {
            continue;
        }
        if values.len() != rows {
            return Err(ProviderError::Malformed(format!(
                "{} 欄位長度 {} 與時間戳數量 {} 不一致",
                name,
                values.len(),
                rows
            )));
        }
        frame_columns.push(Series::new(name.into(), values).into());
    }

    Ok(DataFrame::new(frame_columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DAILY_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "^GDAXI"},
                "timestamp": [1704067200, 1704153600, 1704240000],
                "indicators": {
                    "quote": [{
                        "open": [100.0, 101.0, null],
                        "high": [102.0, 103.0, null],
                        "low": [99.0, 100.5, null],
                        "close": [101.0, 102.5, null],
                        "volume": [1000, 1500, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_daily_response() {
        let df = parse_chart_response(DAILY_BODY, Interval::OneDay).unwrap();

        assert_eq!(df.height(), 3);
        assert!(df.column(ColumnName::RAW_DATE).is_ok());
        assert!(df.column(ColumnName::RAW_DATETIME).is_err());

        let close = df.column(ColumnName::RAW_CLOSE).unwrap().as_materialized_series();
        let close = close.f64().unwrap();
        assert_eq!(close.get(1), Some(102.5));
        assert_eq!(close.get(2), None);
    }

    #[test]
    fn test_parse_intraday_uses_datetime_column() {
        let df = parse_chart_response(DAILY_BODY, Interval::OneHour).unwrap();
        assert!(df.column(ColumnName::RAW_DATETIME).is_ok());
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response(body, Interval::OneDay).unwrap_err();
        assert_matches!(err, ProviderError::Api(msg) if msg.starts_with("Not Found"));
    }

    #[test]
    fn test_parse_empty_range_yields_empty_frame() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let df = parse_chart_response(body, Interval::OneHour).unwrap();
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn test_parse_missing_arrays_are_omitted() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704067200,1704153600],
            "indicators":{"quote":[{"open":[1.0,2.0]}]}}],"error":null}}"#;
        let df = parse_chart_response(body, Interval::OneDay).unwrap();

        assert_eq!(df.height(), 2);
        assert!(df.column(ColumnName::RAW_OPEN).is_ok());
        assert!(df.column(ColumnName::RAW_CLOSE).is_err());
        assert!(df.column(ColumnName::RAW_VOLUME).is_err());
    }

    #[test]
    fn test_parse_length_mismatch_is_malformed() {
        let body = r#"{"chart":{"result":[{"timestamp":[1,2],"indicators":{"quote":[{"close":[1.0]}]}}],"error":null}}"#;
        assert_matches!(
            parse_chart_response(body, Interval::OneDay),
            Err(ProviderError::Malformed(_))
        );
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        assert_matches!(
            parse_chart_response("<html>", Interval::OneDay),
            Err(ProviderError::Malformed(_))
        );
    }

    #[test]
    fn test_chart_url_appends_symbol_segment() {
        let provider = YahooChartProvider::new(&ProviderConfig::default()).unwrap();
        let url = provider.chart_url("BTC-USD").unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/BTC-USD");
    }
}
