#![allow(dead_code)]

use async_trait::async_trait;
use market_dashboard::data_provider::{ProviderError, UpstreamProvider};
use market_dashboard::domain_types::{Interval, Period};
use parking_lot::Mutex;
use polars::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 以固定表格回應的上游，未登記的代碼回傳 API 錯誤
#[derive(Default)]
pub struct StubProvider {
    frames: HashMap<String, DataFrame>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, String, Interval)>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(mut self, symbol: &str, frame: DataFrame) -> Self {
        self.frames.insert(symbol.to_string(), frame);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (symbol, period, interval)
    pub fn requests(&self) -> Vec<(String, String, Interval)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl UpstreamProvider for StubProvider {
    async fn download(
        &self,
        symbol: &str,
        period: &Period,
        interval: Interval,
    ) -> Result<DataFrame, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .push((symbol.to_string(), period.to_string(), interval));

        self.frames
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::Api(format!("Not Found: {}", symbol)))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 單一商品樣式的日線表格
pub fn daily_frame(closes: &[f64], volumes: &[f64]) -> DataFrame {
    let dates: Vec<String> = (0..closes.len())
        .map(|i| format!("2024-01-{:02}", i + 1))
        .collect();
    df!(
        "Date" => dates,
        "Open" => closes,
        "High" => closes.iter().map(|c| c + 1.0).collect::<Vec<_>>(),
        "Low" => closes.iter().map(|c| c - 1.0).collect::<Vec<_>>(),
        "Close" => closes,
        "Volume" => volumes
    )
    .unwrap()
}

pub const SMALL_CATALOG: &str = r#"
[[group]]
title = "Indices"
category = "index"
instruments = [
    { label = "DAX", symbol = "^GDAXI" },
    { label = "Nikkei 225", symbol = "^N225" },
]

[[group]]
title = "Crypto"
category = "crypto"
instruments = [
    { label = "Bitcoin", symbol = "BTC-USD" },
]
"#;
