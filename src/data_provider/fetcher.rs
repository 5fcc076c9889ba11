use once_cell::sync::Lazy;
use polars::prelude::DataFrame;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::provider::UpstreamProvider;
use crate::cache::metrics::{CacheMetrics, MetricType};
use crate::domain_types::{Category, InstrumentCatalog, Interval, Period};

static EMPTY_FRAME: Lazy<DataFrame> = Lazy::new(DataFrame::empty);

/// 上游原始表格及其請求參數
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
    pub frame: DataFrame,
}

impl RawSeries {
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// 抓取失敗原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub symbol: String,
    pub provider: &'static str,
    pub reason: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.symbol, self.provider, self.reason)
    }
}

/// 一次抓取的結果
///
/// 失敗不會以錯誤傳遞給呼叫端；`frame()` 對失敗返回空表格，
/// 呼叫端可一律以「空表格」視為沒有資料。
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Fetched(RawSeries),
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn frame(&self) -> &DataFrame {
        match self {
            FetchOutcome::Fetched(raw) => &raw.frame,
            FetchOutcome::Failed(_) => &EMPTY_FRAME,
        }
    }

    pub fn raw(&self) -> Option<&RawSeries> {
        match self {
            FetchOutcome::Fetched(raw) => Some(raw),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::Failed(failure) => Some(failure),
        }
    }

    /// 沒有可用資料（失敗或零筆）
    pub fn is_empty(&self) -> bool {
        self.frame().height() == 0
    }
}

/// 依商品類別決定預設取樣間隔
///
/// 先查目錄，目錄沒有登記時才依代碼命名慣例推斷。加密貨幣使用小時線，
/// 指數、商品、期貨使用日線，無法辨識的代碼使用小時線。
pub fn default_interval(catalog: &InstrumentCatalog, symbol: &str) -> Interval {
    let category = catalog
        .category_of(symbol)
        .or_else(|| Category::infer_from_symbol(symbol));

    match category {
        Some(Category::Crypto) => Interval::OneHour,
        Some(Category::Index | Category::Commodity | Category::Future) => Interval::OneDay,
        None => Interval::OneHour,
    }
}

/// 序列抓取器，上游數據源的唯一呼叫者
#[derive(Clone)]
pub struct SeriesFetcher {
    provider: Arc<dyn UpstreamProvider>,
    catalog: Arc<InstrumentCatalog>,
}

impl SeriesFetcher {
    pub fn new(provider: Arc<dyn UpstreamProvider>, catalog: Arc<InstrumentCatalog>) -> Self {
        Self { provider, catalog }
    }

    pub fn catalog(&self) -> &Arc<InstrumentCatalog> {
        &self.catalog
    }

    /// 未指定間隔時套用類別預設值
    pub fn resolve_interval(&self, symbol: &str, interval: Option<Interval>) -> Interval {
        interval.unwrap_or_else(|| default_interval(&self.catalog, symbol))
    }

    /// 抓取單一商品的原始序列，不重試
    pub async fn fetch(
        &self,
        symbol: &str,
        period: &Period,
        interval: Option<Interval>,
    ) -> FetchOutcome {
        let interval = self.resolve_interval(symbol, interval);
        let start = Instant::now();

        let result = self.provider.download(symbol, period, interval).await;
        CacheMetrics::record(
            MetricType::Latency { operation: "fetch" },
            Some(start.elapsed()),
        );

        match result {
            Ok(frame) => {
                debug!(
                    "抓取 {} 完成: {} 筆 ({} / {})",
                    symbol,
                    frame.height(),
                    period,
                    interval
                );
                FetchOutcome::Fetched(RawSeries {
                    symbol: symbol.to_string(),
                    period: period.clone(),
                    interval,
                    frame,
                })
            }
            Err(e) => {
                warn!("抓取 {} 失敗: {}", symbol, e);
                CacheMetrics::record(MetricType::FetchFailure, None);
                FetchOutcome::Failed(FetchFailure {
                    symbol: symbol.to_string(),
                    provider: self.provider.name(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
