//! 儀表板刷新流程
//!
//! 每次刷新對目錄中的每個商品執行：快取取得或抓取 → 正規化 → 指標計算。
//! 各商品的流程彼此獨立，以有限並行度同時執行；任何失敗都只會反映在
//! 該商品的 [`MetricResult`] 上。

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analytics::{
    compute_metric, fibonacci_levels, volume_profile, vwap, FibonacciLevel, MetricResult,
    VolumeProfile,
};
use crate::cache::{Clock, SeriesCache, SystemClock};
use crate::config::ApplicationConfig;
use crate::data_ingestion::{normalize, NormalizedSeries};
use crate::data_provider::{FetchOutcome, SeriesFetcher, UpstreamProvider};
use crate::domain_types::{Category, Instrument, InstrumentCatalog, Interval, Lookback, Period};

/// 刷新流程的設定
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub default_period: Period,
    pub profile_bins: usize,
    pub max_concurrent_fetches: usize,
    /// 快取條目超過此數量時記錄警告
    pub max_cache_entries: usize,
}

impl DashboardSettings {
    pub fn from_config(config: &ApplicationConfig) -> Self {
        Self {
            default_period: config.dashboard.default_period.clone(),
            profile_bins: config.dashboard.profile_bins,
            max_concurrent_fetches: config.dashboard.max_concurrent_fetches.max(1),
            max_cache_entries: config.cache.max_entries,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from_config(&ApplicationConfig::default())
    }
}

/// 單一商品在一次刷新中的結果
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentSnapshot {
    pub label: String,
    pub symbol: String,
    pub category: Category,
    pub interval: Interval,
    pub rows: usize,
    pub metric: MetricResult,
    /// 抓取失敗原因
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSnapshot {
    pub title: String,
    pub instruments: Vec<InstrumentSnapshot>,
}

/// 單一商品的分析視圖
#[derive(Debug, Clone)]
pub struct Inspection {
    pub symbol: String,
    pub label: String,
    pub period: Period,
    pub interval: Interval,
    pub metric: MetricResult,
    pub series: NormalizedSeries,
    pub profile: Option<VolumeProfile>,
    pub vwap: Option<Vec<Option<f64>>>,
    pub fibonacci: Option<Vec<FibonacciLevel>>,
    pub failure: Option<String>,
}

impl Inspection {
    /// 最後一個可用的 VWAP 值
    pub fn latest_vwap(&self) -> Option<f64> {
        self.vwap
            .as_ref()
            .and_then(|values| values.iter().rev().find_map(|v| *v))
    }
}

pub struct Dashboard<C: Clock = SystemClock> {
    catalog: Arc<InstrumentCatalog>,
    fetcher: SeriesFetcher,
    cache: SeriesCache<C>,
    settings: DashboardSettings,
}

impl Dashboard<SystemClock> {
    /// 依應用程序配置建立儀表板
    pub fn new(
        provider: Arc<dyn UpstreamProvider>,
        catalog: Arc<InstrumentCatalog>,
        config: &ApplicationConfig,
    ) -> Self {
        let fetcher = SeriesFetcher::new(provider, catalog);
        let cache = SeriesCache::new(config.cache.ttl());
        Self::with_cache(fetcher, cache, DashboardSettings::from_config(config))
    }
}

impl<C: Clock> Dashboard<C> {
    pub fn with_cache(fetcher: SeriesFetcher, cache: SeriesCache<C>, settings: DashboardSettings) -> Self {
        Self {
            catalog: fetcher.catalog().clone(),
            fetcher,
            cache,
            settings,
        }
    }

    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &SeriesCache<C> {
        &self.cache
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// 刷新所有商品的指標，分組與順序與目錄一致
    pub async fn snapshot(&self) -> Vec<GroupSnapshot> {
        let instruments: Vec<&Instrument> = self.catalog.instruments().collect();

        let mut results = stream::iter(instruments)
            .map(|instrument| self.instrument_snapshot(instrument))
            .buffered(self.settings.max_concurrent_fetches.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter();

        let groups: Vec<GroupSnapshot> = self
            .catalog
            .groups()
            .iter()
            .map(|group| GroupSnapshot {
                title: group.title.clone(),
                instruments: results.by_ref().take(group.instruments.len()).collect(),
            })
            .collect();

        let total = self.catalog.len();
        let ok = groups
            .iter()
            .flat_map(|group| &group.instruments)
            .filter(|snapshot| snapshot.metric.is_ok())
            .count();
        info!("刷新完成: {}/{} 個商品有效", ok, total);

        let cached = self.cache.len();
        if cached > self.settings.max_cache_entries {
            warn!(
                "快取條目 {} 超過上限 {}",
                cached, self.settings.max_cache_entries
            );
        }

        groups
    }

    /// 計算單一商品的指標
    pub async fn instrument_snapshot(&self, instrument: &Instrument) -> InstrumentSnapshot {
        let interval = self.fetcher.resolve_interval(&instrument.symbol, None);
        let outcome = self
            .cache
            .get_or_fetch(
                &self.fetcher,
                &instrument.symbol,
                &self.settings.default_period,
                interval,
            )
            .await;

        let series = normalized(&outcome, &instrument.symbol);
        let metric = compute_metric(&series);
        debug!(
            "{} ({}): {}",
            instrument.label,
            instrument.symbol,
            metric.display_value()
        );

        InstrumentSnapshot {
            label: instrument.label.clone(),
            symbol: instrument.symbol.clone(),
            category: instrument.category,
            interval,
            rows: series.len(),
            metric,
            failure: outcome.failure().map(ToString::to_string),
        }
    }

    /// 單一商品的完整分析：指標、成交量分布、VWAP 與斐波那契水位
    ///
    /// 不在目錄中的代碼也可查詢，顯示名稱即為代碼本身。
    pub async fn inspect(&self, symbol: &str, lookback: Lookback) -> Inspection {
        let period = lookback.period();
        let interval = self.fetcher.resolve_interval(symbol, None);
        let label = self
            .catalog
            .find_by_symbol(symbol)
            .map(|instrument| instrument.label.clone())
            .unwrap_or_else(|| symbol.to_string());

        let outcome = self
            .cache
            .get_or_fetch(&self.fetcher, symbol, &period, interval)
            .await;
        let series = normalized(&outcome, symbol);

        Inspection {
            symbol: symbol.to_string(),
            label,
            period,
            interval,
            metric: compute_metric(&series),
            profile: volume_profile(&series, self.settings.profile_bins),
            vwap: vwap(&series),
            fibonacci: fibonacci_levels(&series),
            failure: outcome.failure().map(ToString::to_string),
            series,
        }
    }
}

fn normalized(outcome: &FetchOutcome, symbol: &str) -> NormalizedSeries {
    match outcome.raw() {
        Some(raw) => normalize(raw),
        None => NormalizedSeries::empty(symbol),
    }
}
