use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::keys::CacheKey;
use crate::cache::metrics::{CacheMetrics, MetricType};
use crate::cache::stats::CacheStats;
use crate::data_provider::{FetchOutcome, SeriesFetcher};
use crate::domain_types::{Interval, Period};

/// 預設快取存活時間（秒）
pub const DEFAULT_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: Arc<FetchOutcome>,
    fetched_at: Instant,
}

/// 序列快取，包裝 [`SeriesFetcher`] 以限制上游請求量
///
/// - 同一個鍵在 TTL 內重複請求返回同一個 `Arc`，不會再呼叫上游
/// - 存在時間達到 TTL 的項目視同不存在，下次請求時重新抓取並覆寫
/// - 失敗結果同樣快取一個 TTL，過期後自然重試
/// - 抓取期間不持有任何鎖；同一鍵的並發未命中可能各自抓取一次
///
/// 項目不會被主動刪除，商品目錄固定且規模小。
pub struct SeriesCache<C: Clock = SystemClock> {
    entries: DashMap<CacheKey, CacheEntry, FxBuildHasher>,
    ttl: Duration,
    clock: C,
}

impl SeriesCache<SystemClock> {
    /// 創建使用系統時鐘的快取
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl Default for SeriesCache<SystemClock> {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl<C: Clock> SeriesCache<C> {
    /// 創建使用指定時鐘的快取
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher::default()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.fetched_at) < self.ttl
    }

    /// 取得仍在 TTL 內的結果
    pub fn get(&self, key: &CacheKey) -> Option<Arc<FetchOutcome>> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;

        if self.is_fresh(&entry, now) {
            Some(entry.outcome.clone())
        } else {
            CacheMetrics::record(MetricType::Expired, None);
            None
        }
    }

    /// 命中時直接返回快取結果，否則透過抓取器取得並寫入快取
    pub async fn get_or_fetch(
        &self,
        fetcher: &SeriesFetcher,
        symbol: &str,
        period: &Period,
        interval: Interval,
    ) -> Arc<FetchOutcome> {
        let key = CacheKey::new(symbol, period.clone(), interval);

        if let Some(outcome) = self.get(&key) {
            debug!("快取命中: {}", key);
            CacheMetrics::record(MetricType::Hit, None);
            return outcome;
        }

        debug!("快取未命中: {}", key);
        CacheMetrics::record(MetricType::Miss, None);

        let outcome = Arc::new(fetcher.fetch(symbol, period, Some(interval)).await);
        self.entries.insert(
            key,
            CacheEntry {
                outcome: outcome.clone(),
                fetched_at: self.clock.now(),
            },
        );
        CacheMetrics::record_cache_size(self.entries.len());

        outcome
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 獲取快取統計信息
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        self.entries.iter().fold(CacheStats::default(), |mut stats, entry| {
            stats.entries += 1;
            if self.is_fresh(entry.value(), now) {
                stats.fresh_entries += 1;
            }
            if entry.value().outcome.failure().is_some() {
                stats.failed_entries += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::data_provider::provider::{MockUpstreamProvider, ProviderError};
    use crate::domain_types::InstrumentCatalog;
    use futures::future::join_all;
    use polars::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn fetcher_expecting(calls: usize) -> SeriesFetcher {
        let mut provider = MockUpstreamProvider::new();
        provider
            .expect_download()
            .times(calls)
            .returning(|_, _, _| Ok(df!("Close" => &[100.0, 105.0]).unwrap()));
        provider.expect_name().return_const("mock");
        SeriesFetcher::new(
            Arc::new(provider),
            Arc::new(InstrumentCatalog::builtin().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_hit_within_ttl_returns_same_instance() {
        let clock = ManualClock::new();
        let cache = SeriesCache::with_clock(Duration::from_secs(300), clock.clone());
        let fetcher = fetcher_expecting(1);
        let period = Period::default();

        let first = cache.get_or_fetch(&fetcher, "BTC-USD", &period, Interval::OneHour).await;
        clock.advance(Duration::from_secs(299));
        let second = cache.get_or_fetch(&fetcher, "BTC-USD", &period, Interval::OneHour).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_at_ttl_is_refetched() {
        let clock = ManualClock::new();
        let cache = SeriesCache::with_clock(Duration::from_secs(300), clock.clone());
        let fetcher = fetcher_expecting(2);
        let period = Period::default();

        let first = cache.get_or_fetch(&fetcher, "BTC-USD", &period, Interval::OneHour).await;
        clock.advance(Duration::from_secs(300));
        assert!(cache.get(&CacheKey::new("BTC-USD", period.clone(), Interval::OneHour)).is_none());

        let second = cache.get_or_fetch(&fetcher, "BTC-USD", &period, Interval::OneHour).await;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().fresh_entries, 1);
    }

    #[tokio::test]
    async fn test_keys_are_not_shared_across_periods() {
        let cache = SeriesCache::with_clock(Duration::from_secs(300), ManualClock::new());
        let fetcher = fetcher_expecting(2);

        cache
            .get_or_fetch(&fetcher, "ETH-USD", &Period::parse("5d").unwrap(), Interval::OneHour)
            .await;
        cache
            .get_or_fetch(&fetcher, "ETH-USD", &Period::parse("7d").unwrap(), Interval::OneHour)
            .await;

        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_cached_for_ttl() {
        let mut provider = MockUpstreamProvider::new();
        provider
            .expect_download()
            .times(1)
            .returning(|_, _, _| Err(ProviderError::Malformed("bad".to_string())));
        provider.expect_name().return_const("mock");
        let fetcher = SeriesFetcher::new(
            Arc::new(provider),
            Arc::new(InstrumentCatalog::builtin().unwrap()),
        );
        let cache = SeriesCache::with_clock(Duration::from_secs(300), ManualClock::new());

        for _ in 0..3 {
            let outcome = cache
                .get_or_fetch(&fetcher, "^FTSE", &Period::default(), Interval::OneDay)
                .await;
            assert!(outcome.is_empty());
        }

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.failed_entries, 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_key() {
        const CALLERS: usize = 8;

        let calls = Arc::new(AtomicUsize::new(0));
        let mut provider = MockUpstreamProvider::new();
        let counter = calls.clone();
        provider
            .expect_download()
            .times(1..=CALLERS)
            .returning(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(df!("Close" => &[100.0, 105.0]).unwrap())
            });
        provider.expect_name().return_const("mock");
        let fetcher = SeriesFetcher::new(
            Arc::new(provider),
            Arc::new(InstrumentCatalog::builtin().unwrap()),
        );
        let cache = SeriesCache::with_clock(Duration::from_secs(300), ManualClock::new());
        let period = Period::default();

        let outcomes = join_all(
            (0..CALLERS).map(|_| cache.get_or_fetch(&fetcher, "ETH-USD", &period, Interval::OneHour)),
        )
        .await;

        let upstream = calls.load(Ordering::SeqCst);
        assert!((1..=CALLERS).contains(&upstream));
        assert_eq!(cache.len(), 1);
        for outcome in &outcomes {
            assert!(outcome.frame().equals(outcomes[0].frame()));
            assert_eq!(outcome.frame().height(), 2);
        }

        // 並發結束後的請求命中快取
        let after = cache
            .get_or_fetch(&fetcher, "ETH-USD", &period, Interval::OneHour)
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), upstream);
        assert!(after.frame().equals(outcomes[0].frame()));
    }
}
