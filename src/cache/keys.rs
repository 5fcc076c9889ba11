use std::fmt;

use crate::domain_types::{Interval, Period};

/// 序列快取鍵
///
/// 三個欄位皆精確比對，不共用部分鍵：`5d` 的結果不會滿足 `7d` 的請求。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, period: Period, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            period,
            interval,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market_data:{}:{}:{}", self.symbol, self.period, self.interval)
    }
}
