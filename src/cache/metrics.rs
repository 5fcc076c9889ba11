use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// 監控指標命名空間
pub const METRIC_NAMESPACE: &str = "dashboard_cache";

/// 監控指標類型
#[derive(Debug, Clone, Copy)]
pub enum MetricType {
    Hit,
    Miss,
    /// 項目存在但已超過 TTL
    Expired,
    FetchFailure,
    Latency {
        operation: &'static str,
    },
}

/// 快取與抓取監控指標記錄器
///
/// 沒有安裝 recorder 時所有記錄皆為空操作。
pub struct CacheMetrics;

impl CacheMetrics {
    /// 記錄指標
    ///
    /// # Arguments
    /// * `metric_type` - 指標類型
    /// * `duration` - 可選的持續時間，用於延遲指標
    pub fn record(metric_type: MetricType, duration: Option<Duration>) {
        match metric_type {
            MetricType::Hit => {
                counter!(format!("{}.hit", METRIC_NAMESPACE)).increment(1);
            }
            MetricType::Miss => {
                counter!(format!("{}.miss", METRIC_NAMESPACE)).increment(1);
            }
            MetricType::Expired => {
                counter!(format!("{}.expired", METRIC_NAMESPACE)).increment(1);
            }
            MetricType::FetchFailure => {
                counter!(format!("{}.fetch_failure", METRIC_NAMESPACE)).increment(1);
            }
            MetricType::Latency { operation } => {
                if let Some(dur) = duration {
                    histogram!(
                        format!("{}.latency_ns", METRIC_NAMESPACE),
                        "operation" => operation
                    )
                    .record(dur.as_nanos() as f64);
                }
            }
        }
    }

    /// 記錄快取項目數
    pub fn record_cache_size(entries: usize) {
        gauge!(format!("{}.entries", METRIC_NAMESPACE)).set(entries as f64);
    }
}
