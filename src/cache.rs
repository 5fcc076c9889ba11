pub mod clock;
pub mod keys;
pub mod metrics;
pub mod series_cache;
pub mod stats;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use keys::CacheKey;
pub use metrics::{CacheMetrics, MetricType, METRIC_NAMESPACE};
pub use series_cache::{SeriesCache, DEFAULT_TTL_SECS};
pub use stats::CacheStats;
