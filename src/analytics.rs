pub mod fibonacci;
pub mod metric;
pub mod volume_profile;
pub mod vwap;

pub use fibonacci::{fibonacci_levels, FibonacciLevel, FIB_RATIOS};
pub use metric::{compute_metric, MetricResult, MetricStatus};
pub use volume_profile::{volume_profile, ProfileBin, VolumeProfile, DEFAULT_PROFILE_BINS};
pub use vwap::vwap;
