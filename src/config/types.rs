use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::analytics::DEFAULT_PROFILE_BINS;
use crate::cache::DEFAULT_TTL_SECS;
use crate::config::validation::{ValidationError, ValidationUtils, Validator};
use crate::domain_types::Period;
use crate::utils::serde_helpers::empty_string_as_none;

/// 應用程序配置結構
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log: LogConfig,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub dashboard: DashboardConfig,
}

impl Validator for ApplicationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.log.validate()?;
        self.provider.validate()?;
        self.cache.validate()?;
        self.dashboard.validate()?;

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// `pretty` 或 `json`
    pub format: String,
    /// 另外寫入的日誌檔路徑，每日輪替
    #[serde(deserialize_with = "empty_string_as_none")]
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::one_of(
            &self.level,
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;
        ValidationUtils::one_of(&self.format, &["pretty", "json"], "log.format")?;

        Ok(())
    }
}

/// 上游行情來源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 10,
            user_agent: concat!("market_dashboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Validator for ProviderConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_empty(&self.base_url, "provider.base_url")?;
        ValidationUtils::not_empty(&self.user_agent, "provider.user_agent")?;
        ValidationUtils::in_range(self.timeout_secs, 1, 300, "provider.timeout_secs")?;

        Ok(())
    }
}

/// 序列快取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// 超過此數量時記錄警告；快取本身不淘汰條目
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: 1024,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Validator for CacheConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::in_range(self.ttl_secs, 1, 86_400, "cache.ttl_secs")?;
        ValidationUtils::in_range(self.max_entries, 1, 1_000_000, "cache.max_entries")?;

        Ok(())
    }
}

/// 儀表板配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub refresh_interval_secs: u64,
    pub default_period: Period,
    pub profile_bins: usize,
    pub max_concurrent_fetches: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
            default_period: Period::default(),
            profile_bins: DEFAULT_PROFILE_BINS,
            max_concurrent_fetches: 8,
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Validator for DashboardConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::in_range(
            self.refresh_interval_secs,
            1,
            86_400,
            "dashboard.refresh_interval_secs",
        )?;
        ValidationUtils::in_range(
            self.default_period.days(),
            1,
            Period::MAX_DAYS,
            "dashboard.default_period",
        )?;
        ValidationUtils::in_range(self.profile_bins, 1, 1_000, "dashboard.profile_bins")?;
        ValidationUtils::in_range(
            self.max_concurrent_fetches,
            1,
            64,
            "dashboard.max_concurrent_fetches",
        )?;

        Ok(())
    }
}
