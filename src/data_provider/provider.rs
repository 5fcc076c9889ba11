//! 上游數據源抽象
//!
//! [`UpstreamProvider`] 是系統與行情供應商之間唯一的轉接邊界，只有
//! [`SeriesFetcher`](super::fetcher::SeriesFetcher) 會呼叫它。實作負責把供應商的回應
//! 轉成表格（`DataFrame`），欄位命名保留供應商的樣式，交由正規化模組處理。

use async_trait::async_trait;
use polars::prelude::{DataFrame, PolarsError};
use thiserror::Error;

use crate::domain_types::{Interval, Period};

/// 上游數據源錯誤
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 網路錯誤或逾時
    #[error("上游請求失敗: {0}")]
    Request(#[from] reqwest::Error),

    /// 上游 API 回傳錯誤訊息（例如未知的商品代碼）
    #[error("上游 API 錯誤: {0}")]
    Api(String),

    /// 回應內容無法解析
    #[error("回應格式錯誤: {0}")]
    Malformed(String),

    /// 建立表格失敗
    #[error("Polars 錯誤: {0}")]
    Frame(#[from] PolarsError),

    #[error("無效的上游設定: {0}")]
    InvalidConfig(String),
}

/// 上游行情供應商
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// 下載單一商品的 OHLCV 表格
    ///
    /// 失敗時返回錯誤，不做重試。
    async fn download(
        &self,
        symbol: &str,
        period: &Period,
        interval: Interval,
    ) -> Result<DataFrame, ProviderError>;

    /// 供應商名稱，用於日誌
    fn name(&self) -> &'static str;
}
