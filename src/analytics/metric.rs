//! 單一商品的最新價與漲跌幅

use serde::Serialize;
use tracing::warn;

use crate::data_ingestion::NormalizedSeries;
use crate::utils::format::{format_change_pct, format_price};

/// 指標狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricStatus {
    /// 數值有效
    Ok,
    /// 沒有收盤價欄位或資料少於兩列
    NoData,
    /// 收盤價欄位無法轉為數值
    Error,
    /// 最新價或漲跌幅為 NaN
    Unavailable,
}

/// 指標計算結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub status: MetricStatus,
    /// 已格式化的最新價，僅在 `Ok` 時存在
    pub value: Option<String>,
    /// 相對前一列的漲跌幅（百分比），僅在 `Ok` 時存在
    pub change_pct: Option<f64>,
}

impl MetricResult {
    fn with_status(status: MetricStatus) -> Self {
        Self {
            status,
            value: None,
            change_pct: None,
        }
    }

    pub fn no_data() -> Self {
        Self::with_status(MetricStatus::NoData)
    }

    pub fn error() -> Self {
        Self::with_status(MetricStatus::Error)
    }

    pub fn unavailable() -> Self {
        Self::with_status(MetricStatus::Unavailable)
    }

    pub fn is_ok(&self) -> bool {
        self.status == MetricStatus::Ok
    }

    /// 顯示用的數值文字
    pub fn display_value(&self) -> String {
        match (self.status, &self.value) {
            (MetricStatus::Ok, Some(value)) => value.clone(),
            (MetricStatus::NoData, _) => "No data".to_string(),
            (MetricStatus::Error, _) => "Error".to_string(),
            _ => "N/A".to_string(),
        }
    }

    /// 顯示用的漲跌幅文字；非 `Ok` 狀態沒有漲跌幅
    pub fn change_display(&self) -> Option<String> {
        self.change_pct.map(format_change_pct)
    }
}

/// 以最後兩列收盤價計算最新價與漲跌幅
pub fn compute_metric(series: &NormalizedSeries) -> MetricResult {
    let Some(close) = series.close.as_ref() else {
        return MetricResult::no_data();
    };
    if series.len() < 2 {
        return MetricResult::no_data();
    }

    let closes = match &close.values {
        Ok(values) => values,
        Err(e) => {
            warn!("{} 收盤價無法使用: {}", series.symbol, e);
            return MetricResult::error();
        }
    };

    let current = closes[closes.len() - 1];
    let previous = closes[closes.len() - 2];
    let change = if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };

    if current.is_nan() || change.is_nan() {
        return MetricResult::unavailable();
    }

    MetricResult {
        status: MetricStatus::Ok,
        value: Some(format_price(current)),
        change_pct: Some(change),
    }
}
