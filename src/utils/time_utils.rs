// time_utils.rs
//
// 提供時間轉換相關的工具函數：
// 1. 毫秒時間戳與 DateTime<Utc> 之間的轉換
// 2. 由回看期間推算上游請求的起訖時間

use chrono::{DateTime, TimeZone, Utc};

use crate::domain_types::Period;

/// 將毫秒時間戳轉換為 DateTime<Utc>，超出範圍時返回 None
pub fn timestamp_ms_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts).single()
}

/// 以 `end` 為終點回看 `period`，返回 (起點, 終點) 的秒級時間戳
///
/// 起點超出可表示的時間範圍時返回 None。
pub fn lookback_window_secs(end: &DateTime<Utc>, period: &Period) -> Option<(i64, i64)> {
    let start = end.checked_sub_signed(period.to_duration())?;
    Some((start.timestamp(), end.timestamp()))
}
