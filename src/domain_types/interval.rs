//! 取樣間隔定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use super::types::DomainError;

/// 數據取樣間隔
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
    OneWeek,
    OneMonth,
}

impl Interval {
    /// 獲取所有間隔列表
    pub fn all() -> [Interval; 8] {
        [
            Interval::OneMinute,
            Interval::FiveMinutes,
            Interval::FifteenMinutes,
            Interval::ThirtyMinutes,
            Interval::OneHour,
            Interval::OneDay,
            Interval::OneWeek,
            Interval::OneMonth,
        ]
    }

    /// 上游 API 使用的間隔字串
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
        }
    }

    /// 轉換為表示該間隔的 std::time::Duration
    pub fn to_std_duration(&self) -> StdDuration {
        match self {
            Interval::OneMinute => StdDuration::from_secs(60),
            Interval::FiveMinutes => StdDuration::from_secs(300),
            Interval::FifteenMinutes => StdDuration::from_secs(900),
            Interval::ThirtyMinutes => StdDuration::from_secs(1800),
            Interval::OneHour => StdDuration::from_secs(3600),
            Interval::OneDay => StdDuration::from_secs(86400),
            Interval::OneWeek => StdDuration::from_secs(604800),
            Interval::OneMonth => StdDuration::from_secs(2592000), // 簡化，使用30天
        }
    }

    /// 是否為日內間隔
    pub fn is_intraday(&self) -> bool {
        self.to_std_duration() < Interval::OneDay.to_std_duration()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Interval::all()
            .into_iter()
            .find(|interval| interval.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidInterval(s.to_string()))
    }
}
