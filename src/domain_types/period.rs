//! 回溯期間定義

use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::DomainError;

static PERIOD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(d|wk|mo|y)$").expect("period pattern is valid"));

/// 期間單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    fn days(&self) -> i64 {
        match self {
            PeriodUnit::Day => 1,
            PeriodUnit::Week => 7,
            PeriodUnit::Month => 30, // 簡化，使用30天
            PeriodUnit::Year => 365,
        }
    }
}

/// 回溯期間，例如 `5d`、`3mo`
///
/// 保留原始字串作為快取鍵的一部分，因此 `7d` 與 `1wk` 是不同的期間。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    text: String,
    amount: u32,
    unit: PeriodUnit,
}

impl Period {
    /// 預設回溯期間
    pub const DEFAULT: &'static str = "5d";
    /// 回溯期間上限（天），約 100 年
    pub const MAX_DAYS: i64 = 36_500;

    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let normalized = text.trim().to_lowercase();
        let captures = PERIOD_PATTERN
            .captures(&normalized)
            .ok_or_else(|| DomainError::InvalidPeriod(text.to_string()))?;

        let amount: u32 = captures[1]
            .parse()
            .map_err(|_| DomainError::InvalidPeriod(text.to_string()))?;
        let unit = match &captures[2] {
            "d" => PeriodUnit::Day,
            "wk" => PeriodUnit::Week,
            "mo" => PeriodUnit::Month,
            _ => PeriodUnit::Year,
        };

        let days = i64::from(amount) * unit.days();
        if amount == 0 || days > Self::MAX_DAYS {
            return Err(DomainError::InvalidPeriod(text.to_string()));
        }

        Ok(Self {
            text: normalized,
            amount,
            unit,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn unit(&self) -> PeriodUnit {
        self.unit
    }

    /// 期間天數
    pub fn days(&self) -> i64 {
        i64::from(self.amount) * self.unit.days()
    }

    /// 期間長度
    pub fn to_duration(&self) -> Duration {
        Duration::try_days(self.days()).unwrap_or(Duration::MAX)
    }
}

impl Default for Period {
    fn default() -> Self {
        Self {
            text: Self::DEFAULT.to_string(),
            amount: 5,
            unit: PeriodUnit::Day,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.text
    }
}

/// 分析頁可選的回溯區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lookback {
    SevenDays,
    ThirtyDays,
    NinetyDays,
    OneEightyDays,
}

impl Lookback {
    pub fn all() -> [Lookback; 4] {
        [
            Lookback::SevenDays,
            Lookback::ThirtyDays,
            Lookback::NinetyDays,
            Lookback::OneEightyDays,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lookback::SevenDays => "7d",
            Lookback::ThirtyDays => "30d",
            Lookback::NinetyDays => "90d",
            Lookback::OneEightyDays => "180d",
        }
    }

    pub fn period(&self) -> Period {
        let days = match self {
            Lookback::SevenDays => 7,
            Lookback::ThirtyDays => 30,
            Lookback::NinetyDays => 90,
            Lookback::OneEightyDays => 180,
        };
        Period {
            text: self.as_str().to_string(),
            amount: days,
            unit: PeriodUnit::Day,
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lookback {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Lookback::all()
            .into_iter()
            .find(|lookback| lookback.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidPeriod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse() {
        let period = Period::parse("3mo").unwrap();
        assert_eq!(period.amount(), 3);
        assert_eq!(period.unit(), PeriodUnit::Month);
        assert_eq!(period.to_duration(), Duration::days(90));

        assert_eq!(Period::parse(" 7D ").unwrap().as_str(), "7d");
        assert!(Period::parse("0d").is_err());
        assert!(Period::parse("7").is_err());
        assert!(Period::parse("d7").is_err());
        assert!(Period::parse("1h").is_err());
    }

    #[test]
    fn test_period_upper_bound() {
        assert_eq!(Period::parse("100y").unwrap().days(), Period::MAX_DAYS);
        assert!(Period::parse("101y").is_err());
        assert!(Period::parse("1000000y").is_err());
        assert!(Period::parse("4294967295d").is_err());
        assert!(Period::parse("99999999999999999999d").is_err());
    }

    #[test]
    fn test_period_default() {
        let period = Period::default();
        assert_eq!(period, Period::parse("5d").unwrap());
    }

    #[test]
    fn test_lookback_period() {
        assert_eq!(Lookback::NinetyDays.period().to_duration(), Duration::days(90));
        assert_eq!("180d".parse::<Lookback>().unwrap(), Lookback::OneEightyDays);
        assert!("14d".parse::<Lookback>().is_err());
    }

    #[test]
    fn test_periods_with_equal_length_are_distinct_keys() {
        assert_ne!(Period::parse("7d").unwrap(), Period::parse("1wk").unwrap());
    }
}
