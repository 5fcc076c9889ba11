//! 欄位名稱候選清單
//!
//! 上游表格可能是單一商品樣式（`Close`）或多商品樣式（`Close BTC-USD`）。
//! 每個邏輯欄位依下列順序嘗試，第一個存在的欄位勝出。清單以資料表示，
//! 新增樣式只需擴充 [`FIELD_PATTERNS`]。

use crate::domain_types::{ColumnName, Field};

/// 價量欄位命名樣式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPattern {
    /// `Close`
    Bare,
    /// `Close BTC-USD`
    SpaceSuffixed,
    /// `('Close', 'BTC-USD')`，多層表頭被直接轉成字串
    TupleFlattened,
    /// `Close_BTC-USD`
    UnderscoreSuffixed,
}

/// 價量欄位的嘗試順序
pub const FIELD_PATTERNS: [ColumnPattern; 4] = [
    ColumnPattern::Bare,
    ColumnPattern::SpaceSuffixed,
    ColumnPattern::TupleFlattened,
    ColumnPattern::UnderscoreSuffixed,
];

impl ColumnPattern {
    pub fn render(&self, base: &str, symbol: &str) -> String {
        match self {
            ColumnPattern::Bare => base.to_string(),
            ColumnPattern::SpaceSuffixed => format!("{} {}", base, symbol),
            ColumnPattern::TupleFlattened => format!("('{}', '{}')", base, symbol),
            ColumnPattern::UnderscoreSuffixed => format!("{}_{}", base, symbol),
        }
    }
}

/// 時間欄位精度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    /// 日內時間戳
    Intraday,
    /// 只有日期
    DateOnly,
}

/// 時間欄位的嘗試順序：先日內，再日期；都沒有時退回列序號
pub const TIMESTAMP_CANDIDATES: [(&str, TimestampKind); 2] = [
    (ColumnName::RAW_DATETIME, TimestampKind::Intraday),
    (ColumnName::RAW_DATE, TimestampKind::DateOnly),
];

/// 產生某個價量欄位的候選名稱
pub fn field_candidates(field: Field, symbol: &str) -> Vec<String> {
    FIELD_PATTERNS
        .iter()
        .map(|pattern| pattern.render(field.raw_name(), symbol))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_candidates_order() {
        let candidates = field_candidates(Field::Close, "BTC-USD");
        assert_eq!(
            candidates,
            vec![
                "Close".to_string(),
                "Close BTC-USD".to_string(),
                "('Close', 'BTC-USD')".to_string(),
                "Close_BTC-USD".to_string(),
            ]
        );
    }

    #[test]
    fn test_timestamp_candidates_prefer_intraday() {
        assert_eq!(TIMESTAMP_CANDIDATES[0].1, TimestampKind::Intraday);
        assert_eq!(TIMESTAMP_CANDIDATES[1].0, "Date");
    }
}
