//! 基本市場數據類型定義

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 領域錯誤類型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("無效的資產類別: {0}")]
    InvalidCategory(String),

    #[error("無效的取樣間隔: {0}")]
    InvalidInterval(String),

    #[error("無效的回溯期間: {0}")]
    InvalidPeriod(String),

    #[error("商品目錄格式錯誤: {0}")]
    InvalidCatalog(String),

    #[error("重複的商品代碼: {0}")]
    DuplicateSymbol(String),
}

/// 領域結果類型
pub type Result<T> = std::result::Result<T, DomainError>;

/// OHLCV 邏輯欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    /// 所有價量欄位，依正規化輸出順序排列
    pub const ALL: [Field; 5] = [Field::Open, Field::High, Field::Low, Field::Close, Field::Volume];

    /// 上游表格使用的欄位名稱（未加商品代碼後綴）
    pub fn raw_name(&self) -> &'static str {
        match self {
            Field::Open => ColumnName::RAW_OPEN,
            Field::High => ColumnName::RAW_HIGH,
            Field::Low => ColumnName::RAW_LOW,
            Field::Close => ColumnName::RAW_CLOSE,
            Field::Volume => ColumnName::RAW_VOLUME,
        }
    }

    /// 正規化後的欄位名稱
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Field::Open => ColumnName::OPEN,
            Field::High => ColumnName::HIGH,
            Field::Low => ColumnName::LOW,
            Field::Close => ColumnName::CLOSE,
            Field::Volume => ColumnName::VOLUME,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_name())
    }
}

/// 標準列名定義
pub struct ColumnName;

impl ColumnName {
    pub const TIME: &'static str = "time"; // 以毫秒為單位的 i64 時間戳
    pub const OPEN: &'static str = "open"; // 開盤價
    pub const HIGH: &'static str = "high"; // 最高價
    pub const LOW: &'static str = "low"; // 最低價
    pub const CLOSE: &'static str = "close"; // 收盤價
    pub const VOLUME: &'static str = "volume"; // 成交量

    // 上游表格欄位
    pub const RAW_DATETIME: &'static str = "Datetime"; // 日內時間戳
    pub const RAW_DATE: &'static str = "Date"; // 日期
    pub const RAW_OPEN: &'static str = "Open";
    pub const RAW_HIGH: &'static str = "High";
    pub const RAW_LOW: &'static str = "Low";
    pub const RAW_CLOSE: &'static str = "Close";
    pub const RAW_VOLUME: &'static str = "Volume";
}
