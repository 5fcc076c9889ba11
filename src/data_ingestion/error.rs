//! 正規化錯誤定義

use thiserror::Error;

/// 欄位正規化錯誤
///
/// 只描述單一欄位的問題，不會讓整個序列失敗。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("欄位 {column} 無法轉為數值: {reason}")]
    Coercion { column: String, reason: String },

    #[error("不支援的時間欄位類型: {column} ({dtype})")]
    UnsupportedTimestamp { column: String, dtype: String },

    #[error("時間戳解析錯誤: {column}, 值 {value}")]
    TimestampParse { column: String, value: String },
}

/// 正規化結果類型
pub type NormalizeResult<T> = Result<T, NormalizeError>;
