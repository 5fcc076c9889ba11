use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::DomainError;

/// 報價幣別後綴，用於辨識加密貨幣交易對（例如 `BTC-USD`）
const CRYPTO_QUOTE_SUFFIXES: [&str; 5] = ["-USD", "-USDT", "-EUR", "-BTC", "-ETH"];

/// 交易所後綴，用於辨識沒有 `^` 前綴的指數代碼（例如 `000001.SS`）
const INDEX_EXCHANGE_SUFFIXES: [&str; 3] = [".SS", ".ME", ".MI"];

/// 資產類別枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Index,     // 股價指數
    Commodity, // 商品
    Crypto,    // 加密貨幣
    Future,    // 期貨
}

impl Category {
    /// 依商品代碼命名慣例推斷資產類別
    ///
    /// 無法辨識時返回 `None`。`=F` 結尾的連續合約一律視為期貨。
    pub fn infer_from_symbol(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }

        if CRYPTO_QUOTE_SUFFIXES.iter().any(|s| upper.ends_with(s)) {
            Some(Category::Crypto)
        } else if upper.ends_with("=F") {
            Some(Category::Future)
        } else if upper.starts_with('^')
            || INDEX_EXCHANGE_SUFFIXES.iter().any(|s| upper.ends_with(s))
        {
            Some(Category::Index)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Index => "index",
            Category::Commodity => "commodity",
            Category::Crypto => "crypto",
            Category::Future => "future",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Index => write!(f, "Index"),
            Category::Commodity => write!(f, "Commodity"),
            Category::Crypto => write!(f, "Crypto"),
            Category::Future => write!(f, "Future"),
        }
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "index" => Ok(Category::Index),
            "commodity" => Ok(Category::Commodity),
            "crypto" => Ok(Category::Crypto),
            "future" | "futures" => Ok(Category::Future),
            other => Err(DomainError::InvalidCategory(other.to_string())),
        }
    }
}
