// utils.rs - 公共工具模組
//
// 時間轉換、數值顯示格式與設定反序列化的輔助函數。

pub mod format;
pub mod serde_helpers;
pub mod time_utils;

// 重新導出常用函數，使其可以通過 utils::function_name 直接訪問
pub use format::{format_change_pct, format_price, format_thousands};
pub use time_utils::{lookback_window_secs, timestamp_ms_to_datetime};
