// utils/serde_helpers.rs - 序列化與反序列化輔助函數
use serde::{Deserialize, Deserializer};

/// 將空字符串反序列化為 None
///
/// 環境變數無法表達「未設定」，以空字符串代替，例如
/// `DASHBOARD__LOG__FILE=""` 表示不寫入日誌檔。
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        file: Option<String>,
    }

    #[test]
    fn test_empty_string_is_none() {
        let holder: Holder = serde_json::from_str(r#"{"file": ""}"#).unwrap();
        assert!(holder.file.is_none());

        let holder: Holder = serde_json::from_str(r#"{"file": "logs/app.log"}"#).unwrap();
        assert_eq!(holder.file.as_deref(), Some("logs/app.log"));

        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(holder.file.is_none());
    }
}
