/// 快取統計信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// 當前快取項目數（含已過期但尚未刷新的項目）
    pub entries: usize,
    /// 仍在 TTL 內的項目數
    pub fresh_entries: usize,
    /// 快取中的失敗結果數
    pub failed_entries: usize,
}
