//! 商品目錄
//!
//! 目錄在啟動時建立一次之後不再變動，以 `Arc<InstrumentCatalog>` 在各元件間共享。
//! 內建目錄來自 `config/instruments.toml`，於編譯時嵌入。

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::asset_types::Category;
use super::types::{DomainError, Result};

const BUILTIN_CATALOG: &str = include_str!("../../config/instruments.toml");

/// 單一商品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// 顯示名稱
    pub label: String,
    /// 上游商品代碼
    pub symbol: String,
    pub category: Category,
}

/// 商品分組（對應儀表板上的一個分頁）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentGroup {
    pub title: String,
    pub instruments: Vec<Instrument>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    group: Vec<GroupDef>,
}

#[derive(Debug, Deserialize)]
struct GroupDef {
    title: String,
    category: Category,
    instruments: Vec<InstrumentDef>,
}

#[derive(Debug, Deserialize)]
struct InstrumentDef {
    label: String,
    symbol: String,
    /// 未指定時沿用分組的類別
    category: Option<Category>,
}

/// 不可變的商品目錄
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    groups: Vec<InstrumentGroup>,
    // symbol -> (group index, instrument index)
    by_symbol: FxHashMap<String, (usize, usize)>,
}

impl InstrumentCatalog {
    /// 載入內建目錄
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// 從 TOML 字串建立目錄
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| DomainError::InvalidCatalog(e.to_string()))?;

        let groups = file
            .group
            .into_iter()
            .map(|group| InstrumentGroup {
                title: group.title,
                instruments: group
                    .instruments
                    .into_iter()
                    .map(|def| Instrument {
                        label: def.label,
                        symbol: def.symbol,
                        category: def.category.unwrap_or(group.category),
                    })
                    .collect(),
            })
            .collect();

        Self::from_groups(groups)
    }

    /// 從分組建立目錄，並檢查名稱與代碼
    pub fn from_groups(groups: Vec<InstrumentGroup>) -> Result<Self> {
        let mut by_symbol = FxHashMap::default();

        for (group_idx, group) in groups.iter().enumerate() {
            if group.title.trim().is_empty() {
                return Err(DomainError::InvalidCatalog("分組標題不可為空".to_string()));
            }
            for (inst_idx, instrument) in group.instruments.iter().enumerate() {
                if instrument.label.trim().is_empty() || instrument.symbol.trim().is_empty() {
                    return Err(DomainError::InvalidCatalog(format!(
                        "分組 {} 含有空白的名稱或代碼",
                        group.title
                    )));
                }
                if by_symbol
                    .insert(instrument.symbol.clone(), (group_idx, inst_idx))
                    .is_some()
                {
                    return Err(DomainError::DuplicateSymbol(instrument.symbol.clone()));
                }
            }
        }

        Ok(Self { groups, by_symbol })
    }

    pub fn groups(&self) -> &[InstrumentGroup] {
        &self.groups
    }

    /// 依分組順序列出所有商品
    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.groups.iter().flat_map(|group| group.instruments.iter())
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Instrument> {
        self.by_symbol
            .get(symbol)
            .map(|&(group_idx, inst_idx)| &self.groups[group_idx].instruments[inst_idx])
    }

    pub fn find_by_label(&self, label: &str) -> Option<&Instrument> {
        self.instruments().find(|instrument| instrument.label == label)
    }

    /// 目錄中登記的類別
    pub fn category_of(&self, symbol: &str) -> Option<Category> {
        self.find_by_symbol(symbol).map(|instrument| instrument.category)
    }
}
