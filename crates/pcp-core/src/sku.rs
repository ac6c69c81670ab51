//! SKU 模型

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 引用已刪除 SKU 時顯示的代碼
pub const UNKNOWN_SKU_LABEL: &str = "N/A (已刪除)";

/// 庫存單位（Stock-Keeping Unit）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// SKU ID
    pub id: Uuid,

    /// 業務代碼（唯一，不分大小寫）
    pub code: String,

    /// 描述
    pub description: String,

    /// 計量單位
    pub unit_of_measure: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sku {
    /// 創建新的 SKU
    pub fn new(code: String, description: String, unit_of_measure: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            description,
            unit_of_measure,
            created_at: now,
            updated_at: now,
        }
    }

    /// 建構器模式：設置建立時間
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    /// 代碼是否相同（不分大小寫）
    pub fn code_matches(&self, code: &str) -> bool {
        self.code.to_lowercase() == code.to_lowercase()
    }
}

/// SKU 查詢表（ID → SKU）
///
/// 讀取時做關聯，取代在訂單/需求上冗餘儲存 SKU 代碼。
#[derive(Debug, Clone, Default)]
pub struct SkuCatalog {
    by_id: HashMap<Uuid, Sku>,
}

impl SkuCatalog {
    pub fn new(skus: &[Sku]) -> Self {
        Self {
            by_id: skus.iter().map(|sku| (sku.id, sku.clone())).collect(),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Sku> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.by_id.contains_key(id)
    }

    /// SKU 代碼；找不到時返回 [`UNKNOWN_SKU_LABEL`]
    pub fn code_or_unknown(&self, id: &Uuid) -> &str {
        self.by_id
            .get(id)
            .map(|sku| sku.code.as_str())
            .unwrap_or(UNKNOWN_SKU_LABEL)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Sku> for SkuCatalog {
    fn from_iter<I: IntoIterator<Item = Sku>>(iter: I) -> Self {
        Self {
            by_id: iter.into_iter().map(|sku| (sku.id, sku)).collect(),
        }
    }
}
