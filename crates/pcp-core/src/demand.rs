//! 需求計劃模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MonthKey;

/// 月度需求目標（一個 SKU 在一個日曆月的目標產量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    /// 需求ID
    pub id: Uuid,

    /// SKU ID
    pub sku_id: Uuid,

    /// 月份（YYYY-MM），保留儲存層原始字串
    pub month_year: String,

    /// 目標數量
    pub target_quantity: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Demand {
    /// 創建新的需求
    pub fn new(sku_id: Uuid, month: MonthKey, target_quantity: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sku_id,
            month_year: month.to_string(),
            target_quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// 解析月份，格式錯誤時返回 `None`
    pub fn month_key(&self) -> Option<MonthKey> {
        self.month_year.parse().ok()
    }

    /// 是否為同一 SKU 同一月份
    pub fn is_same_slot(&self, sku_id: &Uuid, month: &MonthKey) -> bool {
        self.sku_id == *sku_id && self.month_key().as_ref() == Some(month)
    }
}
