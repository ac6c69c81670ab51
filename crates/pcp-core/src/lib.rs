//! # PCP Core
//!
//! 生產控制核心資料模型與類型定義

pub mod config;
pub mod demand;
pub mod month;
pub mod order;
pub mod sku;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// Re-export 主要類型
pub use config::{AggregationConfig, MAX_WINDOW_MONTHS};
pub use demand::Demand;
pub use month::MonthKey;
pub use order::{OrderStatus, ProductionOrder};
pub use sku::{Sku, SkuCatalog, UNKNOWN_SKU_LABEL};

/// 生產控制錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum PcpError {
    #[error("找不到{entity}: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("欄位驗證失敗: {0}")]
    Validation(ValidationErrors),

    #[error("SKU 代碼已存在: {0}")]
    DuplicateSkuCode(String),

    #[error("SKU {sku_id} 在 {month_year} 已有需求")]
    DuplicateDemand { sku_id: String, month_year: String },

    #[error("SKU 仍被生產訂單或需求計劃引用: {0}")]
    SkuInUse(String),

    #[error("無效的狀態轉換: {from} → {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("訂單 {0} 已鎖定，只能修改備註")]
    OrderLocked(String),

    #[error("進行中的訂單不可刪除: {0}")]
    OrderInProgress(String),

    #[error("無效的月份: {0}")]
    InvalidMonthKey(String),

    #[error("儲存層錯誤: {0}")]
    Storage(String),

    #[error("配置錯誤: {0}")]
    Config(String),
}

impl PcpError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PcpError>;

/// 欄位錯誤集合（欄位名稱 → 錯誤訊息）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加欄位錯誤
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 檢查欄位是否有錯誤
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// 沒有錯誤時返回 `Ok(value)`，否則返回 `PcpError::Validation`
    pub fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(PcpError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
