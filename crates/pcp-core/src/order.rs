//! 生產訂單模型

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MonthKey, PcpError, Result};

/// 生產訂單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 已開立
    Open,
    /// 生產中
    InProgress,
    /// 已完成
    Completed,
    /// 已取消
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Open,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// 檢查狀態轉換是否合法
    ///
    /// `open → in_progress → completed`，`open | in_progress → cancelled`
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        matches!(
            (self, to),
            (OrderStatus::Open, OrderStatus::InProgress)
                | (OrderStatus::InProgress, OrderStatus::Completed)
                | (OrderStatus::Open, OrderStatus::Cancelled)
                | (OrderStatus::InProgress, OrderStatus::Cancelled)
        )
    }

    /// 是否為終態
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生產訂單（一次 SKU 生產批次）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// 訂單ID
    pub id: Uuid,

    /// SKU ID
    pub sku_id: Uuid,

    /// 計劃數量
    pub quantity: u64,

    /// 狀態
    pub status: OrderStatus,

    /// 開始時間（進入生產中時設置）
    pub start_time: Option<DateTime<Utc>>,

    /// 結束時間（完成或取消時設置）
    pub end_time: Option<DateTime<Utc>>,

    /// 實際交付數量（僅完成時設置）
    pub delivered_quantity: Option<u64>,

    /// 總生產時間（毫秒）
    pub total_production_ms: Option<i64>,

    /// 每單位秒數
    pub seconds_per_unit: Option<Decimal>,

    /// 備註
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductionOrder {
    /// 創建新的生產訂單（狀態為 open）
    pub fn new(sku_id: Uuid, quantity: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sku_id,
            quantity,
            status: OrderStatus::Open,
            start_time: None,
            end_time: None,
            delivered_quantity: None,
            total_production_ms: None,
            seconds_per_unit: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// 建構器模式：設置建立時間
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    fn transition(&mut self, to: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(PcpError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// 開始生產
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(OrderStatus::InProgress)?;
        self.start_time = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// 完成生產，記錄交付數量與生產時間
    pub fn complete(&mut self, delivered_quantity: u64, now: DateTime<Utc>) -> Result<()> {
        self.transition(OrderStatus::Completed)?;
        self.end_time = Some(now);
        self.delivered_quantity = Some(delivered_quantity);
        self.total_production_ms = self.elapsed_ms(now);
        self.seconds_per_unit = match self.total_production_ms {
            Some(ms) if ms > 0 && delivered_quantity > 0 => Some(
                Decimal::from(ms) / Decimal::from(1000) / Decimal::from(delivered_quantity),
            ),
            _ => None,
        };
        self.updated_at = now;
        Ok(())
    }

    /// 取消訂單（不記錄交付數量）
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(OrderStatus::Cancelled)?;
        self.end_time = Some(now);
        self.total_production_ms = self.elapsed_ms(now);
        self.updated_at = now;
        Ok(())
    }

    fn elapsed_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        self.start_time
            .map(|start| (now - start).num_milliseconds())
    }

    /// 完成或取消後，SKU 與數量不可再修改
    pub fn is_locked(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// 交付數量，未設置時為 0
    pub fn delivered_or_zero(&self) -> u64 {
        self.delivered_quantity.unwrap_or(0)
    }

    /// 完成月份（指定時區），未完成或缺少結束時間時返回 `None`
    pub fn completion_month(&self, offset: FixedOffset) -> Option<MonthKey> {
        if !self.is_completed() {
            return None;
        }
        self.end_time
            .map(|end| MonthKey::from_instant(end, offset))
    }
}
