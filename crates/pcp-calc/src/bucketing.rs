//! 月份分桶

use std::collections::HashMap;

use chrono::FixedOffset;
use pcp_core::{MonthKey, ProductionOrder, MAX_WINDOW_MONTHS};
use uuid::Uuid;

/// 月份分桶計算器
pub struct BucketingCalculator;

impl BucketingCalculator {
    /// 創建以 `end` 結尾、共 `months` 個月的連續月份（由舊到新）
    ///
    /// 月份數超過 [`MAX_WINDOW_MONTHS`] 時以上限計。
    pub fn month_window(end: MonthKey, months: u32) -> Vec<MonthKey> {
        (0..months.min(MAX_WINDOW_MONTHS))
            .rev()
            .map(|back| end.add_months(-(back as i32)))
            .collect()
    }

    /// 按 (SKU, 完成月份) 彙總已完成訂單的交付數量
    pub fn delivered_by_sku_month(
        orders: &[ProductionOrder],
        offset: FixedOffset,
    ) -> HashMap<(Uuid, MonthKey), u64> {
        let mut totals = HashMap::new();
        for order in orders {
            if let Some(month) = order.completion_month(offset) {
                *totals.entry((order.sku_id, month)).or_insert(0) += order.delivered_or_zero();
            }
        }
        totals
    }

    /// 按完成月份彙總已完成訂單的交付數量
    pub fn delivered_by_month(
        orders: &[ProductionOrder],
        offset: FixedOffset,
    ) -> HashMap<MonthKey, u64> {
        let mut totals = HashMap::new();
        for order in orders {
            if let Some(month) = order.completion_month(offset) {
                *totals.entry(month).or_insert(0) += order.delivered_or_zero();
            }
        }
        totals
    }

    /// 按 SKU 彙總所有已完成訂單的交付數量（不分月份）
    pub fn delivered_by_sku(orders: &[ProductionOrder]) -> HashMap<Uuid, u64> {
        let mut totals = HashMap::new();
        for order in orders.iter().filter(|o| o.is_completed()) {
            *totals.entry(order.sku_id).or_insert(0) += order.delivered_or_zero();
        }
        totals
    }
}
