//! 儀表板摘要

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pcp_core::{AggregationConfig, Demand, MonthKey, OrderStatus, ProductionOrder, Sku};
use serde::{Deserialize, Serialize};

use crate::bucketing::BucketingCalculator;
use crate::progress::progress_percentage;

/// 單一狀態的訂單數量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// 月度產量與目標
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyProduction {
    pub month: MonthKey,
    /// 月份縮寫
    pub label: String,
    pub produced_units: u64,
    pub target_units: u64,
}

/// 儀表板摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_skus: usize,
    pub open_orders: usize,
    pub in_progress_orders: usize,

    /// 當月或下月、進度低於門檻且未達成的需求數
    pub critical_demands: usize,

    /// 四種狀態的訂單數（固定順序）
    pub status_counts: Vec<StatusCount>,

    /// 月度序列（由舊到新）
    pub monthly_production: Vec<MonthlyProduction>,
}

impl DashboardSummary {
    /// 數量大於 0 的狀態（狀態圖表用）
    pub fn nonzero_status_counts(&self) -> Vec<StatusCount> {
        self.status_counts
            .iter()
            .copied()
            .filter(|c| c.count > 0)
            .collect()
    }
}

/// 計算儀表板摘要
///
/// 月度序列固定 `config.window_months` 個桶，以 `now` 所在月份（依配置時區）結尾；
/// 視窗外的需求與訂單不計入。
pub fn compute_dashboard_summary(
    skus: &[Sku],
    orders: &[ProductionOrder],
    demands: &[Demand],
    now: DateTime<Utc>,
    config: &AggregationConfig,
) -> DashboardSummary {
    tracing::info!(
        "開始儀表板彙總：SKU {} 筆，訂單 {} 筆，需求 {} 筆",
        skus.len(),
        orders.len(),
        demands.len()
    );

    let offset = config.offset();
    let current_month = MonthKey::from_instant(now, offset);
    let next_month = current_month.succ();

    // 訂單狀態統計
    let status_counts: Vec<StatusCount> = OrderStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: orders.iter().filter(|o| o.status == status).count(),
        })
        .collect();
    let count_of = |status: OrderStatus| {
        status_counts
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
            .unwrap_or(0)
    };

    // 緊急需求
    let delivered = BucketingCalculator::delivered_by_sku_month(orders, offset);
    let critical_demands = demands
        .iter()
        .filter(|demand| {
            let Some(month) = demand.month_key() else {
                return false;
            };
            if month != current_month && month != next_month {
                return false;
            }
            let produced = delivered
                .get(&(demand.sku_id, month))
                .copied()
                .unwrap_or(0);
            produced < demand.target_quantity
                && progress_percentage(produced, demand.target_quantity)
                    < config.critical_progress_threshold
        })
        .count();
    tracing::debug!("緊急需求: {} 筆（{} / {}）", critical_demands, current_month, next_month);

    // 月度序列：先建立零值桶，再填入目標與產量
    let mut buckets: BTreeMap<MonthKey, (u64, u64)> =
        BucketingCalculator::month_window(current_month, config.window_months)
            .into_iter()
            .map(|month| (month, (0, 0)))
            .collect();

    for demand in demands {
        let Some(month) = demand.month_key() else {
            continue;
        };
        if let Some((_, target)) = buckets.get_mut(&month) {
            *target += demand.target_quantity;
        }
    }

    for (month, units) in BucketingCalculator::delivered_by_month(orders, offset) {
        if let Some((produced, _)) = buckets.get_mut(&month) {
            *produced += units;
        }
    }

    let monthly_production: Vec<MonthlyProduction> = buckets
        .into_iter()
        .map(|(month, (produced_units, target_units))| MonthlyProduction {
            month,
            label: month.short_label(),
            produced_units,
            target_units,
        })
        .collect();

    let summary = DashboardSummary {
        total_skus: skus.len(),
        open_orders: count_of(OrderStatus::Open),
        in_progress_orders: count_of(OrderStatus::InProgress),
        critical_demands,
        status_counts,
        monthly_production,
    };

    tracing::info!(
        "儀表板彙總完成：開立 {}，生產中 {}，緊急需求 {}",
        summary.open_orders,
        summary.in_progress_orders,
        summary.critical_demands
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn sku(code: &str) -> Sku {
        Sku::new(code.to_string(), format!("{} 描述", code), "pc".to_string())
    }

    fn completed(sku: &Sku, delivered: u64, y: i32, m: u32, d: u32) -> ProductionOrder {
        let end = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        let mut order = ProductionOrder::new(sku.id, delivered.max(1));
        order.start(end).unwrap();
        order.complete(delivered, end).unwrap();
        order
    }

    fn demand(sku: &Sku, month: &str, target: u64) -> Demand {
        Demand::new(sku.id, month.parse().unwrap(), target)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_inputs_still_fill_window() {
        let summary = compute_dashboard_summary(&[], &[], &[], now(), &AggregationConfig::default());

        assert_eq!(summary.total_skus, 0);
        assert_eq!(summary.critical_demands, 0);
        assert_eq!(summary.status_counts.len(), 4);
        assert!(summary.nonzero_status_counts().is_empty());

        let months: Vec<String> = summary
            .monthly_production
            .iter()
            .map(|m| m.month.to_string())
            .collect();
        assert_eq!(
            months,
            vec!["2024-03", "2024-04", "2024-05", "2024-06", "2024-07", "2024-08"]
        );
        assert!(summary
            .monthly_production
            .iter()
            .all(|m| m.produced_units == 0 && m.target_units == 0));
        assert_eq!(summary.monthly_production[5].label, "Aug");
    }

    #[test]
    fn test_status_counts() {
        let panel = sku("PNL-001");
        let mut in_progress = ProductionOrder::new(panel.id, 10);
        in_progress.start(now()).unwrap();
        let mut cancelled = ProductionOrder::new(panel.id, 10);
        cancelled.cancel(now()).unwrap();
        let orders = vec![
            ProductionOrder::new(panel.id, 10),
            ProductionOrder::new(panel.id, 20),
            in_progress,
            cancelled,
            completed(&panel, 5, 2024, 8, 1),
        ];

        let summary =
            compute_dashboard_summary(&[panel], &orders, &[], now(), &AggregationConfig::default());

        assert_eq!(summary.total_skus, 1);
        assert_eq!(summary.open_orders, 2);
        assert_eq!(summary.in_progress_orders, 1);
        let counts: Vec<(OrderStatus, usize)> = summary
            .status_counts
            .iter()
            .map(|c| (c.status, c.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (OrderStatus::Open, 2),
                (OrderStatus::InProgress, 1),
                (OrderStatus::Completed, 1),
                (OrderStatus::Cancelled, 1),
            ]
        );
    }

    #[test]
    fn test_monthly_series_buckets() {
        let panel = sku("PNL-001");
        let frame = sku("FRM-001");
        let demands = vec![
            demand(&panel, "2024-07", 250),
            demand(&frame, "2024-07", 50),
            demand(&panel, "2024-08", 100),
            // 視窗外
            demand(&panel, "2024-01", 999),
            demand(&panel, "2024-09", 999),
        ];
        let orders = vec![
            completed(&panel, 95, 2024, 7, 3),
            completed(&panel, 50, 2024, 7, 20),
            completed(&frame, 30, 2024, 8, 2),
            completed(&frame, 1000, 2023, 12, 2),
        ];

        let summary = compute_dashboard_summary(
            &[panel, frame],
            &orders,
            &demands,
            now(),
            &AggregationConfig::default(),
        );

        assert_eq!(summary.monthly_production.len(), 6);
        let july = &summary.monthly_production[4];
        assert_eq!(july.month.to_string(), "2024-07");
        assert_eq!(july.produced_units, 145);
        assert_eq!(july.target_units, 300);

        let august = &summary.monthly_production[5];
        assert_eq!(august.produced_units, 30);
        assert_eq!(august.target_units, 100);

        let total_target: u64 = summary.monthly_production.iter().map(|m| m.target_units).sum();
        assert_eq!(total_target, 400);
    }

    #[test]
    fn test_window_crosses_year() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let config = AggregationConfig::new().with_window_months(3);

        let summary = compute_dashboard_summary(&[], &[], &[], now, &config);
        let months: Vec<String> = summary
            .monthly_production
            .iter()
            .map(|m| m.month.to_string())
            .collect();

        assert_eq!(months, vec!["2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn test_zero_window() {
        let config = AggregationConfig::new().with_window_months(0);
        let summary = compute_dashboard_summary(&[], &[], &[], now(), &config);
        assert!(summary.monthly_production.is_empty());
    }

    #[test]
    fn test_critical_demands() {
        let a = sku("A-1");
        let b = sku("B-1");
        let c = sku("C-1");
        let d = sku("D-1");
        let demands = vec![
            // 當月、進度 10% → 緊急
            demand(&a, "2024-08", 100),
            // 下月、進度 0% → 緊急
            demand(&b, "2024-09", 100),
            // 當月、進度 25% → 不緊急（門檻為嚴格小於）
            demand(&c, "2024-08", 100),
            // 上月、進度 0% → 不在範圍
            demand(&d, "2024-07", 100),
            // 兩個月後 → 不在範圍
            demand(&d, "2024-10", 100),
            // 當月、目標 0 → 進度 0 但產量不小於目標
            demand(&d, "2024-08", 0),
        ];
        let orders = vec![completed(&a, 10, 2024, 8, 5), completed(&c, 25, 2024, 8, 6)];

        let summary = compute_dashboard_summary(
            &[a, b, c, d],
            &orders,
            &demands,
            now(),
            &AggregationConfig::default(),
        );

        assert_eq!(summary.critical_demands, 2);
    }

    #[test]
    fn test_critical_threshold_configurable() {
        let a = sku("A-1");
        let demands = vec![demand(&a, "2024-08", 100)];
        let orders = vec![completed(&a, 40, 2024, 8, 5)];
        let config =
            AggregationConfig::new().with_critical_progress_threshold(Decimal::from(50));

        let summary = compute_dashboard_summary(&[a], &orders, &demands, now(), &config);

        assert_eq!(summary.critical_demands, 1);
    }

    #[test]
    fn test_critical_ignores_sku_catalog() {
        // SKU 已刪除的需求仍依產量判斷；超額交付不算緊急
        let gone = sku("GONE-1");
        let over = sku("OVR-1");
        let demands = vec![demand(&gone, "2024-08", 100), demand(&over, "2024-09", 10)];
        let orders = vec![completed(&gone, 5, 2024, 8, 2), completed(&over, 30, 2024, 9, 1)];

        let summary = compute_dashboard_summary(
            &[over],
            &orders,
            &demands,
            now(),
            &AggregationConfig::default(),
        );

        assert_eq!(summary.critical_demands, 1);
        assert_eq!(summary.total_skus, 1);
    }

    #[test]
    fn test_current_month_follows_offset() {
        // UTC 2024-08-31 23:00 在 UTC+8 已是 9 月
        let now = Utc.with_ymd_and_hms(2024, 8, 31, 23, 0, 0).unwrap();
        let config = AggregationConfig::new()
            .with_utc_offset_minutes(8 * 60)
            .with_window_months(1);

        let summary = compute_dashboard_summary(&[], &[], &[], now, &config);

        assert_eq!(summary.monthly_production[0].month.to_string(), "2024-09");
    }

    #[test]
    fn test_idempotent() {
        let panel = sku("PNL-001");
        let skus = vec![panel.clone()];
        let demands = vec![demand(&panel, "2024-08", 100)];
        let orders = vec![completed(&panel, 20, 2024, 8, 1)];
        let config = AggregationConfig::default();

        let first = compute_dashboard_summary(&skus, &orders, &demands, now(), &config);
        let second = compute_dashboard_summary(&skus, &orders, &demands, now(), &config);

        assert_eq!(first, second);
    }
}
