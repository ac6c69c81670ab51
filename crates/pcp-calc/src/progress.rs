//! 需求進度計算

use std::cmp::Ordering;
use std::collections::HashMap;

use pcp_core::{AggregationConfig, Demand, MonthKey, ProductionOrder, SkuCatalog};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bucketing::BucketingCalculator;
use crate::percentage;

/// 需求及其完成進度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandWithProgress {
    #[serde(flatten)]
    pub demand: Demand,

    /// SKU 代碼（讀取時關聯；SKU 已刪除時為 `UNKNOWN_SKU_LABEL`）
    pub sku_code: String,

    /// 當月已交付數量
    pub produced_quantity: u64,

    /// 完成百分比（0–100）
    pub progress_percentage: Decimal,
}

impl DemandWithProgress {
    /// 目標是否已達成
    pub fn is_fulfilled(&self) -> bool {
        self.produced_quantity >= self.demand.target_quantity
    }
}

/// 計算每筆需求的完成進度
///
/// 只計入狀態為 completed、SKU 相同、完成時間（依配置時區）落在需求月份的訂單。
/// 結果按月份由新到舊，再按 SKU 代碼排序。
pub fn compute_demand_progress(
    catalog: &SkuCatalog,
    demands: &[Demand],
    orders: &[ProductionOrder],
    config: &AggregationConfig,
) -> Vec<DemandWithProgress> {
    tracing::info!(
        "開始需求進度計算：需求 {} 筆，訂單 {} 筆",
        demands.len(),
        orders.len()
    );

    let delivered = BucketingCalculator::delivered_by_sku_month(orders, config.offset());
    tracing::debug!("完成訂單分桶數量: {}", delivered.len());

    let mut rows: Vec<(Option<MonthKey>, DemandWithProgress)> = demands
        .iter()
        .map(|demand| {
            let month = demand.month_key();
            if month.is_none() {
                tracing::warn!(
                    "需求 {} 的月份格式無效: {:?}，進度以 0 計",
                    demand.id,
                    demand.month_year
                );
            }
            if !catalog.contains(&demand.sku_id) {
                tracing::warn!("需求 {} 引用的 SKU {} 不存在", demand.id, demand.sku_id);
            }
            (month, progress_row(catalog, demand, month, &delivered))
        })
        .collect();

    rows.sort_by(|(month_a, a), (month_b, b)| {
        compare_months_desc(month_a, month_b).then_with(|| a.sku_code.cmp(&b.sku_code))
    });

    tracing::info!("需求進度計算完成，共 {} 筆", rows.len());
    rows.into_iter().map(|(_, row)| row).collect()
}

/// 單筆需求的進度（不排序）
fn progress_row(
    catalog: &SkuCatalog,
    demand: &Demand,
    month: Option<MonthKey>,
    delivered: &HashMap<(Uuid, MonthKey), u64>,
) -> DemandWithProgress {
    let produced_quantity = month
        .and_then(|m| delivered.get(&(demand.sku_id, m)).copied())
        .unwrap_or(0);

    DemandWithProgress {
        demand: demand.clone(),
        sku_code: catalog.code_or_unknown(&demand.sku_id).to_string(),
        produced_quantity,
        progress_percentage: progress_percentage(produced_quantity, demand.target_quantity),
    }
}

/// `clamp(produced / target * 100, 0, 100)`，目標為 0 時返回 0
pub fn progress_percentage(produced: u64, target: u64) -> Decimal {
    if target == 0 {
        return Decimal::ZERO;
    }
    percentage(produced, target).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

// 新月份在前，無效月份排最後
fn compare_months_desc(a: &Option<MonthKey>, b: &Option<MonthKey>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pcp_core::{Sku, UNKNOWN_SKU_LABEL};
    use proptest::prelude::*;
    use rstest::rstest;

    fn sku(code: &str) -> Sku {
        Sku::new(code.to_string(), format!("{} 描述", code), "pc".to_string())
    }

    fn demand(sku: &Sku, month: &str, target: u64) -> Demand {
        Demand::new(sku.id, month.parse().unwrap(), target)
    }

    fn completed_at(
        sku: &Sku,
        delivered: u64,
        end: chrono::DateTime<Utc>,
    ) -> ProductionOrder {
        let mut order = ProductionOrder::new(sku.id, delivered.max(1));
        order.start(end - chrono::Duration::hours(1)).unwrap();
        order.complete(delivered, end).unwrap();
        order
    }

    fn completed(sku: &Sku, delivered: u64, y: i32, m: u32, d: u32) -> ProductionOrder {
        completed_at(sku, delivered, Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_progress_sums_matching_month() {
        let panel = sku("PNL-001");
        let catalog = SkuCatalog::new(&[panel.clone()]);
        let demands = vec![demand(&panel, "2024-07", 250)];
        let orders = vec![
            completed(&panel, 95, 2024, 7, 10),
            completed(&panel, 50, 2024, 7, 20),
            completed(&panel, 70, 2024, 6, 30),
        ];

        let result =
            compute_demand_progress(&catalog, &demands, &orders, &AggregationConfig::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sku_code, "PNL-001");
        assert_eq!(result[0].produced_quantity, 145);
        assert_eq!(result[0].progress_percentage, Decimal::from(58));
        assert!(!result[0].is_fulfilled());
    }

    #[test]
    fn test_ignores_non_completed_orders() {
        let panel = sku("PNL-001");
        let catalog = SkuCatalog::new(&[panel.clone()]);
        let demands = vec![demand(&panel, "2024-07", 100)];

        let end = Utc.with_ymd_and_hms(2024, 7, 5, 12, 0, 0).unwrap();
        let mut cancelled = ProductionOrder::new(panel.id, 40);
        cancelled.start(end).unwrap();
        cancelled.cancel(end).unwrap();
        let mut in_progress = ProductionOrder::new(panel.id, 40);
        in_progress.start(end).unwrap();

        let orders = vec![cancelled, in_progress, ProductionOrder::new(panel.id, 40)];
        let result =
            compute_demand_progress(&catalog, &demands, &orders, &AggregationConfig::default());

        assert_eq!(result[0].produced_quantity, 0);
        assert_eq!(result[0].progress_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_overproduction_is_clamped() {
        let panel = sku("PNL-001");
        let catalog = SkuCatalog::new(&[panel.clone()]);
        let demands = vec![demand(&panel, "2024-07", 100)];
        let orders = vec![completed(&panel, 150, 2024, 7, 10)];

        let result =
            compute_demand_progress(&catalog, &demands, &orders, &AggregationConfig::default());

        assert_eq!(result[0].produced_quantity, 150);
        assert_eq!(result[0].progress_percentage, Decimal::ONE_HUNDRED);
        assert!(result[0].is_fulfilled());
    }

    #[test]
    fn test_zero_target_yields_zero_progress() {
        let panel = sku("PNL-001");
        let catalog = SkuCatalog::new(&[panel.clone()]);
        let demands = vec![demand(&panel, "2024-07", 0)];
        let orders = vec![completed(&panel, 10, 2024, 7, 10)];

        let result =
            compute_demand_progress(&catalog, &demands, &orders, &AggregationConfig::default());

        assert_eq!(result[0].produced_quantity, 10);
        assert_eq!(result[0].progress_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_deleted_sku_uses_sentinel() {
        let ghost = sku("GHOST-1");
        let catalog = SkuCatalog::default();
        let demands = vec![demand(&ghost, "2024-07", 10)];
        let orders = vec![completed(&ghost, 5, 2024, 7, 10)];

        let result =
            compute_demand_progress(&catalog, &demands, &orders, &AggregationConfig::default());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sku_code, UNKNOWN_SKU_LABEL);
        assert_eq!(result[0].produced_quantity, 5);
        assert_eq!(result[0].progress_percentage, Decimal::from(50));
    }

    #[test]
    fn test_malformed_month_kept_last() {
        let panel = sku("PNL-001");
        let catalog = SkuCatalog::new(&[panel.clone()]);
        let mut broken = demand(&panel, "2024-07", 10);
        broken.month_year = "julho/2024".to_string();
        let demands = vec![broken, demand(&panel, "2023-01", 10)];
        let orders = vec![completed(&panel, 10, 2024, 7, 10)];

        let result =
            compute_demand_progress(&catalog, &demands, &orders, &AggregationConfig::default());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].demand.month_year, "2023-01");
        assert_eq!(result[1].demand.month_year, "julho/2024");
        assert_eq!(result[1].produced_quantity, 0);
        assert_eq!(result[1].progress_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_sorted_by_month_desc_then_code() {
        let a = sku("AAA");
        let b = sku("BBB");
        let c = sku("CCC");
        let catalog = SkuCatalog::new(&[a.clone(), b.clone(), c.clone()]);
        let demands = vec![
            demand(&c, "2024-06", 10),
            demand(&b, "2024-07", 10),
            demand(&a, "2024-06", 10),
            demand(&a, "2024-07", 10),
            demand(&c, "2025-01", 10),
        ];

        let result = compute_demand_progress(&catalog, &demands, &[], &AggregationConfig::default());
        let keys: Vec<(String, String)> = result
            .iter()
            .map(|r| (r.demand.month_year.clone(), r.sku_code.clone()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("2025-01".to_string(), "CCC".to_string()),
                ("2024-07".to_string(), "AAA".to_string()),
                ("2024-07".to_string(), "BBB".to_string()),
                ("2024-06".to_string(), "AAA".to_string()),
                ("2024-06".to_string(), "CCC".to_string()),
            ]
        );
    }

    #[rstest]
    // UTC 2024-07-31 22:00：UTC 仍為 7 月，UTC+3 已是 8 月
    #[case(0, 145, 0)]
    #[case(180, 95, 50)]
    // UTC-3 時為 7/31 19:00，仍屬 7 月
    #[case(-180, 145, 0)]
    fn test_month_boundary_follows_offset(
        #[case] offset_minutes: i32,
        #[case] july: u64,
        #[case] august: u64,
    ) {
        let panel = sku("PNL-001");
        let catalog = SkuCatalog::new(&[panel.clone()]);
        let demands = vec![demand(&panel, "2024-07", 250), demand(&panel, "2024-08", 250)];
        let orders = vec![
            completed(&panel, 95, 2024, 7, 10),
            completed_at(&panel, 50, Utc.with_ymd_and_hms(2024, 7, 31, 22, 0, 0).unwrap()),
        ];
        let config = AggregationConfig::new().with_utc_offset_minutes(offset_minutes);

        let result = compute_demand_progress(&catalog, &demands, &orders, &config);

        assert_eq!(result[0].demand.month_year, "2024-08");
        assert_eq!(result[0].produced_quantity, august);
        assert_eq!(result[1].demand.month_year, "2024-07");
        assert_eq!(result[1].produced_quantity, july);
    }

    #[test]
    fn test_idempotent() {
        let panel = sku("PNL-001");
        let catalog = SkuCatalog::new(&[panel.clone()]);
        let demands = vec![demand(&panel, "2024-07", 250), demand(&panel, "2024-08", 30)];
        let orders = vec![completed(&panel, 95, 2024, 7, 10), completed(&panel, 7, 2024, 8, 2)];
        let config = AggregationConfig::default();

        let first = compute_demand_progress(&catalog, &demands, &orders, &config);
        let second = compute_demand_progress(&catalog, &demands, &orders, &config);

        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_progress_is_clamped_ratio(produced in 0u64..1_000_000, target in 1u64..1_000_000) {
            let expected = (Decimal::from(produced) * Decimal::ONE_HUNDRED / Decimal::from(target))
                .min(Decimal::ONE_HUNDRED)
                .max(Decimal::ZERO);
            let actual = progress_percentage(produced, target);

            prop_assert_eq!(actual, expected);
            prop_assert!(actual >= Decimal::ZERO && actual <= Decimal::ONE_HUNDRED);
        }

        #[test]
        fn prop_zero_target_never_divides(produced in 0u64..u64::MAX) {
            prop_assert_eq!(progress_percentage(produced, 0), Decimal::ZERO);
        }
    }
}
