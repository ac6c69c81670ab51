//! ABC 績效分類（柏拉圖分析）

use std::fmt;

use pcp_core::{AggregationConfig, ProductionOrder, Sku};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bucketing::BucketingCalculator;
use crate::percentage;

/// ABC 類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbcCategory {
    /// 高貢獻（累計 ≤ A 門檻）
    A,
    /// 中貢獻（累計 ≤ B 門檻）
    B,
    /// 低貢獻
    C,
}

impl AbcCategory {
    /// 依累計百分比分類，門檻為閉區間
    pub fn classify(cumulative: Decimal, a_threshold: Decimal, b_threshold: Decimal) -> Self {
        if cumulative <= a_threshold {
            AbcCategory::A
        } else if cumulative <= b_threshold {
            AbcCategory::B
        } else {
            AbcCategory::C
        }
    }
}

impl fmt::Display for AbcCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AbcCategory::A => "A",
            AbcCategory::B => "B",
            AbcCategory::C => "C",
        };
        f.write_str(label)
    }
}

/// 單一 SKU 的生產績效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSkuData {
    pub sku_id: Uuid,
    pub sku_code: String,
    pub description: String,

    /// 歷史累計交付數量
    pub total_produced: u64,

    /// 佔總產量百分比
    pub percentage_of_total: Decimal,

    /// 依排名累計的百分比
    pub cumulative_percentage: Decimal,

    pub abc_category: AbcCategory,
}

/// 各類別統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbcSummary {
    pub a_count: usize,
    pub b_count: usize,
    pub c_count: usize,
    pub a_units: u64,
    pub b_units: u64,
    pub c_units: u64,
}

impl AbcSummary {
    /// 從分類結果彙總
    pub fn from_ranking(ranking: &[PerformanceSkuData]) -> Self {
        let mut summary = Self::default();
        for row in ranking {
            match row.abc_category {
                AbcCategory::A => {
                    summary.a_count += 1;
                    summary.a_units += row.total_produced;
                }
                AbcCategory::B => {
                    summary.b_count += 1;
                    summary.b_units += row.total_produced;
                }
                AbcCategory::C => {
                    summary.c_count += 1;
                    summary.c_units += row.total_produced;
                }
            }
        }
        summary
    }

    pub fn total_units(&self) -> u64 {
        self.a_units + self.b_units + self.c_units
    }
}

/// 計算 ABC 分類
///
/// 1. 彙總每個 SKU 所有已完成訂單的交付數量，去除產量為 0 的 SKU
/// 2. 依產量降序排列（同量依 SKU 代碼、再依 ID）
/// 3. 依累計件數換算累計百分比並依門檻分類
pub fn compute_abc_classification(
    skus: &[Sku],
    orders: &[ProductionOrder],
    config: &AggregationConfig,
) -> Vec<PerformanceSkuData> {
    tracing::info!(
        "開始 ABC 分類：SKU {} 筆，訂單 {} 筆",
        skus.len(),
        orders.len()
    );

    let totals = BucketingCalculator::delivered_by_sku(orders);

    let mut produced: Vec<(&Sku, u64)> = skus
        .iter()
        .filter_map(|sku| {
            let total = totals.get(&sku.id).copied().unwrap_or(0);
            (total > 0).then_some((sku, total))
        })
        .collect();

    produced.sort_by(|(sku_a, total_a), (sku_b, total_b)| {
        total_b
            .cmp(total_a)
            .then_with(|| sku_a.code.cmp(&sku_b.code))
            .then_with(|| sku_a.id.cmp(&sku_b.id))
    });

    let overall: u64 = produced.iter().map(|(_, total)| total).sum();
    tracing::debug!("有產量 SKU: {}，總產量: {}", produced.len(), overall);

    if overall == 0 {
        tracing::info!("無任何完成產量，ABC 分類為空");
        return Vec::new();
    }

    // 累計百分比 = 累計件數 / 總產量，不累加已捨入的佔比
    let mut running_units: u64 = 0;
    let ranking: Vec<PerformanceSkuData> = produced
        .into_iter()
        .map(|(sku, total)| {
            let percentage_of_total = percentage(total, overall);
            running_units += total;
            let cumulative = percentage(running_units, overall);

            PerformanceSkuData {
                sku_id: sku.id,
                sku_code: sku.code.clone(),
                description: sku.description.clone(),
                total_produced: total,
                percentage_of_total,
                cumulative_percentage: cumulative,
                abc_category: AbcCategory::classify(
                    cumulative,
                    config.abc_a_threshold,
                    config.abc_b_threshold,
                ),
            }
        })
        .collect();

    tracing::info!("ABC 分類完成，共 {} 筆", ranking.len());
    ranking
}
