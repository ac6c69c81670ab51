//! # PCP Calculation Engine
//!
//! 生產彙總計算：需求進度、ABC 分類、儀表板摘要
//!
//! 所有計算皆為純函數，只讀取輸入集合，不修改來源記錄。

pub mod abc;
pub mod bucketing;
pub mod dashboard;
pub mod progress;

use rust_decimal::Decimal;

// Re-export 主要類型
pub use abc::{compute_abc_classification, AbcCategory, AbcSummary, PerformanceSkuData};
pub use bucketing::BucketingCalculator;
pub use dashboard::{compute_dashboard_summary, DashboardSummary, MonthlyProduction, StatusCount};
pub use progress::{compute_demand_progress, DemandWithProgress};

/// 百分比 `part / whole * 100`，`whole` 為 0 時返回 0
pub(crate) fn percentage(part: u64, whole: u64) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(145, 250), Decimal::from(58));
        assert_eq!(percentage(800, 1000), Decimal::from(80));
        assert_eq!(percentage(10, 0), Decimal::ZERO);
        assert_eq!(percentage(300, 200), Decimal::from(150));
    }
}
