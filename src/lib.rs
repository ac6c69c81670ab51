//! # PCP
//!
//! 生產控制應用核心：SKU、生產訂單與月度需求的管理，
//! 以及需求進度、ABC 分類與儀表板彙總。

pub mod settings;
pub mod telemetry;

use chrono::{DateTime, Utc};
use tracing::info;

pub use pcp_calc::{
    compute_abc_classification, compute_dashboard_summary, compute_demand_progress, AbcCategory,
    AbcSummary, DashboardSummary, DemandWithProgress, MonthlyProduction, PerformanceSkuData,
    StatusCount,
};
pub use pcp_core::{
    AggregationConfig, Demand, MonthKey, OrderStatus, PcpError, ProductionOrder, Result, Sku,
    SkuCatalog, ValidationErrors, UNKNOWN_SKU_LABEL,
};
pub use pcp_store::{
    BulkDeleteReport, DemandInput, DemandService, OrderRow, OrderService, ProductionOrderInput,
    Repositories, SkuInput, SkuService, Snapshot,
};
pub use settings::Settings;

/// 生產控制服務：寫入服務與三個彙總報表的入口
#[derive(Debug, Clone)]
pub struct PlanningService {
    repos: Repositories,
    config: AggregationConfig,
    skus: SkuService,
    orders: OrderService,
    demands: DemandService,
}

impl PlanningService {
    pub fn new(repos: Repositories, config: AggregationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            skus: SkuService::new(repos.clone()),
            orders: OrderService::new(repos.clone()),
            demands: DemandService::new(repos.clone()),
            repos,
            config,
        })
    }

    /// 以空的記憶體儲存建立
    pub fn in_memory(config: AggregationConfig) -> Result<Self> {
        Self::new(Repositories::in_memory(), config)
    }

    pub fn from_settings(repos: Repositories, settings: &Settings) -> Result<Self> {
        Self::new(repos, settings.aggregation.clone())
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    pub fn skus(&self) -> &SkuService {
        &self.skus
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn demands(&self) -> &DemandService {
        &self.demands
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Snapshot::fetch(&self.repos)
    }

    /// 需求進度列表（月份新到舊、SKU 代碼升序）
    pub fn demand_progress(&self) -> Result<Vec<DemandWithProgress>> {
        let snapshot = self.snapshot()?;
        let completed = snapshot.completed_orders();
        Ok(compute_demand_progress(
            &snapshot.catalog(),
            &snapshot.demands,
            &completed,
            &self.config,
        ))
    }

    /// ABC 分類排名
    pub fn abc_classification(&self) -> Result<Vec<PerformanceSkuData>> {
        let snapshot = self.snapshot()?;
        Ok(compute_abc_classification(
            &snapshot.skus,
            &snapshot.orders,
            &self.config,
        ))
    }

    /// 儀表板彙總（以 `now` 為視窗終點）
    pub fn dashboard(&self, now: DateTime<Utc>) -> Result<DashboardSummary> {
        let snapshot = self.snapshot()?;
        let summary = compute_dashboard_summary(
            &snapshot.skus,
            &snapshot.orders,
            &snapshot.demands,
            now,
            &self.config,
        );
        info!(
            "儀表板: {} 個 SKU, {} 筆緊急需求",
            summary.total_skus, summary.critical_demands
        );
        Ok(summary)
    }
}
