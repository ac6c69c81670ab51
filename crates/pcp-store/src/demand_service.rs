//! 月度需求寫入服務

use chrono::Utc;
use pcp_core::{Demand, MonthKey, PcpError, Result, ValidationErrors};
use tracing::info;
use uuid::Uuid;

use crate::input::DemandInput;
use crate::repository::{Entity, Repository};
use crate::{BulkDeleteReport, Repositories};

/// 需求服務
#[derive(Debug, Clone)]
pub struct DemandService {
    repos: Repositories,
}

impl DemandService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// 列出全部需求（建立時間新到舊）
    pub fn list(&self) -> Result<Vec<Demand>> {
        let mut demands = self.repos.demands.list()?;
        demands.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(demands)
    }

    pub fn get(&self, id: &Uuid) -> Result<Demand> {
        self.repos
            .demands
            .get(id)?
            .ok_or_else(|| PcpError::not_found(Demand::NAME, id))
    }

    /// 建立需求，同一 SKU 同一月份只能有一筆
    pub fn create(&self, input: &DemandInput) -> Result<Demand> {
        let valid = input.validate()?;
        let _guard = self.repos.write_guard();
        self.ensure_sku_exists(&valid.sku_id)?;
        self.ensure_slot_free(&valid.sku_id, &valid.month, None)?;

        let demand = Demand::new(valid.sku_id, valid.month, valid.target_quantity);
        self.repos.demands.put(demand.clone())?;

        info!(
            "建立需求 {}: {} 目標 {}",
            demand.id, demand.month_year, demand.target_quantity
        );
        Ok(demand)
    }

    pub fn update(&self, id: &Uuid, input: &DemandInput) -> Result<Demand> {
        let valid = input.validate()?;
        let _guard = self.repos.write_guard();
        let mut demand = self.get(id)?;
        self.ensure_sku_exists(&valid.sku_id)?;
        self.ensure_slot_free(&valid.sku_id, &valid.month, Some(id))?;

        demand.sku_id = valid.sku_id;
        demand.month_year = valid.month.to_string();
        demand.target_quantity = valid.target_quantity;
        demand.updated_at = Utc::now();
        self.repos.demands.put(demand.clone())?;

        info!("更新需求 {}", demand.id);
        Ok(demand)
    }

    pub fn delete(&self, id: &Uuid) -> Result<()> {
        if !self.repos.demands.delete(id)? {
            return Err(PcpError::not_found(Demand::NAME, id));
        }
        info!("刪除需求 {}", id);
        Ok(())
    }

    pub fn delete_many(&self, ids: &[Uuid]) -> Result<BulkDeleteReport> {
        let mut report = BulkDeleteReport::default();
        for id in ids {
            if self.repos.demands.delete(id)? {
                report.deleted += 1;
            } else {
                report.not_found += 1;
            }
        }
        info!("批量刪除需求: 成功 {}, 不存在 {}", report.deleted, report.not_found);
        Ok(report)
    }

    fn ensure_sku_exists(&self, sku_id: &Uuid) -> Result<()> {
        if self.repos.skus.get(sku_id)?.is_none() {
            let mut errors = ValidationErrors::new();
            errors.add("sku_id", "SKU 不存在");
            return Err(PcpError::Validation(errors));
        }
        Ok(())
    }

    fn ensure_slot_free(&self, sku_id: &Uuid, month: &MonthKey, exclude: Option<&Uuid>) -> Result<()> {
        let taken = self
            .repos
            .demands
            .list()?
            .iter()
            .any(|d| Some(&d.id) != exclude && d.is_same_slot(sku_id, month));

        if taken {
            return Err(PcpError::DuplicateDemand {
                sku_id: sku_id.to_string(),
                month_year: month.to_string(),
            });
        }
        Ok(())
    }
}
