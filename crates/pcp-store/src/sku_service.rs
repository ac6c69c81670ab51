//! SKU 主檔寫入服務

use chrono::Utc;
use pcp_core::{PcpError, Result, Sku};
use tracing::{info, warn};
use uuid::Uuid;

use crate::input::SkuInput;
use crate::repository::{Entity, Repository};
use crate::{BulkDeleteReport, Repositories};

/// SKU 服務
#[derive(Debug, Clone)]
pub struct SkuService {
    repos: Repositories,
}

impl SkuService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// 列出全部 SKU（建立時間新到舊）
    pub fn list(&self) -> Result<Vec<Sku>> {
        let mut skus = self.repos.skus.list()?;
        skus.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.code.cmp(&b.code)));
        Ok(skus)
    }

    pub fn get(&self, id: &Uuid) -> Result<Sku> {
        self.repos
            .skus
            .get(id)?
            .ok_or_else(|| PcpError::not_found(Sku::NAME, id))
    }

    /// 新增 SKU，代碼不分大小寫唯一
    pub fn create(&self, input: &SkuInput) -> Result<Sku> {
        let valid = input.validate()?;
        let _guard = self.repos.write_guard();
        self.ensure_code_available(&valid.code, None)?;

        let sku = Sku::new(valid.code, valid.description, valid.unit_of_measure);
        self.repos.skus.put(sku.clone())?;

        info!("新增 SKU {} ({})", sku.code, sku.id);
        Ok(sku)
    }

    pub fn update(&self, id: &Uuid, input: &SkuInput) -> Result<Sku> {
        let valid = input.validate()?;
        let _guard = self.repos.write_guard();
        let mut sku = self.get(id)?;
        self.ensure_code_available(&valid.code, Some(id))?;

        sku.code = valid.code;
        sku.description = valid.description;
        sku.unit_of_measure = valid.unit_of_measure;
        sku.updated_at = Utc::now();
        self.repos.skus.put(sku.clone())?;

        info!("更新 SKU {} ({})", sku.code, sku.id);
        Ok(sku)
    }

    /// 刪除 SKU，仍被訂單或需求引用時拒絕
    pub fn delete(&self, id: &Uuid) -> Result<()> {
        let _guard = self.repos.write_guard();
        let sku = self.get(id)?;
        if self.is_referenced(id)? {
            return Err(PcpError::SkuInUse(sku.code));
        }

        self.repos.skus.delete(id)?;
        info!("刪除 SKU {} ({})", sku.code, sku.id);
        Ok(())
    }

    /// 批量刪除，被引用的 SKU 會被略過
    pub fn delete_many(&self, ids: &[Uuid]) -> Result<BulkDeleteReport> {
        let mut report = BulkDeleteReport::default();

        for id in ids {
            match self.delete(id) {
                Ok(()) => report.deleted += 1,
                Err(PcpError::SkuInUse(_)) => report.blocked += 1,
                Err(PcpError::NotFound { .. }) => report.not_found += 1,
                Err(e) => return Err(e),
            }
        }

        if !report.is_clean() {
            warn!(
                "批量刪除 SKU: 成功 {}, 使用中 {}, 不存在 {}",
                report.deleted, report.blocked, report.not_found
            );
        }

        Ok(report)
    }

    fn ensure_code_available(&self, code: &str, exclude: Option<&Uuid>) -> Result<()> {
        let taken = self
            .repos
            .skus
            .list()?
            .iter()
            .any(|s| Some(&s.id) != exclude && s.code_matches(code));

        if taken {
            return Err(PcpError::DuplicateSkuCode(code.to_string()));
        }
        Ok(())
    }

    fn is_referenced(&self, id: &Uuid) -> Result<bool> {
        let in_orders = self.repos.orders.list()?.iter().any(|o| o.sku_id == *id);
        if in_orders {
            return Ok(true);
        }
        Ok(self.repos.demands.list()?.iter().any(|d| d.sku_id == *id))
    }
}
