//! 生產訂單寫入服務

use chrono::{DateTime, Utc};
use pcp_core::{OrderStatus, PcpError, ProductionOrder, Result, SkuCatalog, ValidationErrors};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::input::{ProductionOrderInput, ValidOrder};
use crate::repository::{Entity, Repository};
use crate::{BulkDeleteReport, Repositories};

/// 訂單列表列（附 SKU 代碼）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    #[serde(flatten)]
    pub order: ProductionOrder,
    pub sku_code: String,
}

/// 生產訂單服務
#[derive(Debug, Clone)]
pub struct OrderService {
    repos: Repositories,
}

impl OrderService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// 列出全部訂單（建立時間新到舊），已刪除的 SKU 以標示文字代替
    pub fn list(&self) -> Result<Vec<OrderRow>> {
        let catalog: SkuCatalog = self.repos.skus.list()?.into_iter().collect();
        let mut orders = self.repos.orders.list()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(orders
            .into_iter()
            .map(|order| OrderRow {
                sku_code: catalog.code_or_unknown(&order.sku_id).to_string(),
                order,
            })
            .collect())
    }

    pub fn get(&self, id: &Uuid) -> Result<ProductionOrder> {
        self.repos
            .orders
            .get(id)?
            .ok_or_else(|| PcpError::not_found(ProductionOrder::NAME, id))
    }

    /// 建立訂單（狀態為 open）
    pub fn create(&self, input: &ProductionOrderInput) -> Result<ProductionOrder> {
        let valid = input.validate()?;
        let _guard = self.repos.write_guard();
        self.ensure_sku_exists(&valid)?;

        let mut order = ProductionOrder::new(valid.sku_id, valid.quantity);
        if let Some(notes) = valid.notes {
            order = order.with_notes(notes);
        }
        self.repos.orders.put(order.clone())?;

        info!("建立生產訂單 {}: 數量 {}", order.id, order.quantity);
        Ok(order)
    }

    /// 更新訂單
    ///
    /// open 狀態可修改 SKU、數量與備註；其他狀態只能修改備註。
    /// 非 open 訂單若要求變更 SKU 或數量而備註未變，返回 `OrderLocked`。
    pub fn update(&self, id: &Uuid, input: &ProductionOrderInput) -> Result<ProductionOrder> {
        let valid = input.validate()?;
        let _guard = self.repos.write_guard();
        let mut order = self.get(id)?;
        let now = Utc::now();

        if order.status == OrderStatus::Open {
            self.ensure_sku_exists(&valid)?;
            order.sku_id = valid.sku_id;
            order.quantity = valid.quantity;
            if let Some(notes) = valid.notes {
                order.notes = notes;
            }
        } else {
            let wants_core_change =
                valid.sku_id != order.sku_id || valid.quantity != order.quantity;
            let notes_changed = valid
                .notes
                .as_ref()
                .is_some_and(|notes| *notes != order.notes);

            if wants_core_change && !notes_changed {
                return Err(PcpError::OrderLocked(order.id.to_string()));
            }
            if wants_core_change {
                warn!("訂單 {} 狀態為 {}，僅更新備註", order.id, order.status);
            }
            if let Some(notes) = valid.notes {
                order.notes = notes;
            }
        }

        order.updated_at = now;
        self.repos.orders.put(order.clone())?;

        info!("更新生產訂單 {}", order.id);
        Ok(order)
    }

    /// 開始生產（需為 open）
    pub fn start(&self, id: &Uuid, now: DateTime<Utc>) -> Result<ProductionOrder> {
        let _guard = self.repos.write_guard();
        let mut order = self.get(id)?;
        order.start(now)?;
        self.repos.orders.put(order.clone())?;

        info!("訂單 {} 開始生產", order.id);
        Ok(order)
    }

    /// 完成生產（需為 in_progress），交付數量不可為負
    pub fn complete(
        &self,
        id: &Uuid,
        delivered_quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<ProductionOrder> {
        if delivered_quantity < 0 {
            let mut errors = ValidationErrors::new();
            errors.add("delivered_quantity", "交付數量不可為負數");
            return Err(PcpError::Validation(errors));
        }

        let _guard = self.repos.write_guard();
        let mut order = self.get(id)?;
        order.complete(delivered_quantity as u64, now)?;
        self.repos.orders.put(order.clone())?;

        info!(
            "訂單 {} 完成: 交付 {} / 計劃 {}",
            order.id, delivered_quantity, order.quantity
        );
        Ok(order)
    }

    /// 取消訂單（completed 與 cancelled 不可取消）
    pub fn cancel(&self, id: &Uuid, now: DateTime<Utc>) -> Result<ProductionOrder> {
        let _guard = self.repos.write_guard();
        let mut order = self.get(id)?;
        order.cancel(now)?;
        self.repos.orders.put(order.clone())?;

        info!("訂單 {} 已取消", order.id);
        Ok(order)
    }

    /// 刪除訂單，進行中的訂單不可刪除
    pub fn delete(&self, id: &Uuid) -> Result<()> {
        let _guard = self.repos.write_guard();
        let order = self.get(id)?;
        if order.status == OrderStatus::InProgress {
            return Err(PcpError::OrderInProgress(order.id.to_string()));
        }

        self.repos.orders.delete(id)?;
        info!("刪除生產訂單 {}", order.id);
        Ok(())
    }

    /// 批量刪除，進行中的訂單會被略過
    pub fn delete_many(&self, ids: &[Uuid]) -> Result<BulkDeleteReport> {
        let mut report = BulkDeleteReport::default();

        for id in ids {
            match self.delete(id) {
                Ok(()) => report.deleted += 1,
                Err(PcpError::OrderInProgress(_)) => report.blocked += 1,
                Err(PcpError::NotFound { .. }) => report.not_found += 1,
                Err(e) => return Err(e),
            }
        }

        if !report.is_clean() {
            warn!(
                "批量刪除訂單: 成功 {}, 進行中 {}, 不存在 {}",
                report.deleted, report.blocked, report.not_found
            );
        }

        Ok(report)
    }

    fn ensure_sku_exists(&self, valid: &ValidOrder) -> Result<()> {
        if self.repos.skus.get(&valid.sku_id)?.is_none() {
            let mut errors = ValidationErrors::new();
            errors.add("sku_id", "SKU 不存在");
            return Err(PcpError::Validation(errors));
        }
        Ok(())
    }
}
