//! # PCP Store
//!
//! 儲存層與寫入服務：
//! - Repository trait 與記憶體實作
//! - 寫入邊界的表單驗證
//! - SKU / 生產訂單 / 需求的寫入服務
//! - 平行讀取快照供聚合計算使用

pub mod demand_service;
pub mod input;
pub mod memory;
pub mod order_service;
pub mod repository;
pub mod sku_service;
pub mod snapshot;

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use pcp_core::{Demand, ProductionOrder, Sku};
use serde::{Deserialize, Serialize};

pub use demand_service::DemandService;
pub use input::{DemandInput, ProductionOrderInput, SkuInput};
pub use memory::MemoryRepository;
pub use order_service::{OrderRow, OrderService};
pub use repository::{DemandRepository, Entity, ProductionOrderRepository, Repository, SkuRepository};
pub use sku_service::SkuService;
pub use snapshot::Snapshot;

/// 三個集合的共享句柄
#[derive(Clone)]
pub struct Repositories {
    pub skus: Arc<dyn SkuRepository>,
    pub orders: Arc<dyn ProductionOrderRepository>,
    pub demands: Arc<dyn DemandRepository>,
    /// 串行化「檢查後寫入」的操作（唯一性、引用檢查）
    write_lock: Arc<Mutex<()>>,
}

impl Repositories {
    pub fn new(
        skus: Arc<dyn SkuRepository>,
        orders: Arc<dyn ProductionOrderRepository>,
        demands: Arc<dyn DemandRepository>,
    ) -> Self {
        Self {
            skus,
            orders,
            demands,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 取得寫入鎖，持有期間其他服務的寫入會等待
    ///
    /// 所有 clone 共用同一把鎖。不可重入。
    pub(crate) fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    /// 空的記憶體儲存
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRepository::<Sku>::new()),
            Arc::new(MemoryRepository::<ProductionOrder>::new()),
            Arc::new(MemoryRepository::<Demand>::new()),
        )
    }

    /// 以既有記錄建立記憶體儲存
    pub fn seeded(skus: Vec<Sku>, orders: Vec<ProductionOrder>, demands: Vec<Demand>) -> Self {
        Self::new(
            Arc::new(MemoryRepository::with_records(skus)),
            Arc::new(MemoryRepository::with_records(orders)),
            Arc::new(MemoryRepository::with_records(demands)),
        )
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// 批量刪除結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteReport {
    pub deleted: usize,
    /// 因被引用或進行中而略過
    pub blocked: usize,
    pub not_found: usize,
}

impl BulkDeleteReport {
    /// 是否全部刪除成功
    pub fn is_clean(&self) -> bool {
        self.blocked == 0 && self.not_found == 0
    }

    pub fn requested(&self) -> usize {
        self.deleted + self.blocked + self.not_found
    }
}
