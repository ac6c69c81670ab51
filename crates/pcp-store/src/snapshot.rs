//! 聚合用的一致讀取快照

use pcp_core::{Demand, ProductionOrder, Result, Sku, SkuCatalog};
use tracing::debug;

use crate::repository::Repository;
use crate::Repositories;

/// 三個集合的同時讀取結果
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub skus: Vec<Sku>,
    pub orders: Vec<ProductionOrder>,
    pub demands: Vec<Demand>,
}

impl Snapshot {
    /// 平行讀取全部集合
    pub fn fetch(repos: &Repositories) -> Result<Self> {
        let (skus, (orders, demands)) = rayon::join(
            || repos.skus.list(),
            || rayon::join(|| repos.orders.list(), || repos.demands.list()),
        );

        let snapshot = Self {
            skus: skus?,
            orders: orders?,
            demands: demands?,
        };

        debug!(
            "讀取快照: {} 個 SKU, {} 張訂單, {} 筆需求",
            snapshot.skus.len(),
            snapshot.orders.len(),
            snapshot.demands.len()
        );

        Ok(snapshot)
    }

    pub fn catalog(&self) -> SkuCatalog {
        SkuCatalog::new(&self.skus)
    }

    /// 僅已完成的訂單
    pub fn completed_orders(&self) -> Vec<ProductionOrder> {
        self.orders
            .iter()
            .filter(|o| o.is_completed())
            .cloned()
            .collect()
    }
}
