//! Repository trait 定義

use pcp_core::{Demand, ProductionOrder, Result, Sku};
use uuid::Uuid;

/// 具有唯一 ID 的儲存實體
pub trait Entity: Clone + Send + Sync + 'static {
    /// 實體名稱（錯誤訊息用）
    const NAME: &'static str;

    fn id(&self) -> Uuid;
}

impl Entity for Sku {
    const NAME: &'static str = "SKU";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for ProductionOrder {
    const NAME: &'static str = "生產訂單";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Entity for Demand {
    const NAME: &'static str = "需求";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// 基礎 Repository trait（一個集合，一筆文件一個實體）
pub trait Repository<T: Entity>: Send + Sync {
    /// 列出全部
    fn list(&self) -> Result<Vec<T>>;

    /// 根據 ID 查找
    fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// 新增或覆寫
    fn put(&self, entity: T) -> Result<()>;

    /// 刪除，返回是否存在
    fn delete(&self, id: &Uuid) -> Result<bool>;
}

/// SKU 集合
pub trait SkuRepository: Repository<Sku> {}
impl<R: Repository<Sku> + ?Sized> SkuRepository for R {}

/// 生產訂單集合
pub trait ProductionOrderRepository: Repository<ProductionOrder> {}
impl<R: Repository<ProductionOrder> + ?Sized> ProductionOrderRepository for R {}

/// 需求集合
pub trait DemandRepository: Repository<Demand> {}
impl<R: Repository<Demand> + ?Sized> DemandRepository for R {}
