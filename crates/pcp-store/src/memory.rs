//! 記憶體儲存實作

use std::collections::HashMap;

use parking_lot::RwLock;
use pcp_core::Result;
use uuid::Uuid;

use crate::repository::{Entity, Repository};

/// 以 `RwLock<HashMap>` 保存的集合
#[derive(Debug)]
pub struct MemoryRepository<T> {
    records: RwLock<HashMap<Uuid, T>>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// 以既有記錄初始化
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id(), r)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn list(&self) -> Result<Vec<T>> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn get(&self, id: &Uuid) -> Result<Option<T>> {
        Ok(self.records.read().get(id).cloned())
    }

    fn put(&self, entity: T) -> Result<()> {
        self.records.write().insert(entity.id(), entity);
        Ok(())
    }

    fn delete(&self, id: &Uuid) -> Result<bool> {
        Ok(self.records.write().remove(id).is_some())
    }
}
