pub mod redis_storage;

use crate::model::AnalysisRecord;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

// --- Interface ---

/// Persistence boundary for finished analyses.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save(&self, record: &AnalysisRecord) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<AnalysisRecord>>;
    /// Ids of every stored record. Order is not significant.
    async fn list_ids(&self) -> Result<Vec<Uuid>>;
    /// Returns `true` if a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

// --- In-Memory Implementation ---

#[derive(Default)]
pub struct InMemoryAnalysisStore {
    records: DashMap<Uuid, AnalysisRecord>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AnalysisRecord>> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn list_ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.records.iter().map(|r| *r.key()).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.records.remove(&id).is_some())
    }
}
