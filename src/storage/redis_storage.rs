use crate::model::AnalysisRecord;
use crate::storage::AnalysisStore;
use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

/// Stores each record as a JSON string plus an id set for listing.
pub struct RedisAnalysisStore {
    client: redis::Client,
    prefix: String,
}

impl RedisAnalysisStore {
    pub fn new(client: redis::Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    fn record_key(&self, id: Uuid) -> String {
        format!("{}:analysis:{}", self.prefix, id)
    }

    fn index_key(&self) -> String {
        format!("{}:analyses", self.prefix)
    }
}

#[async_trait]
impl AnalysisStore for RedisAnalysisStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(record)?;
        let _: () = conn.set(self.record_key(record.id), serialized).await?;
        let _: () = conn.sadd(self.index_key(), record.id.to_string()).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AnalysisRecord>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.record_key(id)).await?;

        match raw {
            Some(json) => {
                let record = serde_json::from_str(&json)
                    .with_context(|| format!("Corrupt analysis record {}", id))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn list_ids(&self) -> Result<Vec<Uuid>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let members: Vec<String> = conn.smembers(self.index_key()).await?;
        // Skip foreign entries rather than failing the whole listing
        Ok(members.iter().filter_map(|m| Uuid::parse_str(m).ok()).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let removed: usize = conn.del(self.record_key(id)).await?;
        let _: () = conn.srem(self.index_key(), id.to_string()).await?;
        Ok(removed > 0)
    }
}
