//! In-memory `StateStore` for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::store::traits::StateStore;

/// Process-local store. State is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &serde_json::Value) -> Result<(), DatabaseError> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DatabaseError> {
        Ok(self.records.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_write_delete() {
        let store = MemoryStore::new();
        assert!(store.read("a").await.unwrap().is_none());

        store.write("a", &serde_json::json!({"x": 1})).await.unwrap();
        assert_eq!(store.read("a").await.unwrap().unwrap()["x"], 1);
        assert_eq!(store.len().await, 1);

        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.is_empty().await);
    }
}
