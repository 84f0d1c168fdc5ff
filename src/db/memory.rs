use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{
    db::{Collection, DocumentPath, DocumentStore},
    error::AppResult,
};

/// In-process document store, used for tests and local runs without Redis
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<String, Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Value>> {
        Ok(self.documents.read().await.get(&path.to_string()).cloned())
    }

    async fn set(&self, path: &DocumentPath, document: Value) -> AppResult<()> {
        self.documents
            .write()
            .await
            .insert(path.to_string(), document);
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> AppResult<bool> {
        Ok(self
            .documents
            .write()
            .await
            .remove(&path.to_string())
            .is_some())
    }

    async fn list(&self, collection: &Collection) -> AppResult<Vec<Value>> {
        let prefix = collection.to_string();
        let documents = self.documents.read().await;
        Ok(documents
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, value)| value.clone())
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
