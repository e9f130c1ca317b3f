//! In-memory storage implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::traits::Store;

/// Volatile store; state is lost when the process exits
pub struct MemoryStore {
    kv: Arc<RwLock<HashMap<String, String>>>,
    tags: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            kv: Arc::new(RwLock::new(HashMap::new())),
            tags: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let kv = self.kv.read().await;
        Ok(kv.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.write().await;
        kv.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.write().await;
        kv.remove(key);
        Ok(())
    }

    async fn tag_get(&self, chat_id: &str, name: &str) -> Result<Option<String>, StorageError> {
        let tags = self.tags.read().await;
        Ok(tags.get(chat_id).and_then(|chat| chat.get(name)).cloned())
    }

    async fn tag_set(&self, chat_id: &str, name: &str, value: &str) -> Result<(), StorageError> {
        let mut tags = self.tags.write().await;
        tags.entry(chat_id.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn tag_delete(&self, chat_id: &str, name: &str) -> Result<(), StorageError> {
        let mut tags = self.tags.write().await;
        if let Some(chat) = tags.get_mut(chat_id) {
            chat.remove(name);
        }
        Ok(())
    }

    async fn tags(&self, chat_id: &str) -> Result<Vec<(String, String)>, StorageError> {
        let tags = self.tags.read().await;
        Ok(tags
            .get(chat_id)
            .map(|chat| chat.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn kv_roundtrip() {
        let store = MemoryStore::new();
        store.set("prefix", ".").await.expect("set");
        assert_eq!(store.get("prefix").await.expect("get"), Some(".".into()));
        store.delete("prefix").await.expect("delete");
        assert_eq!(store.get("prefix").await.expect("get"), None);
    }

    #[tokio::test]
    async fn tags_do_not_leak_across_chats() {
        let store = MemoryStore::new();
        store.tag_set("1", "polls", "off").await.expect("set");
        store.tag_set("2", "polls", "on").await.expect("set");
        assert_eq!(
            store.tag_get("1", "polls").await.expect("get"),
            Some("off".into())
        );
        assert_eq!(
            store.tag_get("2", "polls").await.expect("get"),
            Some("on".into())
        );
        store.tag_delete("1", "polls").await.expect("delete");
        assert_eq!(store.tag_get("1", "polls").await.expect("get"), None);
        assert_eq!(store.tags("2").await.expect("tags").len(), 1);
    }
}
