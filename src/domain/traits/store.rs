use async_trait::async_trait;
use crate::application::errors::StorageError;

/// Store trait - abstraction for data persistence
#[async_trait]
pub trait Store: Send + Sync {
    // Key-value operations
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    // Tag operations, scoped per chat
    async fn tag_get(&self, chat_id: &str, name: &str) -> Result<Option<String>, StorageError>;
    async fn tag_set(&self, chat_id: &str, name: &str, value: &str) -> Result<(), StorageError>;
    async fn tag_delete(&self, chat_id: &str, name: &str) -> Result<(), StorageError>;
    async fn tags(&self, chat_id: &str) -> Result<Vec<(String, String)>, StorageError>;
}
