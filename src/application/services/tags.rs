//! Per-chat tag accessor
//!
//! Tags are small named values attached to a chat, used by handlers to
//! switch behavior per chat. A [`Tags`] handle is created fresh for each
//! dispatch, scoped to the chat the event came from.

use std::sync::Arc;

use crate::application::errors::StorageError;
use crate::domain::traits::Store;

/// Handle onto one chat's tags
#[derive(Clone)]
pub struct Tags {
    store: Arc<dyn Store>,
    chat_id: String,
}

impl Tags {
    pub fn new(store: Arc<dyn Store>, chat_id: impl Into<String>) -> Self {
        Self {
            store,
            chat_id: chat_id.into(),
        }
    }

    pub async fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        self.store.tag_get(&self.chat_id, name).await
    }

    pub async fn set(&self, name: &str, value: &str) -> Result<(), StorageError> {
        self.store.tag_set(&self.chat_id, name, value).await
    }

    pub async fn remove(&self, name: &str) -> Result<(), StorageError> {
        self.store.tag_delete(&self.chat_id, name).await
    }

    pub async fn all(&self) -> Result<Vec<(String, String)>, StorageError> {
        self.store.tags(&self.chat_id).await
    }
}
