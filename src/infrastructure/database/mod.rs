//! SQLite-backed storage implementation

use std::path::Path;

use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::traits::Store;

/// Persistent store over a single SQLite connection
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private in-memory database, used by tests.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn init_tables(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id TEXT NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (chat_id, name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tags_chat ON tags(chat_id)",
        [],
    )?;

    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    async fn tag_get(&self, chat_id: &str, name: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT value FROM tags WHERE chat_id = ?1 AND name = ?2")?;
        let mut rows = stmt.query([chat_id, name])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    async fn tag_set(&self, chat_id: &str, name: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO tags (chat_id, name, value) VALUES (?1, ?2, ?3)",
            [chat_id, name, value],
        )?;
        Ok(())
    }

    async fn tag_delete(&self, chat_id: &str, name: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM tags WHERE chat_id = ?1 AND name = ?2",
            [chat_id, name],
        )?;
        Ok(())
    }

    async fn tags(&self, chat_id: &str) -> Result<Vec<(String, String)>, StorageError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT name, value FROM tags WHERE chat_id = ?1 ORDER BY name")?;
        let rows = stmt.query_map([chat_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut tags = Vec::new();
        for tag in rows {
            tags.push(tag?);
        }
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn kv_roundtrip() {
        let store = SqliteStore::in_memory().expect("opens");
        store.set("owner", "42").await.expect("set");
        assert_eq!(store.get("owner").await.expect("get"), Some("42".into()));
        store.set("owner", "43").await.expect("overwrite");
        assert_eq!(store.get("owner").await.expect("get"), Some("43".into()));
        store.delete("owner").await.expect("delete");
        assert_eq!(store.get("owner").await.expect("get"), None);
    }

    #[tokio::test]
    async fn tags_replace_and_scope_per_chat() {
        let store = SqliteStore::in_memory().expect("opens");
        store.tag_set("1", "polls", "off").await.expect("set");
        store.tag_set("1", "polls", "on").await.expect("replace");
        store.tag_set("2", "greeting", "hi").await.expect("set");

        assert_eq!(
            store.tag_get("1", "polls").await.expect("get"),
            Some("on".into())
        );
        assert_eq!(store.tags("1").await.expect("list").len(), 1);
        assert_eq!(
            store.tags("2").await.expect("list"),
            vec![("greeting".to_string(), "hi".to_string())]
        );

        store.tag_delete("1", "polls").await.expect("delete");
        assert!(store.tags("1").await.expect("list").is_empty());
    }
}
