use super::User;
use chrono::{DateTime, Utc};

/// Represents an incoming or outgoing chat message
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender: Option<User>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Builds a message with a synthetic id, for messages the platform has
    /// not assigned one to yet.
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            sender: None,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Text following the leading command token, trimmed.
    ///
    /// `".tag set greet hi"` yields `"set greet hi"`; a bare command yields
    /// the empty string.
    pub fn args_text(&self) -> &str {
        match self.text.split_once(char::is_whitespace) {
            Some((_, rest)) => rest.trim(),
            None => "",
        }
    }
}
