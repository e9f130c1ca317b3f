use std::fmt;

/// Kind of chat a message originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    /// Maps a platform chat-type string; unknown strings degrade to `Private`.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "group" => ChatKind::Group,
            "supergroup" => ChatKind::Supergroup,
            "channel" => ChatKind::Channel,
            _ => ChatKind::Private,
        }
    }

    /// Whether admin rights are meaningful in this kind of chat.
    pub fn is_multi_party(&self) -> bool {
        !matches!(self, ChatKind::Private)
    }
}

/// Represents a chat, as resolved from the platform
#[derive(Debug, Clone)]
pub struct Chat {
    pub id: String,
    pub kind: ChatKind,
    pub title: Option<String>,
    pub username: Option<String>,
}

impl Chat {
    pub fn new(id: impl Into<String>, kind: ChatKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            username: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn display_name(&self) -> String {
        if let Some(ref title) = self.title {
            title.clone()
        } else if let Some(ref username) = self.username {
            username.clone()
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for Chat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
