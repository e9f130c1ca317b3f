use super::{ChatKind, Message, User};

/// Kind of platform update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Message,
    EditedMessage,
    ChatMember,
    Other(String),
}

impl UpdateKind {
    pub fn as_str(&self) -> &str {
        match self {
            UpdateKind::Message => "message",
            UpdateKind::EditedMessage => "edited-message",
            UpdateKind::ChatMember => "chat-member",
            UpdateKind::Other(s) => s,
        }
    }
}

/// One event as delivered by the platform, unmodified
#[derive(Debug, Clone)]
pub struct Update {
    pub id: i64,
    pub kind: UpdateKind,
    pub chat_id: String,
    pub chat_kind: ChatKind,
    pub message: Option<Message>,
    /// True when the bot account itself produced the triggering message.
    pub outgoing: bool,
    pub raw: Option<serde_json::Value>,
}

impl Update {
    pub fn new(id: i64, kind: UpdateKind, chat_id: impl Into<String>, chat_kind: ChatKind) -> Self {
        Self {
            id,
            kind,
            chat_id: chat_id.into(),
            chat_kind,
            message: None,
            outgoing: false,
            raw: None,
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    pub fn with_outgoing(mut self, outgoing: bool) -> Self {
        self.outgoing = outgoing;
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }

    pub fn sender(&self) -> Option<&User> {
        self.message.as_ref().and_then(|m| m.sender.as_ref())
    }

    pub fn is_multi_party(&self) -> bool {
        self.chat_kind.is_multi_party()
    }
}
