use crate::application::errors::BotError;
use crate::domain::entities::{Chat, Participant, User};
use async_trait::async_trait;

/// ChatClient trait - abstraction for the shared platform connection
///
/// One instance is shared by every concurrently dispatching handler;
/// implementations must tolerate concurrent calls. Flood control is
/// surfaced as [`BotError::FloodWait`] carrying the platform's suggested
/// wait duration.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// The bot account's own identity.
    async fn me(&self) -> Result<User, BotError>;

    /// Resolve a chat by id. Always a live lookup, never served from a cache.
    async fn get_chat(&self, chat_id: &str) -> Result<Chat, BotError>;

    /// A user's current participant status in a chat.
    async fn get_participant(&self, chat_id: &str, user_id: &str)
        -> Result<Participant, BotError>;

    /// Every participant of a chat. Clients without member enumeration
    /// return [`BotError::Unsupported`].
    async fn participants(&self, chat_id: &str) -> Result<Vec<Participant>, BotError>;

    /// Send a message, returning the id the platform assigned it.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError>;

    /// Edit a previously sent message in place.
    async fn edit_message(&self, chat_id: &str, message_id: &str, text: &str)
        -> Result<(), BotError>;

    /// Delete a message.
    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), BotError>;

    /// Ban a participant from a chat.
    async fn ban(&self, chat_id: &str, user_id: &str) -> Result<(), BotError>;
}
