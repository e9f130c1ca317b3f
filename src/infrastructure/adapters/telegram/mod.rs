//! Telegram adapter
//!
//! Talks to the Bot API over HTTPS and maps its wire types onto the domain
//! entities. Flood control (HTTP 429 with `retry_after`) surfaces as
//! [`BotError::FloodWait`]; retrying is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::application::errors::BotError;
use crate::domain::entities::{
    Chat, ChatKind, Message, Participant, ParticipantStatus, Update, UpdateKind, User,
};
use crate::domain::traits::ChatClient;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Update kinds requested from getUpdates. `chat_member` is only delivered
/// when asked for explicitly.
const ALLOWED_UPDATES: [&str; 3] = ["message", "edited_message", "chat_member"];

#[derive(Debug, Clone, Deserialize)]
struct WireUpdate {
    update_id: i64,
    message: Option<WireMessage>,
    edited_message: Option<WireMessage>,
    chat_member: Option<WireChatMemberUpdate>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireMessage {
    message_id: i64,
    from: Option<WireUser>,
    chat: WireChat,
    text: Option<String>,
    date: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireUser {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    #[serde(default)]
    is_bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct WireChat {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    title: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireChatMemberUpdate {
    chat: WireChat,
}

#[derive(Debug, Clone, Deserialize)]
struct WireChatMember {
    status: String,
    user: WireUser,
}

/// Response envelope shared by every Bot API method
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    retry_after: Option<i64>,
}

impl WireUser {
    fn into_user(self) -> User {
        // Deleted accounts surface through the Bot API as users with an
        // empty first name and no username.
        let deleted = self.username.is_none()
            && self.first_name.as_deref().map_or(true, |f| f.is_empty());
        User {
            id: self.id.to_string(),
            username: self.username,
            first_name: self.first_name.filter(|f| !f.is_empty()),
            last_name: self.last_name,
            is_bot: self.is_bot,
            deleted,
        }
    }
}

impl WireChat {
    fn into_chat(self) -> Chat {
        let mut chat = Chat::new(self.id.to_string(), ChatKind::parse(&self.kind));
        chat.title = self.title;
        chat.username = self.username;
        chat
    }
}

/// Telegram client adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    me_cache: OnceCell<User>,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            me_cache: OnceCell::new(),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Calls a Bot API method, unwrapping the response envelope.
    async fn call<T, B>(&self, method: &str, body: &B) -> Result<T, BotError>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.api_url(method);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        if !data.ok {
            return Err(api_error(
                method,
                data.error_code,
                data.description,
                data.parameters,
            ));
        }
        data.result
            .ok_or_else(|| BotError::Parse(format!("{} returned no result", method)))
    }

    /// Long-polls getUpdates, converting each wire update into a domain
    /// [`Update`] with the untouched payload attached.
    pub async fn poll_updates(&self, offset: i64, timeout: i64) -> Result<Vec<Update>, BotError> {
        let me = self.me().await?;
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout,
            "allowed_updates": ALLOWED_UPDATES,
        });
        let raw: Vec<serde_json::Value> = self.call("getUpdates", &body).await?;
        Ok(raw
            .into_iter()
            .filter_map(|value| convert_update(value, &me.id))
            .collect())
    }

    /// Offset to request next; unchanged when the batch was empty.
    pub fn next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter().map(|u| u.id + 1).max().unwrap_or(current)
    }

    /// Send a message with a specific parse mode
    async fn send_with_parse_mode(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            parse_mode: Option<&'a str>,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };
        let result: MessageResult = self.call("sendMessage", &request).await?;
        Ok(result.message_id.to_string())
    }

    fn numeric_id(kind: &str, id: &str) -> Result<i64, BotError> {
        id.parse::<i64>()
            .map_err(|_| BotError::Api(format!("{} id '{}' is not numeric", kind, id)))
    }
}

fn api_error(
    method: &str,
    error_code: Option<i64>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
) -> BotError {
    let description =
        description.unwrap_or_else(|| format!("error {}", error_code.unwrap_or_default()));
    if error_code == Some(429) {
        let retry_after = parameters
            .and_then(|p| p.retry_after)
            .map(|secs| secs.max(0) as u64)
            .unwrap_or(1);
        return BotError::FloodWait {
            retry_after: Duration::from_secs(retry_after),
        };
    }
    match error_code {
        Some(401) | Some(403) => BotError::Auth(format!("{}: {}", method, description)),
        Some(404) => BotError::NotFound(format!("{}: {}", method, description)),
        _ => BotError::Api(format!("{}: {}", method, description)),
    }
}

fn message_update(
    update_id: i64,
    kind: UpdateKind,
    wire: WireMessage,
    me_id: &str,
    raw: serde_json::Value,
) -> Update {
    let chat_id = wire.chat.id.to_string();
    let chat_kind = ChatKind::parse(&wire.chat.kind);
    let outgoing = wire
        .from
        .as_ref()
        .map(|u| u.id.to_string() == me_id)
        .unwrap_or(false);

    let mut message = Message::new(&chat_id, wire.text.unwrap_or_default())
        .with_id(wire.message_id.to_string());
    if let Some(from) = wire.from {
        message = message.with_sender(from.into_user());
    }
    if let Some(timestamp) = wire
        .date
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
    {
        message = message.with_timestamp(timestamp);
    }

    Update::new(update_id, kind, chat_id, chat_kind)
        .with_message(message)
        .with_outgoing(outgoing)
        .with_raw(raw)
}

/// Maps one getUpdates entry onto the domain. Entries the wire layer cannot
/// make sense of are dropped with a warning.
fn convert_update(raw: serde_json::Value, me_id: &str) -> Option<Update> {
    let wire: WireUpdate = match serde_json::from_value(raw.clone()) {
        Ok(wire) => wire,
        Err(e) => {
            tracing::warn!("Skipping malformed update: {}", e);
            return None;
        }
    };

    if let Some(message) = wire.message {
        return Some(message_update(
            wire.update_id,
            UpdateKind::Message,
            message,
            me_id,
            raw,
        ));
    }
    if let Some(message) = wire.edited_message {
        return Some(message_update(
            wire.update_id,
            UpdateKind::EditedMessage,
            message,
            me_id,
            raw,
        ));
    }
    if let Some(member) = wire.chat_member {
        let chat = member.chat;
        return Some(
            Update::new(
                wire.update_id,
                UpdateKind::ChatMember,
                chat.id.to_string(),
                ChatKind::parse(&chat.kind),
            )
            .with_raw(raw),
        );
    }

    // Some other payload key carries this update; deliver it under its wire
    // name with whatever chat it references.
    let payload_key = raw
        .as_object()
        .and_then(|obj| obj.keys().find(|k| *k != "update_id").cloned())?;
    let chat = raw[&payload_key].get("chat");
    let chat_id = chat
        .and_then(|c| c.get("id"))
        .and_then(|id| id.as_i64())
        .map(|id| id.to_string())
        .unwrap_or_default();
    let chat_kind = chat
        .and_then(|c| c.get("type"))
        .and_then(|t| t.as_str())
        .map(ChatKind::parse)
        .unwrap_or(ChatKind::Private);
    Some(
        Update::new(wire.update_id, UpdateKind::Other(payload_key), chat_id, chat_kind)
            .with_raw(raw),
    )
}

#[async_trait]
impl ChatClient for TelegramAdapter {
    async fn me(&self) -> Result<User, BotError> {
        let me = self
            .me_cache
            .get_or_try_init(|| async {
                let wire: WireUser = self.call("getMe", &serde_json::json!({})).await?;
                tracing::info!("Connected as @{}", wire.username.as_deref().unwrap_or("?"));
                Ok::<_, BotError>(wire.into_user())
            })
            .await?;
        Ok(me.clone())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Chat, BotError> {
        let wire: WireChat = self
            .call("getChat", &serde_json::json!({ "chat_id": chat_id }))
            .await?;
        Ok(wire.into_chat())
    }

    async fn get_participant(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Participant, BotError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "user_id": Self::numeric_id("user", user_id)?,
        });
        let wire: WireChatMember = self.call("getChatMember", &body).await?;
        Ok(Participant::new(
            wire.user.into_user(),
            ParticipantStatus::parse(&wire.status),
        ))
    }

    async fn participants(&self, _chat_id: &str) -> Result<Vec<Participant>, BotError> {
        // The Bot API has no member enumeration method.
        Err(BotError::Unsupported("member enumeration".to_string()))
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);
        match self
            .send_with_parse_mode(chat_id, text, Some("MarkdownV2"))
            .await
        {
            Ok(id) => Ok(id),
            Err(e @ BotError::FloodWait { .. }) => Err(e),
            Err(e) => {
                // Fallback to plain text
                tracing::warn!("Markdown send failed, retrying plain: {}", e);
                self.send_with_parse_mode(chat_id, text, None).await
            }
        }
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<(), BotError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": Self::numeric_id("message", message_id)?,
            "text": text,
        });
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), BotError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": Self::numeric_id("message", message_id)?,
        });
        let _: bool = self.call("deleteMessage", &body).await?;
        Ok(())
    }

    async fn ban(&self, chat_id: &str, user_id: &str) -> Result<(), BotError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "user_id": Self::numeric_id("user", user_id)?,
        });
        let _: bool = self.call("banChatMember", &body).await?;
        Ok(())
    }
}
