//! Shared test doubles
//!
//! `MockClient` stands in for the platform connection: participant rosters
//! and chats are scripted per test, every query is counted, and failures
//! can be switched on to drive error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{
    Chat, ChatKind, Message, Participant, ParticipantStatus, Update, UpdateKind, User,
};
use crate::domain::traits::ChatClient;

pub struct MockClient {
    me: User,
    chats: Mutex<HashMap<String, Chat>>,
    members: Mutex<HashMap<String, Vec<Participant>>>,
    sent: Mutex<Vec<(String, String)>>,
    edits: Mutex<Vec<(String, String, String)>>,
    banned: Mutex<Vec<(String, String)>>,
    get_chat_calls: AtomicUsize,
    get_participant_calls: AtomicUsize,
    ban_calls: AtomicUsize,
    next_message_id: AtomicUsize,
    fail_chat: AtomicBool,
    fail_participant: AtomicBool,
    unsupported_roster: AtomicBool,
    flood_bans_remaining: AtomicUsize,
}

impl MockClient {
    /// Account id the mock reports as its own identity.
    pub const SELF_ID: &'static str = "warden-bot";

    pub fn new() -> Self {
        let mut me = User::new(Self::SELF_ID).with_username("warden_bot");
        me.is_bot = true;
        Self {
            me,
            chats: Mutex::new(HashMap::new()),
            members: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            banned: Mutex::new(Vec::new()),
            get_chat_calls: AtomicUsize::new(0),
            get_participant_calls: AtomicUsize::new(0),
            ban_calls: AtomicUsize::new(0),
            next_message_id: AtomicUsize::new(1),
            fail_chat: AtomicBool::new(false),
            fail_participant: AtomicBool::new(false),
            unsupported_roster: AtomicBool::new(false),
            flood_bans_remaining: AtomicUsize::new(0),
        }
    }

    pub fn set_chat(&self, chat: Chat) {
        self.chats.lock().unwrap().insert(chat.id.clone(), chat);
    }

    /// Scripts a member with full user details, replacing any earlier entry
    /// for the same user id. Roster order follows insertion order.
    pub fn set_member(&self, chat_id: &str, user: User, status: ParticipantStatus) {
        let mut members = self.members.lock().unwrap();
        let roster = members.entry(chat_id.to_string()).or_default();
        if let Some(existing) = roster.iter_mut().find(|p| p.user.id == user.id) {
            *existing = Participant::new(user, status);
        } else {
            roster.push(Participant::new(user, status));
        }
    }

    pub fn set_participant(&self, chat_id: &str, user_id: &str, status: ParticipantStatus) {
        self.set_member(chat_id, User::new(user_id), status);
    }

    pub fn get_chat_calls(&self) -> usize {
        self.get_chat_calls.load(Ordering::SeqCst)
    }

    pub fn get_participant_calls(&self) -> usize {
        self.get_participant_calls.load(Ordering::SeqCst)
    }

    pub fn ban_calls(&self) -> usize {
        self.ban_calls.load(Ordering::SeqCst)
    }

    /// Messages sent so far, as (chat id, text) pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Edits applied so far, as (chat id, message id, text) triples.
    pub fn edits(&self) -> Vec<(String, String, String)> {
        self.edits.lock().unwrap().clone()
    }

    /// Users banned so far, as (chat id, user id) pairs.
    pub fn banned(&self) -> Vec<(String, String)> {
        self.banned.lock().unwrap().clone()
    }

    pub fn fail_chat_queries(&self, fail: bool) {
        self.fail_chat.store(fail, Ordering::SeqCst);
    }

    pub fn fail_participant_queries(&self, fail: bool) {
        self.fail_participant.store(fail, Ordering::SeqCst);
    }

    /// Makes `participants` answer like a platform without member
    /// enumeration.
    pub fn unsupported_roster(&self, unsupported: bool) {
        self.unsupported_roster.store(unsupported, Ordering::SeqCst);
    }

    /// The next `n` ban calls answer with a two second flood wait before
    /// bans start succeeding again.
    pub fn fail_next_bans_with_flood(&self, n: usize) {
        self.flood_bans_remaining.store(n, Ordering::SeqCst);
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn me(&self) -> Result<User, BotError> {
        Ok(self.me.clone())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Chat, BotError> {
        self.get_chat_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_chat.load(Ordering::SeqCst) {
            return Err(BotError::Network("chat query failed".to_string()));
        }
        let chats = self.chats.lock().unwrap();
        Ok(chats
            .get(chat_id)
            .cloned()
            .unwrap_or_else(|| Chat::new(chat_id, ChatKind::Group)))
    }

    async fn get_participant(
        &self,
        chat_id: &str,
        user_id: &str,
    ) -> Result<Participant, BotError> {
        self.get_participant_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_participant.load(Ordering::SeqCst) {
            return Err(BotError::Network("participant query failed".to_string()));
        }
        let members = self.members.lock().unwrap();
        members
            .get(chat_id)
            .and_then(|roster| roster.iter().find(|p| p.user.id == user_id))
            .cloned()
            .ok_or_else(|| BotError::NotFound(format!("participant {}", user_id)))
    }

    async fn participants(&self, chat_id: &str) -> Result<Vec<Participant>, BotError> {
        if self.unsupported_roster.load(Ordering::SeqCst) {
            return Err(BotError::Unsupported("member enumeration".to_string()));
        }
        let members = self.members.lock().unwrap();
        Ok(members.get(chat_id).cloned().unwrap_or_default())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(id.to_string())
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<(), BotError> {
        self.edits.lock().unwrap().push((
            chat_id.to_string(),
            message_id.to_string(),
            text.to_string(),
        ));
        Ok(())
    }

    async fn delete_message(&self, _chat_id: &str, _message_id: &str) -> Result<(), BotError> {
        Ok(())
    }

    async fn ban(&self, chat_id: &str, user_id: &str) -> Result<(), BotError> {
        self.ban_calls.fetch_add(1, Ordering::SeqCst);
        if self.flood_bans_remaining.load(Ordering::SeqCst) > 0 {
            self.flood_bans_remaining.fetch_sub(1, Ordering::SeqCst);
            return Err(BotError::FloodWait {
                retry_after: Duration::from_secs(2),
            });
        }
        self.banned
            .lock()
            .unwrap()
            .push((chat_id.to_string(), user_id.to_string()));
        Ok(())
    }
}

/// Installs a log subscriber once, so a failing test shows handler logs
/// when run with `RUST_LOG` set.
pub fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_target(false)
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

static NEXT_UPDATE_ID: AtomicI64 = AtomicI64::new(1);

fn update_with(chat_id: &str, kind: ChatKind, sender_id: &str, text: &str) -> Update {
    let message = Message::new(chat_id, text).with_sender(User::new(sender_id));
    Update::new(
        NEXT_UPDATE_ID.fetch_add(1, Ordering::SeqCst),
        UpdateKind::Message,
        chat_id,
        kind,
    )
    .with_message(message)
}

/// An incoming group message from the given sender.
pub fn update_from(chat_id: &str, sender_id: &str, text: &str) -> Update {
    update_with(chat_id, ChatKind::Group, sender_id, text)
}

/// An incoming direct-chat message from the given sender.
pub fn private_update(chat_id: &str, sender_id: &str, text: &str) -> Update {
    update_with(chat_id, ChatKind::Private, sender_id, text)
}

/// A message sent by the bot account itself.
pub fn outgoing_update(chat_id: &str, text: &str) -> Update {
    update_with(chat_id, ChatKind::Group, MockClient::SELF_ID, text).with_outgoing(true)
}
