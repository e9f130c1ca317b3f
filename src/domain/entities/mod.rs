//! Domain entities - Core business objects with no external dependencies

pub mod chat;
pub mod message;
pub mod update;
pub mod user;

pub use chat::{Chat, ChatKind};
pub use message::Message;
pub use update::{Update, UpdateKind};
pub use user::{Participant, ParticipantStatus, User};
