//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (User, Chat, Message, Update)
//! - Traits: Abstractions for infrastructure (ChatClient, Store)

pub mod entities;
pub mod traits;
