//! Application layer errors

use std::time::Duration;

use thiserror::Error;

/// Platform client errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Platform rejected request: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Flood wait: retry after {}s", .retry_after.as_secs())]
    FloodWait { retry_after: Duration },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not supported by this client: {0}")]
    Unsupported(String),
}

impl BotError {
    /// Wait duration for a flood-wait error, if this is one.
    pub fn flood_wait(&self) -> Option<Duration> {
        match self {
            BotError::FloodWait { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Registration phase errors; any of these aborts startup
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unrecognized capability name: {0}")]
    UnknownCapability(String),

    #[error("Command pattern must not be empty")]
    EmptyPattern,

    #[error("Invalid command pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Command '{0}' registered without a handler")]
    MissingHandler(String),

    #[error("Event registered without a handler")]
    MissingEventHandler,

    #[error("Failed to load plugin unit '{unit}': {reason}")]
    Load { unit: String, reason: String },
}

/// Dispatch-time errors, scoped to a single event
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Platform error: {0}")]
    Platform(#[from] BotError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Update carries no message")]
    MissingMessage,

    #[error("Capability '{0}' was not resolved for this handler")]
    MissingCapability(&'static str),

    #[error("Handler failed: {0}")]
    Handler(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
