//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: In-memory and SQLite-backed persistence
//! - Adapters: Platform integrations
//! - Plugins: Dynamic unit loading

pub mod adapters;
pub mod config;
pub mod database;
pub mod plugins;
pub mod storage;
