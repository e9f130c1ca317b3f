//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod store;

pub use client::ChatClient;
pub use store::Store;
