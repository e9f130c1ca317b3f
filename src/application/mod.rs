//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Registry: plugin registration and the two-phase store
//! - Messaging: argument parsing, capability resolution, dispatching
//! - Services: supporting accessors used by handlers
//! - Errors: layer-specific errors

pub mod errors;
pub mod messaging;
pub mod registry;
pub mod services;
