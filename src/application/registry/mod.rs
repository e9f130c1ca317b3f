//! Plugin registration: capability signatures and the two-phase store

pub mod signature;
pub mod store;

pub use signature::{Capability, SignatureDescriptor};
pub use store::{
    Command, CommandHandler, CommandRegistration, Event, EventFilter, EventHandler,
    EventRegistration, HandlerResult, Registrar, Registry,
};
