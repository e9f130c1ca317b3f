//! Dynamic plugin units
//!
//! Units are shared libraries that extend the bot with additional command
//! and event registrations. Each exports a single entry point that runs
//! against the registrar during the load phase.

pub mod loader;

pub use loader::{DiscoveredUnit, PluginLoader, PluginRegisterFn, PLUGIN_ENTRY};
