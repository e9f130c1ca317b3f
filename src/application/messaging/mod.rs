//! Message handling - routing updates from the platform to plugin handlers

pub mod dispatcher;
pub mod gate;
pub mod markdown;
pub mod parser;
pub mod resolver;

pub use dispatcher::Dispatcher;
pub use parser::{ArgumentParser, ParseArgs, ParsedArgs};
pub use resolver::{HandlerArgs, Resolver};
