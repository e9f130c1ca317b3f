//! Command and event registrations, held in a two-phase store
//!
//! Plugin units append registrations through a [`Registrar`] during the
//! load phase. [`Registrar::freeze`] consumes it and produces a
//! [`Registry`] with no mutation API, so late registration is a compile
//! error rather than a runtime hazard. The registry lives for the rest of
//! the process and is shared read-only by every dispatch.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::application::errors::{DispatchError, RegistryError};
use crate::application::messaging::HandlerArgs;
use crate::application::registry::SignatureDescriptor;
use crate::domain::entities::{Update, UpdateKind};

pub type HandlerResult = Result<(), DispatchError>;

/// Stored command handler: takes its resolved arguments, runs to completion.
pub type CommandHandler =
    Arc<dyn Fn(HandlerArgs) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Stored event handler: receives the raw update only.
pub type EventHandler = Arc<dyn Fn(Update) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Which platform updates an event registration wants to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    Any,
    Kind(UpdateKind),
}

impl EventFilter {
    pub fn matches(&self, update: &Update) -> bool {
        match self {
            EventFilter::Any => true,
            EventFilter::Kind(kind) => update.kind == *kind,
        }
    }
}

/// A command under construction, before it enters the store
pub struct Command {
    pattern: String,
    private: bool,
    admins: bool,
    requires: Vec<String>,
    handler: Option<CommandHandler>,
}

impl Command {
    /// Starts a command registration. Defaults: fires only for the bot
    /// account's own messages, no admin gate, empty capability set.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            private: true,
            admins: false,
            requires: Vec::new(),
            handler: None,
        }
    }

    /// Whether the command fires only for self-sent messages.
    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Requires the sender to hold admin rights in multi-party chats.
    /// Admin commands accept any sender, whatever the private flag says.
    pub fn with_admins(mut self, admins: bool) -> Self {
        self.admins = admins;
        self
    }

    /// Declares the capabilities the handler needs, by name. Names are
    /// validated when the command is registered.
    pub fn with_signature(mut self, names: &[&str]) -> Self {
        self.requires = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(HandlerArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler = Some(Arc::new(
            move |args| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(args)) },
        ));
        self
    }
}

/// An event subscription under construction
pub struct Event {
    filter: EventFilter,
    handler: Option<EventHandler>,
}

impl Event {
    pub fn on(filter: EventFilter) -> Self {
        Self {
            filter,
            handler: None,
        }
    }

    pub fn with_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Update) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler = Some(Arc::new(
            move |update| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(update)) },
        ));
        self
    }
}

/// A command as stored: immutable for the process lifetime
pub struct CommandRegistration {
    pub pattern: String,
    pub private: bool,
    pub admins: bool,
    pub signature: SignatureDescriptor,
    pub handler: CommandHandler,
}

/// An event subscription as stored
pub struct EventRegistration {
    pub filter: EventFilter,
    pub handler: EventHandler,
}

/// Load-phase view of the registration store; append-only
#[derive(Default)]
pub struct Registrar {
    commands: Vec<Arc<CommandRegistration>>,
    events: Vec<Arc<EventRegistration>>,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a command registration.
    ///
    /// Duplicate patterns are allowed; every matching registration fires
    /// independently at dispatch time.
    pub fn register(&mut self, command: Command) -> Result<(), RegistryError> {
        if command.pattern.is_empty() {
            return Err(RegistryError::EmptyPattern);
        }
        let handler = command
            .handler
            .ok_or_else(|| RegistryError::MissingHandler(command.pattern.clone()))?;
        let signature = SignatureDescriptor::from_names(&command.requires)?;
        tracing::debug!(
            "Registered command '{}' (private: {}, admins: {}, capabilities: [{}])",
            command.pattern,
            command.private,
            command.admins,
            signature
        );
        self.commands.push(Arc::new(CommandRegistration {
            pattern: command.pattern,
            private: command.private,
            admins: command.admins,
            signature,
            handler,
        }));
        Ok(())
    }

    /// Appends an event registration.
    pub fn register_event(&mut self, event: Event) -> Result<(), RegistryError> {
        let handler = event.handler.ok_or(RegistryError::MissingEventHandler)?;
        tracing::debug!("Registered event handler for {:?}", event.filter);
        self.events.push(Arc::new(EventRegistration {
            filter: event.filter,
            handler,
        }));
        Ok(())
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Ends the load phase. The returned registry cannot be appended to.
    pub fn freeze(self) -> Registry {
        tracing::info!(
            "Registration store frozen: {} commands, {} event handlers",
            self.commands.len(),
            self.events.len()
        );
        Registry {
            commands: self.commands,
            events: self.events,
        }
    }
}

/// Run-phase view of the registration store; read-only
pub struct Registry {
    commands: Vec<Arc<CommandRegistration>>,
    events: Vec<Arc<EventRegistration>>,
}

impl Registry {
    pub fn commands(&self) -> &[Arc<CommandRegistration>] {
        &self.commands
    }

    pub fn events(&self) -> &[Arc<EventRegistration>] {
        &self.events
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
