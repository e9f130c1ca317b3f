//! Dispatcher - routes each platform update through gate, resolver, handler
//!
//! One dispatcher serves the whole process, built over the frozen
//! registration store. Per update: pattern match, authorization gate for
//! admin commands in multi-party chats, capability resolution, handler
//! invocation. A failure stays confined to its own registration; every
//! other registration still sees the update, and the event loop never
//! crashes on a handler's behalf.

use std::sync::Arc;

use regex_lite::Regex;
use uuid::Uuid;

use crate::application::errors::{DispatchError, RegistryError};
use crate::application::messaging::gate;
use crate::application::messaging::resolver::Resolver;
use crate::application::registry::{CommandRegistration, EventRegistration, Registry};
use crate::domain::entities::{Update, UpdateKind};
use crate::domain::traits::{ChatClient, Store};

/// A command registration with its pattern compiled against the prefix
struct CompiledCommand {
    matcher: Regex,
    registration: Arc<CommandRegistration>,
}

/// Routes updates to every matching registration
pub struct Dispatcher {
    commands: Vec<CompiledCommand>,
    events: Vec<Arc<EventRegistration>>,
    client: Arc<dyn ChatClient>,
    resolver: Resolver,
}

impl Dispatcher {
    /// Builds the dispatcher, compiling every command pattern anchored at
    /// the configured prefix. An invalid pattern aborts startup.
    pub fn new(
        registry: &Registry,
        prefix: &str,
        client: Arc<dyn ChatClient>,
        store: Arc<dyn Store>,
    ) -> Result<Self, RegistryError> {
        let escaped_prefix = regex_lite::escape(prefix);
        let mut commands = Vec::with_capacity(registry.command_count());
        for registration in registry.commands() {
            let anchored = format!("^{}(?:{})(?:\\s|$)", escaped_prefix, registration.pattern);
            let matcher =
                Regex::new(&anchored).map_err(|e| RegistryError::InvalidPattern {
                    pattern: registration.pattern.clone(),
                    reason: e.to_string(),
                })?;
            commands.push(CompiledCommand {
                matcher,
                registration: registration.clone(),
            });
        }
        Ok(Self {
            commands,
            events: registry.events().to_vec(),
            client: client.clone(),
            resolver: Resolver::new(client, store),
        })
    }

    /// Runs every registration that matches this update, in registration
    /// order, isolating each one's failure. Commands fire on new messages
    /// only; edits reach event registrations whose filter asks for them.
    pub async fn dispatch(&self, update: Update) {
        let dispatch_id = Uuid::new_v4();
        tracing::debug!(
            "Dispatch {} for {} update {} in chat {}",
            dispatch_id,
            update.kind.as_str(),
            update.id,
            update.chat_id
        );
        if update.kind == UpdateKind::Message {
            if let Some(text) = update.text() {
                for command in &self.commands {
                    if !command.matcher.is_match(text) {
                        continue;
                    }
                    if let Err(e) = self.dispatch_command(&command.registration, &update).await {
                        tracing::error!(
                            "Dispatch {} of command '{}' failed: {}",
                            dispatch_id,
                            command.registration.pattern,
                            e
                        );
                    }
                }
            }
        }
        for registration in &self.events {
            if !registration.filter.matches(&update) {
                continue;
            }
            if let Err(e) = (registration.handler)(update.clone()).await {
                tracing::error!("Dispatch {} of event handler failed: {}", dispatch_id, e);
            }
        }
    }

    async fn dispatch_command(
        &self,
        registration: &CommandRegistration,
        update: &Update,
    ) -> Result<(), DispatchError> {
        if registration.admins {
            // Admin commands accept any sender; the gate only applies where
            // admin rights exist at all.
            if update.is_multi_party() && !gate::authorize(&self.client, update).await? {
                tracing::debug!(
                    "Rejected '{}' in chat {}: sender lacks admin rights",
                    registration.pattern,
                    update.chat_id
                );
                return Ok(());
            }
        } else if registration.private && !update.outgoing {
            return Ok(());
        }
        let resolved = self.resolver.resolve(&registration.signature, update).await?;
        (registration.handler)(resolved).await
    }
}
