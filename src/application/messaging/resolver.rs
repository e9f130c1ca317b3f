//! Capability resolution - builds exactly the arguments a handler declared
//!
//! Runs fresh per dispatch. Only flagged capabilities are resolved, so a
//! handler asking for `client` and `message` never pays for a chat fetch,
//! and nothing resolved here outlives the handler call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::application::errors::DispatchError;
use crate::application::messaging::parser::{ArgumentParser, ParseArgs};
use crate::application::registry::{Capability, SignatureDescriptor};
use crate::application::services::Tags;
use crate::domain::entities::{Chat, Message, Update};
use crate::domain::traits::{ChatClient, Store};

/// Arguments resolved for one handler invocation, discarded afterwards
#[derive(Default)]
pub struct HandlerArgs {
    client: Option<Arc<dyn ChatClient>>,
    storage: Option<Arc<dyn Store>>,
    chat: Option<Chat>,
    message: Option<Message>,
    args: Option<Vec<String>>,
    kwargs: Option<HashMap<String, Value>>,
    event: Option<Update>,
    tags: Option<Tags>,
}

impl HandlerArgs {
    pub fn client(&self) -> Result<Arc<dyn ChatClient>, DispatchError> {
        self.client
            .clone()
            .ok_or(DispatchError::MissingCapability(Capability::Client.as_str()))
    }

    pub fn storage(&self) -> Result<Arc<dyn Store>, DispatchError> {
        self.storage
            .clone()
            .ok_or(DispatchError::MissingCapability(Capability::Storage.as_str()))
    }

    pub fn chat(&self) -> Result<&Chat, DispatchError> {
        self.chat
            .as_ref()
            .ok_or(DispatchError::MissingCapability(Capability::Chat.as_str()))
    }

    pub fn message(&self) -> Result<&Message, DispatchError> {
        self.message
            .as_ref()
            .ok_or(DispatchError::MissingCapability(Capability::Message.as_str()))
    }

    pub fn args(&self) -> Result<&[String], DispatchError> {
        self.args
            .as_deref()
            .ok_or(DispatchError::MissingCapability(Capability::Args.as_str()))
    }

    pub fn kwargs(&self) -> Result<&HashMap<String, Value>, DispatchError> {
        self.kwargs
            .as_ref()
            .ok_or(DispatchError::MissingCapability(Capability::Kwargs.as_str()))
    }

    pub fn event(&self) -> Result<&Update, DispatchError> {
        self.event
            .as_ref()
            .ok_or(DispatchError::MissingCapability(Capability::Event.as_str()))
    }

    pub fn tags(&self) -> Result<&Tags, DispatchError> {
        self.tags
            .as_ref()
            .ok_or(DispatchError::MissingCapability(Capability::Tags.as_str()))
    }

    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Client => self.client.is_some(),
            Capability::Storage => self.storage.is_some(),
            Capability::Chat => self.chat.is_some(),
            Capability::Message => self.message.is_some(),
            Capability::Args => self.args.is_some(),
            Capability::Kwargs => self.kwargs.is_some(),
            Capability::Event => self.event.is_some(),
            Capability::Tags => self.tags.is_some(),
        }
    }

    /// Number of resolved capabilities.
    pub fn len(&self) -> usize {
        Capability::ALL
            .into_iter()
            .filter(|c| self.contains(*c))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the declared argument set for one dispatch
pub struct Resolver {
    client: Arc<dyn ChatClient>,
    store: Arc<dyn Store>,
    parser: Arc<dyn ParseArgs>,
}

impl Resolver {
    pub fn new(client: Arc<dyn ChatClient>, store: Arc<dyn Store>) -> Self {
        Self {
            client,
            store,
            parser: Arc::new(ArgumentParser::new()),
        }
    }

    /// Swaps in a different text-parsing collaborator.
    pub fn with_parser(mut self, parser: Arc<dyn ParseArgs>) -> Self {
        self.parser = parser;
        self
    }

    /// Resolves the flagged capabilities against one update.
    ///
    /// The chat object is fetched live from the platform. Positional and
    /// keyword arguments come out of one shared parse pass, even when both
    /// are flagged.
    pub async fn resolve(
        &self,
        signature: &SignatureDescriptor,
        update: &Update,
    ) -> Result<HandlerArgs, DispatchError> {
        let mut resolved = HandlerArgs::default();
        if signature.contains(Capability::Client) {
            resolved.client = Some(self.client.clone());
        }
        if signature.contains(Capability::Storage) {
            resolved.storage = Some(self.store.clone());
        }
        if signature.contains(Capability::Chat) {
            resolved.chat = Some(self.client.get_chat(&update.chat_id).await?);
        }
        if signature.contains(Capability::Message) {
            let message = update.message.clone().ok_or(DispatchError::MissingMessage)?;
            resolved.message = Some(message);
        }
        if signature.contains(Capability::Args) || signature.contains(Capability::Kwargs) {
            let message = update.message.as_ref().ok_or(DispatchError::MissingMessage)?;
            let parsed = self.parser.parse(message.args_text());
            if signature.contains(Capability::Args) {
                resolved.args = Some(parsed.args);
            }
            if signature.contains(Capability::Kwargs) {
                resolved.kwargs = Some(parsed.kwargs);
            }
        }
        if signature.contains(Capability::Event) {
            resolved.event = Some(update.clone());
        }
        if signature.contains(Capability::Tags) {
            resolved.tags = Some(Tags::new(self.store.clone(), &update.chat_id));
        }
        Ok(resolved)
    }
}
