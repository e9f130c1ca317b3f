//! Capability declarations for command handlers
//!
//! A handler asks for exactly the dependencies it needs by declaring a set
//! of named capabilities at registration time. The set is derived once,
//! when the command enters the store, and never recomputed.

use std::fmt;

use crate::application::errors::RegistryError;

/// One dependency a handler can request from the dispatch runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The shared platform connection handle.
    Client,
    /// The persistent key-value storage accessor.
    Storage,
    /// The chat object, resolved from the platform at dispatch time.
    Chat,
    /// The triggering message.
    Message,
    /// Positional arguments parsed from the message text.
    Args,
    /// Keyword options parsed from the message text.
    Kwargs,
    /// The unmodified platform update.
    Event,
    /// A per-chat tag accessor.
    Tags,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Client,
        Capability::Storage,
        Capability::Chat,
        Capability::Message,
        Capability::Args,
        Capability::Kwargs,
        Capability::Event,
        Capability::Tags,
    ];

    /// Looks up a capability by its declared name.
    pub fn parse(name: &str) -> Option<Capability> {
        match name {
            "client" => Some(Capability::Client),
            "storage-handle" => Some(Capability::Storage),
            "chat" => Some(Capability::Chat),
            "message" => Some(Capability::Message),
            "positional-args" => Some(Capability::Args),
            "keyword-args" => Some(Capability::Kwargs),
            "raw-event" => Some(Capability::Event),
            "tag-accessor" => Some(Capability::Tags),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Client => "client",
            Capability::Storage => "storage-handle",
            Capability::Chat => "chat",
            Capability::Message => "message",
            Capability::Args => "positional-args",
            Capability::Kwargs => "keyword-args",
            Capability::Event => "raw-event",
            Capability::Tags => "tag-accessor",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full set of capabilities one handler declared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignatureDescriptor {
    client: bool,
    storage: bool,
    chat: bool,
    message: bool,
    args: bool,
    kwargs: bool,
    event: bool,
    tags: bool,
}

impl SignatureDescriptor {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derives a descriptor from declared capability names.
    ///
    /// An unrecognized name fails the whole registration; a handler must
    /// never run with a silently narrowed argument set.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, RegistryError> {
        let mut signature = Self::default();
        for name in names {
            let name = name.as_ref();
            match Capability::parse(name) {
                Some(capability) => signature.set(capability),
                None => return Err(RegistryError::UnknownCapability(name.to_string())),
            }
        }
        Ok(signature)
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.set(capability);
        self
    }

    fn set(&mut self, capability: Capability) {
        match capability {
            Capability::Client => self.client = true,
            Capability::Storage => self.storage = true,
            Capability::Chat => self.chat = true,
            Capability::Message => self.message = true,
            Capability::Args => self.args = true,
            Capability::Kwargs => self.kwargs = true,
            Capability::Event => self.event = true,
            Capability::Tags => self.tags = true,
        }
    }

    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::Client => self.client,
            Capability::Storage => self.storage,
            Capability::Chat => self.chat,
            Capability::Message => self.message,
            Capability::Args => self.args,
            Capability::Kwargs => self.kwargs,
            Capability::Event => self.event,
            Capability::Tags => self.tags,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for SignatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_exactly_the_declared_flags() {
        let sig = SignatureDescriptor::from_names(&["client", "message", "tag-accessor"])
            .expect("valid names");
        assert!(sig.contains(Capability::Client));
        assert!(sig.contains(Capability::Message));
        assert!(sig.contains(Capability::Tags));
        assert!(!sig.contains(Capability::Chat));
        assert!(!sig.contains(Capability::Storage));
        assert_eq!(sig.len(), 3);
    }

    #[test]
    fn unrecognized_name_is_an_error() {
        let err = SignatureDescriptor::from_names(&["client", "database"]).unwrap_err();
        assert!(err.to_string().contains("database"));
    }

    #[test]
    fn every_capability_round_trips_through_its_name() {
        for capability in Capability::ALL {
            assert_eq!(Capability::parse(capability.as_str()), Some(capability));
        }
    }

    #[test]
    fn empty_descriptor_has_no_flags() {
        let sig = SignatureDescriptor::empty();
        assert!(sig.is_empty());
        assert_eq!(sig.iter().count(), 0);
    }
}
