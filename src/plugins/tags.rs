//! Per-chat tag management
//!
//! Tags switch handler behavior per chat. Managing them is an admin
//! concern in multi-party chats; the pattern also answers to `tags`.

use crate::application::errors::{DispatchError, RegistryError};
use crate::application::messaging::markdown::Section;
use crate::application::messaging::HandlerArgs;
use crate::application::registry::{Command, HandlerResult, Registrar};
use crate::application::services::Tags;

const USAGE: &str = "Usage: tag list | tag get <name> | tag set <name> <value> | tag del <name>";

pub fn register(registrar: &mut Registrar) -> Result<(), RegistryError> {
    registrar.register(
        Command::new("tag(s)?")
            .with_admins(true)
            .with_signature(&["client", "message", "positional-args", "tag-accessor"])
            .with_handler(handle),
    )
}

async fn handle(args: HandlerArgs) -> HandlerResult {
    let client = args.client()?;
    let message = args.message()?;
    let positional = args.args()?;
    let tags = args.tags()?;

    let response = match positional.split_first() {
        None => list(tags).await?,
        Some((subcommand, rest)) => match (subcommand.as_str(), rest) {
            ("list", _) => list(tags).await?,
            ("get", [name]) => match tags.get(name).await? {
                Some(value) => format!("{}: {}", name, value),
                None => format!("Tag '{}' is not set.", name),
            },
            ("set", [name, value @ ..]) if !value.is_empty() => {
                let value = value.join(" ");
                tags.set(name, &value).await?;
                format!("Tag '{}' set.", name)
            }
            ("del", [name]) | ("rm", [name]) => {
                tags.remove(name).await?;
                format!("Tag '{}' removed.", name)
            }
            _ => USAGE.to_string(),
        },
    };
    client.send_message(&message.chat_id, &response).await?;
    Ok(())
}

async fn list(tags: &Tags) -> Result<String, DispatchError> {
    let mut all = tags.all().await?;
    if all.is_empty() {
        return Ok("No tags set.".to_string());
    }
    all.sort();
    let mut section = Section::new("Tags");
    for (name, value) in all {
        section = section.kv(&name, value);
    }
    Ok(section.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::messaging::Dispatcher;
    use crate::domain::entities::ParticipantStatus;
    use crate::domain::traits::Store as _;
    use crate::infrastructure::storage::MemoryStore;
    use crate::testing::{private_update, update_from, MockClient};

    fn dispatcher(client: Arc<MockClient>, store: Arc<MemoryStore>) -> Dispatcher {
        let mut registrar = Registrar::new();
        register(&mut registrar).expect("registers");
        Dispatcher::new(&registrar.freeze(), ".", client, store).expect("builds")
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let client = Arc::new(MockClient::new());
        let dispatcher = dispatcher(client.clone(), Arc::new(MemoryStore::new()));

        dispatcher
            .dispatch(private_update("9", "alice", ".tag set greeting hello world"))
            .await;
        dispatcher
            .dispatch(private_update("9", "alice", ".tag get greeting"))
            .await;

        let sent = client.sent();
        assert_eq!(sent[0].1, "Tag 'greeting' set.");
        assert_eq!(sent[1].1, "greeting: hello world");
    }

    #[tokio::test]
    async fn plain_members_cannot_manage_group_tags() {
        let client = Arc::new(MockClient::new());
        client.set_participant("100", "mallory", ParticipantStatus::Member);
        let store = Arc::new(MemoryStore::new());
        let dispatcher = dispatcher(client.clone(), store.clone());

        dispatcher
            .dispatch(update_from("100", "mallory", ".tag set polls off"))
            .await;

        assert!(client.sent().is_empty());
        assert_eq!(store.tag_get("100", "polls").await.expect("get"), None);
    }

    #[tokio::test]
    async fn admins_manage_group_tags() {
        let client = Arc::new(MockClient::new());
        client.set_participant("100", "alice", ParticipantStatus::Administrator);
        let dispatcher = dispatcher(client.clone(), Arc::new(MemoryStore::new()));

        dispatcher
            .dispatch(update_from("100", "alice", ".tag set polls off"))
            .await;
        dispatcher.dispatch(update_from("100", "alice", ".tags")).await;

        let sent = client.sent();
        assert_eq!(sent[0].1, "Tag 'polls' set.");
        assert!(sent[1].1.contains("polls: off"));
    }

    #[tokio::test]
    async fn removal_and_empty_listing() {
        let client = Arc::new(MockClient::new());
        let dispatcher = dispatcher(client.clone(), Arc::new(MemoryStore::new()));

        dispatcher
            .dispatch(private_update("9", "alice", ".tag set polls off"))
            .await;
        dispatcher
            .dispatch(private_update("9", "alice", ".tag del polls"))
            .await;
        dispatcher.dispatch(private_update("9", "alice", ".tag list")).await;

        let sent = client.sent();
        assert_eq!(sent[1].1, "Tag 'polls' removed.");
        assert_eq!(sent[2].1, "No tags set.");
    }

    #[tokio::test]
    async fn malformed_invocations_answer_with_usage() {
        let client = Arc::new(MockClient::new());
        let dispatcher = dispatcher(client.clone(), Arc::new(MemoryStore::new()));

        dispatcher
            .dispatch(private_update("9", "alice", ".tag set polls"))
            .await;

        assert_eq!(client.sent()[0].1, USAGE);
    }
}
