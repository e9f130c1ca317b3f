//! Removes deleted accounts from a group
//!
//! Scans the chat roster and bans every account the platform reports as
//! deleted. `count:true` only counts, `silent:true` does the work without
//! progress messages and drops the triggering command. When the bot itself
//! lacks ban rights the scan degrades to counting.

use std::sync::Arc;

use serde_json::Value;

use crate::application::errors::{BotError, RegistryError};
use crate::application::messaging::markdown::Section;
use crate::application::messaging::HandlerArgs;
use crate::application::registry::{Command, HandlerResult, Registrar};
use crate::domain::entities::{Message, Update};
use crate::domain::traits::ChatClient;

/// Progress edits happen roughly this many times over a full scan.
const PROGRESS_SLICES: usize = 25;

pub fn register(registrar: &mut Registrar) -> Result<(), RegistryError> {
    registrar.register(
        Command::new("cleanup")
            .with_admins(true)
            .with_signature(&["client", "chat", "message", "keyword-args", "raw-event"])
            .with_handler(handle),
    )
}

async fn handle(args: HandlerArgs) -> HandlerResult {
    let client = args.client()?;
    let chat = args.chat()?;
    let message = args.message()?;
    let kwargs = args.kwargs()?;
    let event = args.event()?;

    let mut count_only = kwargs.get("count").and_then(Value::as_bool).unwrap_or(false);
    let silent = kwargs.get("silent").and_then(Value::as_bool).unwrap_or(false);

    // Without ban rights of our own, counting is all that can be done.
    let me = client.me().await?;
    let own = client.get_participant(&chat.id, &me.id).await?;
    if !own.status.is_admin() {
        count_only = true;
    }

    let participants = match client.participants(&chat.id).await {
        Ok(participants) => participants,
        Err(BotError::Unsupported(_)) => {
            client
                .send_message(
                    &message.chat_id,
                    "Member enumeration is not available on this platform.",
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if silent {
        client.delete_message(&message.chat_id, &message.id).await?;
    }
    let progress_id = if silent {
        None
    } else {
        Some(respond(&client, event, message, "Starting cleanup. This might take a while.").await?)
    };

    let label = if count_only {
        "Counted deleted accounts"
    } else {
        "Removed deleted accounts"
    };
    let total = participants.len();
    let modulus = (total / PROGRESS_SLICES).max(1);
    let mut deleted = 0usize;
    let mut deleted_admins = 0usize;

    for (index, participant) in participants.iter().enumerate() {
        if let Some(ref id) = progress_id {
            if index % modulus == 0 {
                let progress = Section::new("Cleanup")
                    .kv("Progress", format!("{}/{}", index, total))
                    .kv(label, deleted);
                client
                    .edit_message(&message.chat_id, id, &progress.to_string())
                    .await?;
            }
        }
        if !participant.user.deleted {
            continue;
        }
        deleted += 1;
        if count_only {
            continue;
        }
        if participant.status.is_admin() {
            // Admins cannot be banned; they show up in the summary instead.
            deleted_admins += 1;
            continue;
        }
        if let Err(e) = client.ban(&chat.id, &participant.user.id).await {
            match e {
                BotError::FloodWait { retry_after } => {
                    if let Some(ref id) = progress_id {
                        let notice = Section::new("Cleanup")
                            .line(format!(
                                "Flood wait for {}s. Sleeping.",
                                retry_after.as_secs()
                            ))
                            .kv("Progress", format!("{}/{}", index, total))
                            .kv(label, deleted);
                        client
                            .edit_message(&message.chat_id, id, &notice.to_string())
                            .await?;
                    }
                    tracing::warn!(
                        "Flood wait for {}s while banning {}, sleeping",
                        retry_after.as_secs(),
                        participant.user.id
                    );
                    tokio::time::sleep(retry_after).await;
                    client.ban(&chat.id, &participant.user.id).await?;
                }
                other => return Err(other.into()),
            }
        }
    }

    if let Some(ref id) = progress_id {
        let mut summary = Section::new("Cleanup").kv(label, deleted);
        if deleted_admins > 0 {
            summary = summary.kv("Deleted admins", deleted_admins);
        }
        client
            .edit_message(&message.chat_id, id, &summary.to_string())
            .await?;
    }
    tracing::info!(
        "Cleanup of chat {} finished (update {}): {} deleted accounts",
        chat.id,
        event.id,
        deleted
    );
    Ok(())
}

/// Edits the triggering message when it is the bot's own, otherwise sends
/// a new one. Returns the id of the message now holding `text`.
async fn respond(
    client: &Arc<dyn ChatClient>,
    update: &Update,
    message: &Message,
    text: &str,
) -> Result<String, BotError> {
    if update.outgoing {
        client
            .edit_message(&message.chat_id, &message.id, text)
            .await?;
        Ok(message.id.clone())
    } else {
        client.send_message(&message.chat_id, text).await
    }
}
