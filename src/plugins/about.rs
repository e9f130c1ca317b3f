//! Answers with version and chat details.

use crate::application::errors::RegistryError;
use crate::application::messaging::markdown::{code, Section};
use crate::application::messaging::HandlerArgs;
use crate::application::registry::{Command, HandlerResult, Registrar};

pub fn register(registrar: &mut Registrar) -> Result<(), RegistryError> {
    registrar.register(
        Command::new("about")
            .with_private(false)
            .with_signature(&["client", "chat", "message"])
            .with_handler(handle),
    )
}

async fn handle(args: HandlerArgs) -> HandlerResult {
    let client = args.client()?;
    let chat = args.chat()?;
    let message = args.message()?;

    let info = Section::new(env!("CARGO_PKG_NAME"))
        .kv("version", code(env!("CARGO_PKG_VERSION")))
        .kv("chat", chat.display_name());
    client.send_message(&message.chat_id, &info.to_string()).await?;
    Ok(())
}
