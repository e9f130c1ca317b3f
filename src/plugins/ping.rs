//! Round-trip check: answers `ping` with `pong`.

use crate::application::errors::RegistryError;
use crate::application::messaging::HandlerArgs;
use crate::application::registry::{Command, HandlerResult, Registrar};

pub fn register(registrar: &mut Registrar) -> Result<(), RegistryError> {
    registrar.register(
        Command::new("ping")
            .with_private(false)
            .with_signature(&["client", "message"])
            .with_handler(handle),
    )
}

async fn handle(args: HandlerArgs) -> HandlerResult {
    let client = args.client()?;
    let message = args.message()?;
    client.send_message(&message.chat_id, "pong").await?;
    Ok(())
}
