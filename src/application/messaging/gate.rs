//! Authorization gate - per-event admin check for gated commands
//!
//! Consulted only for admin commands triggered in multi-party chats. The
//! sender's status is queried from the platform on every call; it is never
//! cached, since admin rights can be granted or revoked between events and
//! a stale answer would be a privilege escalation.

use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::Update;
use crate::domain::traits::ChatClient;

/// Decides whether a gated command may run for this update.
///
/// Allows the bot account itself unconditionally, otherwise allows only
/// senders who currently hold admin or owner rights in the originating
/// chat. `Ok(false)` is a silent rejection; a failed platform query
/// propagates instead of defaulting either way.
pub async fn authorize(client: &Arc<dyn ChatClient>, update: &Update) -> Result<bool, BotError> {
    let sender = match update.sender() {
        Some(sender) => sender,
        // Nothing to attest privileges for.
        None => return Ok(false),
    };
    let me = client.me().await?;
    if sender.id == me.id {
        return Ok(true);
    }
    let participant = client.get_participant(&update.chat_id, &sender.id).await?;
    Ok(participant.status.is_admin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ParticipantStatus;
    use crate::testing::{update_from, MockClient};

    fn client() -> Arc<MockClient> {
        Arc::new(MockClient::new())
    }

    #[tokio::test]
    async fn plain_member_is_rejected() {
        let mock = client();
        mock.set_participant("100", "alice", ParticipantStatus::Member);
        let shared: Arc<dyn ChatClient> = mock.clone();
        let update = update_from("100", "alice", ".cleanup");

        assert!(!authorize(&shared, &update).await.expect("gate ran"));
        assert_eq!(mock.get_participant_calls(), 1);
    }

    #[tokio::test]
    async fn admin_and_owner_are_allowed() {
        let mock = client();
        mock.set_participant("100", "alice", ParticipantStatus::Administrator);
        mock.set_participant("100", "bob", ParticipantStatus::Creator);
        let shared: Arc<dyn ChatClient> = mock.clone();

        assert!(authorize(&shared, &update_from("100", "alice", ".cleanup"))
            .await
            .expect("gate ran"));
        assert!(authorize(&shared, &update_from("100", "bob", ".cleanup"))
            .await
            .expect("gate ran"));
    }

    #[tokio::test]
    async fn bot_account_bypasses_the_participant_query() {
        let mock = client();
        // Own account holds no admin rights in this chat.
        mock.set_participant("100", MockClient::SELF_ID, ParticipantStatus::Member);
        let shared: Arc<dyn ChatClient> = mock.clone();
        let update = update_from("100", MockClient::SELF_ID, ".cleanup");

        assert!(authorize(&shared, &update).await.expect("gate ran"));
        assert_eq!(mock.get_participant_calls(), 0);
    }

    #[tokio::test]
    async fn status_is_queried_fresh_on_every_call() {
        let mock = client();
        mock.set_participant("100", "alice", ParticipantStatus::Administrator);
        let shared: Arc<dyn ChatClient> = mock.clone();
        let update = update_from("100", "alice", ".cleanup");

        assert!(authorize(&shared, &update).await.expect("first"));
        // Rights revoked between events.
        mock.set_participant("100", "alice", ParticipantStatus::Member);
        assert!(!authorize(&shared, &update).await.expect("second"));
        assert_eq!(mock.get_participant_calls(), 2);
    }

    #[tokio::test]
    async fn missing_sender_is_rejected_without_platform_calls() {
        let mock = client();
        let shared: Arc<dyn ChatClient> = mock.clone();
        let update = crate::domain::entities::Update::new(
            1,
            crate::domain::entities::UpdateKind::Message,
            "100",
            crate::domain::entities::ChatKind::Group,
        );

        assert!(!authorize(&shared, &update).await.expect("gate ran"));
        assert_eq!(mock.get_participant_calls(), 0);
    }

    #[tokio::test]
    async fn platform_failure_propagates() {
        let mock = client();
        mock.fail_participant_queries(true);
        let shared: Arc<dyn ChatClient> = mock.clone();
        let update = update_from("100", "alice", ".cleanup");

        let err = authorize(&shared, &update).await.unwrap_err();
        assert!(matches!(err, BotError::Network(_)));
    }
}
