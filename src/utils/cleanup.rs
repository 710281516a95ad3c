// Delayed deletion of transient messages

use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, warn};

use crate::api::platform::ChatPlatform;

/// Delete a message once `delay` has passed.
///
/// Fire-and-forget: the caller never waits, failures (including the message
/// already being gone) are logged and not retried.
pub fn delete_after(
    platform: Arc<dyn ChatPlatform>,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match platform.delete_message(channel_id, message_id).await {
            Ok(()) => debug!("Deleted transient message {} in {}", message_id, channel_id),
            Err(e) => warn!("Failed to delete transient message {}: {}", message_id, e),
        }
    });
}

/// Reply to a message and schedule the reply for deletion
pub async fn reply_ephemeral(
    platform: &Arc<dyn ChatPlatform>,
    channel_id: serenity::ChannelId,
    reply_to: serenity::MessageId,
    content: &str,
    ttl: Duration,
) -> Option<serenity::MessageId> {
    match platform.send_reply(channel_id, reply_to, content).await {
        Ok(reply_id) => {
            delete_after(Arc::clone(platform), channel_id, reply_id, ttl);
            Some(reply_id)
        }
        Err(e) => {
            error!("Failed to send reply in {}: {}", channel_id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::platform::mock::MockPlatform;

    #[tokio::test(start_paused = true)]
    async fn test_reply_is_deleted_after_ttl() {
        let mock = Arc::new(MockPlatform::new());
        let platform: Arc<dyn ChatPlatform> = mock.clone();
        let channel = serenity::ChannelId::new(1);

        let reply_id = reply_ephemeral(
            &platform,
            channel,
            serenity::MessageId::new(2),
            "done",
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(mock.deleted().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(mock.deleted(), vec![reply_id]);
    }
}
