// Role channel handler - turns a posted value into a role grant
//
// Every message in the bound channel is consumed: matched or not, it is
// deleted, and any feedback the bot posts deletes itself shortly after.

use tracing::{debug, error, info, warn};

use crate::api::platform::InboundMessage;
use crate::utils::cleanup::reply_ephemeral;
use crate::BotContext;

/// What happened to a message posted in the role channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Not the role channel (or no config): nothing was done
    NotRoleChannel,
    /// Text is not a configured value; deleted silently
    NoMatch,
    Granted { role: String },
    GrantFailed { role: String },
    /// The mapping names a role the guild does not have
    RoleMissing { role: String },
}

/// Handle a message if it was posted in the guild's role channel
pub async fn handle_role_message(bot: &BotContext, msg: &InboundMessage) -> MatchOutcome {
    let Some(handle) = bot.store.get(msg.guild_id) else {
        return MatchOutcome::NotRoleChannel;
    };

    // Copy what we need and release the guild lock before any network call
    let role_name = {
        let config = handle.lock().await;
        if config.role_channel_id != Some(msg.channel_id) {
            return MatchOutcome::NotRoleChannel;
        }
        config
            .mapping
            .as_ref()
            .and_then(|table| table.lookup(msg.content.trim()))
            .map(str::to_string)
    };

    let outcome = match role_name {
        Some(role) => grant_matched_role(bot, msg, role).await,
        None => {
            debug!("No mapping for message {} in guild {}", msg.id, msg.guild_id);
            MatchOutcome::NoMatch
        }
    };

    if let Err(e) = bot.platform.delete_message(msg.channel_id, msg.id).await {
        warn!("Failed to delete message {} in role channel: {}", msg.id, e);
    }

    outcome
}

async fn grant_matched_role(bot: &BotContext, msg: &InboundMessage, role: String) -> MatchOutcome {
    let ttl = bot.settings.feedback_ttl;

    let role_id = match bot.platform.resolve_role_by_name(msg.guild_id, &role).await {
        Ok(Some(role_id)) => role_id,
        Ok(None) => {
            warn!("Role '{}' mapped in guild {} does not exist", role, msg.guild_id);
            reply_ephemeral(
                &bot.platform,
                msg.channel_id,
                msg.id,
                &format!("ロール「{}」が見つかりません。", role),
                ttl,
            )
            .await;
            return MatchOutcome::RoleMissing { role };
        }
        Err(e) => {
            error!("Failed to look up role '{}' in guild {}: {}", role, msg.guild_id, e);
            reply_ephemeral(&bot.platform, msg.channel_id, msg.id, "ロールの付与に失敗しました。", ttl)
                .await;
            return MatchOutcome::GrantFailed { role };
        }
    };

    match bot.platform.grant_role(msg.guild_id, msg.author_id, role_id).await {
        Ok(()) => {
            info!("Granted role '{}' to {} in guild {}", role, msg.author_id, msg.guild_id);
            reply_ephemeral(
                &bot.platform,
                msg.channel_id,
                msg.id,
                &format!("ロール「{}」を付与しました！", role),
                ttl,
            )
            .await;
            MatchOutcome::Granted { role }
        }
        Err(e) => {
            error!("Error adding role '{}' to {}: {}", role, msg.author_id, e);
            reply_ephemeral(&bot.platform, msg.channel_id, msg.id, "ロールの付与に失敗しました。", ttl)
                .await;
            MatchOutcome::GrantFailed { role }
        }
    }
}
