// Channel binding commands - setadminchannel / setchannel

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::api::platform::InboundMessage;
use crate::error::{CommandError, CommandResult};
use crate::BotContext;

/// Accept `<#123>` mentions or a bare numeric id
pub fn parse_channel_reference(raw: &str) -> Option<serenity::ChannelId> {
    let digits = raw
        .strip_prefix("<#")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw);
    digits
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(serenity::ChannelId::new)
}

/// Restrict admin commands to the current channel
pub async fn set_admin_channel(bot: &BotContext, msg: &InboundMessage) -> CommandResult<String> {
    let handle = bot.store.get_or_create(msg.guild_id);
    handle.lock().await.admin_channel_id = Some(msg.channel_id);

    info!("Admin channel for guild {} set to {}", msg.guild_id, msg.channel_id);
    Ok("このチャンネルを管理チャンネルに設定しました。以降のコマンドはこのチャンネルでのみ実行できます。".to_string())
}

/// Bind the role channel to the given channel, or the current one
pub async fn set_channel(
    bot: &BotContext,
    msg: &InboundMessage,
    args: &[&str],
) -> CommandResult<String> {
    let channel_id = match args.first() {
        None => msg.channel_id,
        Some(raw) => {
            let not_found = || CommandError::ChannelNotFound {
                reference: raw.to_string(),
            };
            let channel_id = parse_channel_reference(raw).ok_or_else(not_found)?;

            match bot.platform.channel_in_guild(msg.guild_id, channel_id).await {
                Ok(true) => channel_id,
                Ok(false) => return Err(not_found()),
                Err(e) => {
                    warn!("Could not resolve channel {}: {}", channel_id, e);
                    return Err(not_found());
                }
            }
        }
    };

    let handle = bot.store.get_or_create(msg.guild_id);
    handle.lock().await.role_channel_id = Some(channel_id);

    info!("Role channel for guild {} set to {}", msg.guild_id, channel_id);
    if channel_id == msg.channel_id {
        Ok("このチャンネルをロール付与チャンネルに設定しました。".to_string())
    } else {
        Ok(format!("<#{}> をロール付与チャンネルに設定しました。", channel_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::platform::mock::MockPlatform;
    use crate::commands::tests::{admin_msg, run, CHANNEL, GUILD};

    #[test]
    fn test_parse_channel_reference() {
        assert_eq!(
            parse_channel_reference("<#123>"),
            Some(serenity::ChannelId::new(123))
        );
        assert_eq!(
            parse_channel_reference("456"),
            Some(serenity::ChannelId::new(456))
        );
        assert_eq!(parse_channel_reference("<#abc>"), None);
        assert_eq!(parse_channel_reference("general"), None);
        assert_eq!(parse_channel_reference("0"), None);
    }

    #[tokio::test]
    async fn test_setchannel_defaults_to_current() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());

        let reply = run(&bot, &mock, admin_msg("!setchannel")).await.unwrap();
        assert!(reply.contains("このチャンネル"));

        let handle = bot.store.get(serenity::GuildId::new(GUILD)).unwrap();
        assert_eq!(
            handle.lock().await.role_channel_id,
            Some(serenity::ChannelId::new(CHANNEL))
        );
    }

    #[tokio::test]
    async fn test_setchannel_with_mention() {
        let mock = Arc::new(MockPlatform::new().with_channel(555));
        let bot = BotContext::for_tests(mock.clone());

        let reply = run(&bot, &mock, admin_msg("!setchannel <#555>")).await.unwrap();
        assert!(reply.contains("<#555>"));

        let handle = bot.store.get(serenity::GuildId::new(GUILD)).unwrap();
        assert_eq!(
            handle.lock().await.role_channel_id,
            Some(serenity::ChannelId::new(555))
        );
    }

    #[tokio::test]
    async fn test_setchannel_unknown_channel() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());

        let reply = run(&bot, &mock, admin_msg("!setchannel 999")).await.unwrap();
        assert!(reply.contains("見つかりません"));
        assert!(bot.store.get(serenity::GuildId::new(GUILD)).is_none());
    }

    #[tokio::test]
    async fn test_setadminchannel_binds_current() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());

        run(&bot, &mock, admin_msg("!setadminchannel")).await.unwrap();

        let handle = bot.store.get(serenity::GuildId::new(GUILD)).unwrap();
        let config = handle.lock().await;
        assert_eq!(config.admin_channel_id, Some(serenity::ChannelId::new(CHANNEL)));
        assert_eq!(config.role_channel_id, None);
    }
}
