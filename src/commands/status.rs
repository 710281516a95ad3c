// Status command - show the guild's current configuration

use poise::serenity_prelude as serenity;

use crate::api::platform::InboundMessage;
use crate::error::CommandResult;
use crate::models::guild::GuildConfig;
use crate::utils::config::NOT_SET_LABEL;
use crate::BotContext;

pub async fn status(bot: &BotContext, msg: &InboundMessage) -> CommandResult<String> {
    let Some(handle) = bot.store.get(msg.guild_id) else {
        return Ok("このサーバーではまだ設定が行われていません。".to_string());
    };
    let config = handle.lock().await.clone();
    Ok(render_status(&config))
}

fn channel_label(channel: Option<serenity::ChannelId>) -> String {
    channel.map_or_else(|| NOT_SET_LABEL.to_string(), |id| format!("<#{}>", id))
}

pub fn render_status(config: &GuildConfig) -> String {
    let mut lines = vec![
        "**📊 現在の設定**".to_string(),
        format!("管理チャンネル: {}", channel_label(config.admin_channel_id)),
        format!(
            "ロール付与チャンネル: {}",
            channel_label(config.role_channel_id)
        ),
        format!(
            "CSVデータ: {}",
            config
                .mapping
                .as_ref()
                .map_or_else(|| NOT_SET_LABEL.to_string(), |t| format!("{}件", t.len()))
        ),
    ];

    if let (Some(key), Some(value)) = (config.key_column, config.value_column) {
        lines.push(format!("Key列: {}、Value列: {}", key, value));
    }
    if let Some(updated) = config.mapping_updated_at {
        lines.push(format!("最終更新: <t:{}:R>", updated.timestamp()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::platform::mock::MockPlatform;
    use crate::commands::tests::{admin_msg, run, CHANNEL};
    use crate::models::mapping::MappingTable;

    #[tokio::test]
    async fn test_status_without_config() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());

        let reply = run(&bot, &mock, admin_msg("!status")).await.unwrap();
        assert!(reply.contains("まだ設定が行われていません"));
        assert_eq!(bot.store.len(), 0);
    }

    #[tokio::test]
    async fn test_status_shows_bindings() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());
        run(&bot, &mock, admin_msg("!setchannel")).await;

        let reply = run(&bot, &mock, admin_msg("!status")).await.unwrap();

        assert!(reply.contains(&format!("ロール付与チャンネル: <#{}>", CHANNEL)));
        assert!(reply.contains("管理チャンネル: 未設定"));
        assert!(reply.contains("CSVデータ: 未設定"));
        assert!(!reply.contains("Key列"));
    }

    #[test]
    fn test_render_with_mapping() {
        let mut table = MappingTable::new();
        table.upsert("a", "roleA");
        let mut config = GuildConfig {
            key_column: Some(0),
            value_column: Some(2),
            ..Default::default()
        };
        config.replace_mapping(table);

        let text = render_status(&config);

        assert!(text.contains("CSVデータ: 1件"));
        assert!(text.contains("Key列: 0、Value列: 2"));
        assert!(text.contains("最終更新: <t:"));
    }
}
