// Single-entry mapping commands - addentry / removeentry / listentries

use tracing::info;

use crate::api::platform::InboundMessage;
use crate::error::{CommandError, CommandResult};
use crate::utils::formatters::{render_within_limit, Section};
use crate::BotContext;

pub async fn add_entry(
    bot: &BotContext,
    msg: &InboundMessage,
    args: &[&str],
) -> CommandResult<String> {
    let prefix = bot.settings.prefix;
    if args.len() < 2 {
        return Err(CommandError::Usage {
            usage: format!("{}addentry <マッチング値> <ロール名>", prefix),
        });
    }
    let value = args[0];
    let role = args[1..].join(" ");

    let handle = bot
        .store
        .get(msg.guild_id)
        .ok_or(CommandError::NoMapping { prefix })?;
    let (existed, size) = {
        let mut config = handle.lock().await;
        let table = config
            .mapping
            .as_mut()
            .ok_or(CommandError::NoMapping { prefix })?;
        let existed = table.upsert(value, &role);
        (existed, table.len())
    };

    info!("Entry '{}' -> '{}' saved in guild {}", value, role, msg.guild_id);
    let verb = if existed { "更新しました" } else { "追加しました" };
    Ok(format!(
        "マッピングを{}: `{}` → {}\n現在の登録数: {}件",
        verb, value, role, size
    ))
}

pub async fn remove_entry(
    bot: &BotContext,
    msg: &InboundMessage,
    args: &[&str],
) -> CommandResult<String> {
    let prefix = bot.settings.prefix;
    let Some(value) = args.first() else {
        return Err(CommandError::Usage {
            usage: format!("{}removeentry <マッチング値>", prefix),
        });
    };

    let handle = bot
        .store
        .get(msg.guild_id)
        .ok_or(CommandError::NoMapping { prefix })?;
    let (role, size) = {
        let mut config = handle.lock().await;
        let table = config
            .mapping
            .as_mut()
            .ok_or(CommandError::NoMapping { prefix })?;
        let role = table
            .remove(value)
            .ok_or_else(|| CommandError::ValueNotFound {
                value: value.to_string(),
            })?;
        (role, table.len())
    };

    info!("Entry '{}' removed from guild {}", value, msg.guild_id);
    Ok(format!(
        "マッピングを削除しました: `{}` → {}\n現在の登録数: {}件",
        value, role, size
    ))
}

pub async fn list_entries(bot: &BotContext, msg: &InboundMessage) -> CommandResult<String> {
    let prefix = bot.settings.prefix;
    let handle = bot
        .store
        .get(msg.guild_id)
        .ok_or(CommandError::NoMapping { prefix })?;

    // Render from a copy so the lock is not held while formatting
    let lines: Vec<String> = {
        let config = handle.lock().await;
        let table = config
            .mapping
            .as_ref()
            .ok_or(CommandError::NoMapping { prefix })?;
        table
            .list()
            .into_iter()
            .enumerate()
            .map(|(i, (value, role))| format!("{}. `{}` → {}", i + 1, value, role))
            .collect()
    };

    if lines.is_empty() {
        return Ok("マッピングは空です。".to_string());
    }

    let header = format!("**マッピング一覧** ({}件)", lines.len());
    Ok(render_within_limit(
        &header,
        &[Section::new("", lines)],
        bot.settings.response_limit,
    ))
}
