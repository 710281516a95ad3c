// Admin command router
//
// Decision order for a prefixed message: privilege, then admin-channel
// gating, then command name. Each step is a plain function so every branch
// can be exercised without a gateway.

pub mod channel;
pub mod csv_upload;
pub mod entries;
pub mod help;
pub mod status;

use futures::future::join;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};

use crate::api::platform::InboundMessage;
use crate::error::CommandResult;
use crate::utils::cleanup::delete_after;
use crate::utils::formatters::truncate;
use crate::BotContext;

/// Every command the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetAdminChannel,
    SetChannel,
    UploadCsv,
    AddEntry,
    RemoveEntry,
    ListEntries,
    ClearCsv,
    Status,
    Help,
}

impl Command {
    /// Look up a (lower-cased) command name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "setadminchannel" => Some(Command::SetAdminChannel),
            "setchannel" => Some(Command::SetChannel),
            "uploadcsv" => Some(Command::UploadCsv),
            "addentry" => Some(Command::AddEntry),
            "removeentry" => Some(Command::RemoveEntry),
            "listentries" => Some(Command::ListEntries),
            "clearcsv" => Some(Command::ClearCsv),
            "status" => Some(Command::Status),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

/// A prefixed message split into its command name and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// Lower-cased first token
    pub name: String,
    pub args: Vec<&'a str>,
}

/// Split `content` into command + whitespace-separated args.
///
/// Returns `None` when the prefix is missing or nothing follows it.
pub fn parse_command(prefix: char, content: &str) -> Option<ParsedCommand<'_>> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some(ParsedCommand {
        name,
        args: tokens.collect(),
    })
}

/// Where a command may run, given the sender and the guild's admin channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Sender lacks privilege; nothing is posted
    Ignore,
    /// Admin channel is set elsewhere; warn and clean up, do not run
    WrongChannel { admin_channel: serenity::ChannelId },
    Execute,
}

pub fn gate(
    is_admin: bool,
    admin_channel: Option<serenity::ChannelId>,
    channel: serenity::ChannelId,
) -> Gate {
    match (is_admin, admin_channel) {
        (false, _) => Gate::Ignore,
        (true, Some(admin_channel)) if admin_channel != channel => {
            Gate::WrongChannel { admin_channel }
        }
        (true, _) => Gate::Execute,
    }
}

/// How a prefixed message was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    NotACommand,
    Ignored,
    Rejected,
    Unknown,
    Executed(Command),
}

/// Route a message that may be an admin command
pub async fn handle_command(bot: &BotContext, msg: &InboundMessage) -> CommandOutcome {
    let Some(parsed) = parse_command(bot.settings.prefix, &msg.content) else {
        return CommandOutcome::NotACommand;
    };

    let admin_channel = match bot.store.get(msg.guild_id) {
        Some(handle) => {
            let config = handle.lock().await;
            config.admin_channel_id
        }
        None => None,
    };

    match gate(msg.author_is_admin, admin_channel, msg.channel_id) {
        Gate::Ignore => {
            debug!("Ignoring '{}' from non-admin {}", parsed.name, msg.author_id);
            CommandOutcome::Ignored
        }
        Gate::WrongChannel { admin_channel } => {
            reject_wrong_channel(bot, msg, admin_channel).await;
            CommandOutcome::Rejected
        }
        Gate::Execute => match Command::from_name(&parsed.name) {
            Some(command) => {
                info!(
                    "{:?} from {} in guild {}",
                    command, msg.author_id, msg.guild_id
                );
                let result = execute(bot, msg, command, &parsed.args).await;
                respond(bot, msg, result).await;
                CommandOutcome::Executed(command)
            }
            None => {
                debug!("Unknown command '{}' ignored", parsed.name);
                CommandOutcome::Unknown
            }
        },
    }
}

async fn execute(
    bot: &BotContext,
    msg: &InboundMessage,
    command: Command,
    args: &[&str],
) -> CommandResult<String> {
    match command {
        Command::SetAdminChannel => channel::set_admin_channel(bot, msg).await,
        Command::SetChannel => channel::set_channel(bot, msg, args).await,
        Command::UploadCsv => csv_upload::upload_csv(bot, msg, args).await,
        Command::AddEntry => entries::add_entry(bot, msg, args).await,
        Command::RemoveEntry => entries::remove_entry(bot, msg, args).await,
        Command::ListEntries => entries::list_entries(bot, msg).await,
        Command::ClearCsv => csv_upload::clear_csv(bot, msg).await,
        Command::Status => status::status(bot, msg).await,
        Command::Help => Ok(help::help_text(bot.settings.prefix)),
    }
}

async fn respond(bot: &BotContext, msg: &InboundMessage, result: CommandResult<String>) {
    let text = match result {
        Ok(text) => text,
        Err(e) => {
            if e.is_external() {
                error!("Command failed in guild {}: {:?}", msg.guild_id, e);
            } else {
                debug!("Command rejected in guild {}: {}", msg.guild_id, e);
            }
            e.to_string()
        }
    };

    let text = truncate(&text, bot.settings.response_limit);
    if let Err(e) = bot.platform.send_reply(msg.channel_id, msg.id, &text).await {
        error!("Failed to send command response: {}", e);
    }
}

/// Warn about the admin channel, then remove both the warning and the command
async fn reject_wrong_channel(
    bot: &BotContext,
    msg: &InboundMessage,
    admin_channel: serenity::ChannelId,
) {
    warn!(
        "Command from {} in {} outside admin channel {}",
        msg.author_id, msg.channel_id, admin_channel
    );

    let warning = format!(
        "コマンドは管理チャンネル <#{}> でのみ使用できます。",
        admin_channel
    );
    let reply = bot
        .platform
        .send_reply(msg.channel_id, msg.id, &warning)
        .await;

    let platform = bot.platform.clone();
    let channel_id = msg.channel_id;
    let command_id = msg.id;
    let delay = bot.settings.admin_warning_ttl;

    match reply {
        Ok(warning_id) => {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let (warning_result, command_result) = join(
                    platform.delete_message(channel_id, warning_id),
                    platform.delete_message(channel_id, command_id),
                )
                .await;
                if let Err(e) = warning_result {
                    warn!("Failed to delete admin-channel warning: {}", e);
                }
                if let Err(e) = command_result {
                    warn!("Failed to delete misplaced command: {}", e);
                }
            });
        }
        Err(e) => {
            error!("Failed to send admin-channel warning: {}", e);
            delete_after(platform, channel_id, command_id, delay);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::api::platform::mock::MockPlatform;
    use crate::api::platform::AttachmentRef;
    use crate::models::mapping::MappingTable;

    pub const GUILD: u64 = 1;
    pub const CHANNEL: u64 = 200;

    /// An admin's message in CHANNEL
    pub fn admin_msg(content: &str) -> InboundMessage {
        InboundMessage {
            id: serenity::MessageId::new(700),
            guild_id: serenity::GuildId::new(GUILD),
            channel_id: serenity::ChannelId::new(CHANNEL),
            author_id: serenity::UserId::new(9),
            author_is_bot: false,
            author_is_admin: true,
            content: content.to_string(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut msg: InboundMessage, filename: &str, url: &str) -> InboundMessage {
        msg.attachments.push(AttachmentRef {
            filename: filename.to_string(),
            url: url.to_string(),
        });
        msg
    }

    /// Run a message through the router and return the reply it produced
    pub async fn run(bot: &BotContext, mock: &MockPlatform, msg: InboundMessage) -> Option<String> {
        let before = mock.replies().len();
        handle_command(bot, &msg).await;
        let replies = mock.replies();
        (replies.len() > before).then(|| replies[replies.len() - 1].content.clone())
    }

    pub async fn bot_with_empty_mapping(mock: Arc<MockPlatform>) -> BotContext {
        let bot = BotContext::for_tests(mock);
        bot.store
            .get_or_create(serenity::GuildId::new(GUILD))
            .lock()
            .await
            .mapping = Some(MappingTable::new());
        bot
    }

    #[test]
    fn test_parse_command() {
        let parsed = parse_command('!', "!AddEntry  student 学生 クラス").unwrap();
        assert_eq!(parsed.name, "addentry");
        assert_eq!(parsed.args, vec!["student", "学生", "クラス"]);

        assert_eq!(parse_command('!', "hello"), None);
        assert_eq!(parse_command('!', "!"), None);
        assert_eq!(parse_command('!', "!   "), None);
        assert_eq!(parse_command('?', "!status"), None);
        assert_eq!(parse_command('!', "  !status").unwrap().name, "status");
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::from_name("uploadcsv"), Some(Command::UploadCsv));
        assert_eq!(Command::from_name("help"), Some(Command::Help));
        assert_eq!(Command::from_name("who"), None);
    }

    #[test]
    fn test_gate_decision_table() {
        let here = serenity::ChannelId::new(1);
        let there = serenity::ChannelId::new(2);

        assert_eq!(gate(false, None, here), Gate::Ignore);
        assert_eq!(gate(false, Some(here), here), Gate::Ignore);
        assert_eq!(gate(false, Some(there), here), Gate::Ignore);
        assert_eq!(gate(true, None, here), Gate::Execute);
        assert_eq!(gate(true, Some(here), here), Gate::Execute);
        assert_eq!(
            gate(true, Some(there), here),
            Gate::WrongChannel { admin_channel: there }
        );
    }

    #[tokio::test]
    async fn test_non_admin_never_mutates() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());

        for content in ["!setchannel", "!setadminchannel", "!addentry a b", "!clearcsv", "!help"] {
            let mut msg = admin_msg(content);
            msg.author_is_admin = false;
            assert_eq!(handle_command(&bot, &msg).await, CommandOutcome::Ignored);
        }

        assert!(mock.replies().is_empty());
        assert_eq!(bot.store.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_channel_warns_and_cleans_up() {
        let mock = Arc::new(MockPlatform::new());
        let bot = bot_with_empty_mapping(mock.clone()).await;
        let admin_channel = serenity::ChannelId::new(CHANNEL + 1);
        bot.store
            .get_or_create(serenity::GuildId::new(GUILD))
            .lock()
            .await
            .admin_channel_id = Some(admin_channel);

        let outcome = handle_command(&bot, &admin_msg("!addentry student 学生")).await;
        assert_eq!(outcome, CommandOutcome::Rejected);

        let handle = bot.store.get(serenity::GuildId::new(GUILD)).unwrap();
        assert!(handle.lock().await.mapping.as_ref().unwrap().is_empty());

        let warning = mock.replies()[0].clone();
        assert!(warning.content.contains(&format!("<#{}>", admin_channel)));
        assert!(mock.deleted().is_empty());

        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        let deleted = mock.deleted();
        assert!(deleted.contains(&warning.id));
        assert!(deleted.contains(&serenity::MessageId::new(700)));
    }

    #[tokio::test]
    async fn test_admin_channel_allows_commands_there() {
        let mock = Arc::new(MockPlatform::new());
        let bot = bot_with_empty_mapping(mock.clone()).await;
        bot.store
            .get_or_create(serenity::GuildId::new(GUILD))
            .lock()
            .await
            .admin_channel_id = Some(serenity::ChannelId::new(CHANNEL));

        let reply = run(&bot, &mock, admin_msg("!addentry student 学生")).await;
        assert!(reply.unwrap().contains("追加"));
    }

    #[tokio::test]
    async fn test_unknown_command_is_silent() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());

        let outcome = handle_command(&bot, &admin_msg("!frobnicate now")).await;

        assert_eq!(outcome, CommandOutcome::Unknown);
        assert!(mock.replies().is_empty());
        assert_eq!(bot.store.len(), 0);
    }

    #[tokio::test]
    async fn test_plain_text_is_not_a_command() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());
        let outcome = handle_command(&bot, &admin_msg("hello")).await;
        assert_eq!(outcome, CommandOutcome::NotACommand);
    }

    #[tokio::test]
    async fn test_help_uses_configured_prefix() {
        let mock = Arc::new(MockPlatform::new());
        let bot = BotContext::for_tests(mock.clone());

        let reply = run(&bot, &mock, admin_msg("!HELP")).await.unwrap();
        assert!(reply.contains("`!uploadcsv <KeyColumnId> <ValueColumnId>`"));
        assert!(reply.contains("`!setadminchannel`"));
    }
}
