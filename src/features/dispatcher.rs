// Message dispatcher - decides whether a guild message is an admin command
// or a post for the role channel

use tracing::debug;

use crate::api::platform::InboundMessage;
use crate::commands::{handle_command, parse_command, CommandOutcome};
use crate::features::role_matcher::{handle_role_message, MatchOutcome};
use crate::BotContext;

/// Which handler consumed a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Sent by a bot (including ourselves)
    FromBot,
    Command(CommandOutcome),
    Matcher(MatchOutcome),
}

/// Route one inbound guild message.
///
/// Admin messages carrying the prefix go to the command router and never
/// reach the matcher. Everything else, including a non-admin's `!x` in the
/// role channel, is treated as a posted value.
pub async fn handle_message(bot: &BotContext, msg: &InboundMessage) -> Dispatch {
    if msg.author_is_bot {
        return Dispatch::FromBot;
    }

    if msg.author_is_admin && parse_command(bot.settings.prefix, &msg.content).is_some() {
        return Dispatch::Command(handle_command(bot, msg).await);
    }

    let outcome = handle_role_message(bot, msg).await;
    debug!("Message {} in guild {}: {:?}", msg.id, msg.guild_id, outcome);
    Dispatch::Matcher(outcome)
}
