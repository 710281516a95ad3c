// Chat platform seam: the inbound event shape and the outbound calls the bot makes

use poise::serenity_prelude as serenity;
use ::serenity::async_trait;

use crate::error::PlatformResult;

/// File attached to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
}

/// A guild message, reduced to what routing and matching need
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: serenity::MessageId,
    pub guild_id: serenity::GuildId,
    pub channel_id: serenity::ChannelId,
    pub author_id: serenity::UserId,
    pub author_is_bot: bool,
    /// Administrator-equivalent privilege in this guild
    pub author_is_admin: bool,
    pub content: String,
    pub attachments: Vec<AttachmentRef>,
}

/// Outbound operations against the chat platform.
///
/// Every call is independently fallible; callers decide whether a failure is
/// reported or only logged.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post `content` in `channel` as a reply to `reply_to`, returning the new message id
    async fn send_reply(
        &self,
        channel: serenity::ChannelId,
        reply_to: serenity::MessageId,
        content: &str,
    ) -> PlatformResult<serenity::MessageId>;

    async fn delete_message(
        &self,
        channel: serenity::ChannelId,
        message: serenity::MessageId,
    ) -> PlatformResult<()>;

    /// Find a role in the guild whose name matches exactly
    async fn resolve_role_by_name(
        &self,
        guild: serenity::GuildId,
        name: &str,
    ) -> PlatformResult<Option<serenity::RoleId>>;

    async fn grant_role(
        &self,
        guild: serenity::GuildId,
        user: serenity::UserId,
        role: serenity::RoleId,
    ) -> PlatformResult<()>;

    /// Whether `channel` exists and belongs to `guild`
    async fn channel_in_guild(
        &self,
        guild: serenity::GuildId,
        channel: serenity::ChannelId,
    ) -> PlatformResult<bool>;

    async fn fetch_attachment(&self, url: &str) -> PlatformResult<Vec<u8>>;
}
