// Discord implementation of the chat platform, backed by serenity's HTTP client and cache

use std::sync::Arc;

use ::serenity::async_trait;
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use crate::api::platform::{AttachmentRef, ChatPlatform, InboundMessage};
use crate::error::PlatformResult;

const GRANT_AUDIT_REASON: &str = "SortingHat: matched value in role channel";

/// Live Discord connection used by all outbound calls
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<serenity::Http>,
    cache: Arc<serenity::Cache>,
    http_client: reqwest::Client,
}

impl DiscordPlatform {
    pub fn new(ctx: &serenity::Context, http_client: reqwest::Client) -> Self {
        Self {
            http: ctx.http.clone(),
            cache: ctx.cache.clone(),
            http_client,
        }
    }

    /// Owner or any role carrying ADMINISTRATOR counts as admin
    async fn is_admin(&self, guild_id: serenity::GuildId, user_id: serenity::UserId) -> bool {
        let member = match guild_id.member(&self.http, user_id).await {
            Ok(member) => member,
            Err(e) => {
                warn!("Failed to fetch member {} in guild {}: {:?}", user_id, guild_id, e);
                return false;
            }
        };

        let Some(guild) = guild_id.to_guild_cached(&self.cache) else {
            debug!("Guild {} not cached, treating {} as non-admin", guild_id, user_id);
            return false;
        };

        if guild.owner_id == user_id {
            return true;
        }

        let everyone = serenity::RoleId::new(guild_id.get());
        member
            .roles
            .iter()
            .chain(std::iter::once(&everyone))
            .filter_map(|role_id| guild.roles.get(role_id))
            .any(|role| role.permissions.contains(serenity::Permissions::ADMINISTRATOR))
    }

    /// Reduce a serenity message to the routing shape.
    ///
    /// The privilege lookup costs an API call, so it only happens for
    /// messages that start with the command prefix.
    pub async fn inbound(&self, msg: &serenity::Message, prefix: char) -> Option<InboundMessage> {
        let guild_id = msg.guild_id?;

        let author_is_admin = if !msg.author.bot && msg.content.trim_start().starts_with(prefix) {
            self.is_admin(guild_id, msg.author.id).await
        } else {
            false
        };

        Some(InboundMessage {
            id: msg.id,
            guild_id,
            channel_id: msg.channel_id,
            author_id: msg.author.id,
            author_is_bot: msg.author.bot,
            author_is_admin,
            content: msg.content.clone(),
            attachments: msg
                .attachments
                .iter()
                .map(|a| AttachmentRef {
                    filename: a.filename.clone(),
                    url: a.url.clone(),
                })
                .collect(),
        })
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    async fn send_reply(
        &self,
        channel: serenity::ChannelId,
        reply_to: serenity::MessageId,
        content: &str,
    ) -> PlatformResult<serenity::MessageId> {
        let reply = channel
            .send_message(
                &self.http,
                serenity::CreateMessage::new()
                    .content(content)
                    .reference_message((channel, reply_to)),
            )
            .await?;
        Ok(reply.id)
    }

    async fn delete_message(
        &self,
        channel: serenity::ChannelId,
        message: serenity::MessageId,
    ) -> PlatformResult<()> {
        channel.delete_message(&self.http, message).await?;
        Ok(())
    }

    async fn resolve_role_by_name(
        &self,
        guild: serenity::GuildId,
        name: &str,
    ) -> PlatformResult<Option<serenity::RoleId>> {
        let cached = guild.to_guild_cached(&self.cache).map(|g| {
            g.roles
                .values()
                .find(|role| role.name == name)
                .map(|role| role.id)
        });

        match cached {
            Some(found) => Ok(found),
            None => {
                let roles = guild.roles(&self.http).await?;
                Ok(roles
                    .values()
                    .find(|role| role.name == name)
                    .map(|role| role.id))
            }
        }
    }

    async fn grant_role(
        &self,
        guild: serenity::GuildId,
        user: serenity::UserId,
        role: serenity::RoleId,
    ) -> PlatformResult<()> {
        self.http
            .add_member_role(guild, user, role, Some(GRANT_AUDIT_REASON))
            .await?;
        Ok(())
    }

    async fn channel_in_guild(
        &self,
        guild: serenity::GuildId,
        channel: serenity::ChannelId,
    ) -> PlatformResult<bool> {
        let channel = self.http.get_channel(channel).await?;
        Ok(channel.guild().is_some_and(|gc| gc.guild_id == guild))
    }

    async fn fetch_attachment(&self, url: &str) -> PlatformResult<Vec<u8>> {
        let bytes = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
