// Per-guild configuration store
//
// Each guild's config sits behind its own async mutex so a command and a
// role match for the same guild never interleave, while different guilds
// never wait on each other. Map shards are only held long enough to clone
// the Arc; no DashMap reference survives an await.

use std::sync::Arc;

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::guild::{GuildConfig, GuildSummary};

pub type GuildHandle = Arc<Mutex<GuildConfig>>;

#[derive(Debug, Default)]
pub struct GuildConfigStore {
    guilds: DashMap<serenity::GuildId, GuildHandle>,
}

/// Point-in-time summary for the status collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildStatus {
    pub guild_id: u64,
    #[serde(flatten)]
    pub summary: GuildSummary,
}

/// Process-level status: readiness plus one line per configured guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub ready: bool,
    pub guild_count: usize,
    pub guilds: Vec<GuildStatus>,
}

impl GuildConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, guild_id: serenity::GuildId) -> Option<GuildHandle> {
        self.guilds.get(&guild_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Fetch the guild's config, creating an all-unset one on first access
    pub fn get_or_create(&self, guild_id: serenity::GuildId) -> GuildHandle {
        let entry = self.guilds.entry(guild_id).or_insert_with(|| {
            debug!("Creating config for guild {}", guild_id);
            Arc::new(Mutex::new(GuildConfig::default()))
        });
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    /// Summaries of every guild, ordered by guild id
    pub async fn snapshot(&self) -> Vec<(serenity::GuildId, GuildSummary)> {
        let mut handles: Vec<(serenity::GuildId, GuildHandle)> = self
            .guilds
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        handles.sort_by_key(|(guild_id, _)| *guild_id);

        let mut summaries = Vec::with_capacity(handles.len());
        for (guild_id, handle) in handles {
            let summary = handle.lock().await.summary();
            summaries.push((guild_id, summary));
        }
        summaries
    }

    pub async fn status_report(&self, ready: bool) -> StatusReport {
        let guilds: Vec<GuildStatus> = self
            .snapshot()
            .await
            .into_iter()
            .map(|(guild_id, summary)| GuildStatus {
                guild_id: guild_id.get(),
                summary,
            })
            .collect();

        StatusReport {
            ready,
            guild_count: guilds.len(),
            guilds,
        }
    }
}
