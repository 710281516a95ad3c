use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serde::Serialize;

use crate::models::mapping::MappingTable;

/// Guild (Server) specific configuration
#[derive(Debug, Clone, Default)]
pub struct GuildConfig {
    /// Channel where posted values are matched and roles granted
    pub role_channel_id: Option<serenity::ChannelId>,
    /// When set, admin commands only run in this channel
    pub admin_channel_id: Option<serenity::ChannelId>,
    /// None until the first upload; an empty table is still "configured"
    pub mapping: Option<MappingTable>,
    /// Columns used by the last upload
    pub key_column: Option<usize>,
    pub value_column: Option<usize>,
    pub mapping_updated_at: Option<DateTime<Utc>>,
}

impl GuildConfig {
    /// Swap in a new table, returning the size of the one it replaced
    pub fn replace_mapping(&mut self, table: MappingTable) -> Option<usize> {
        let previous = self.mapping.replace(table).map(|old| old.len());
        self.mapping_updated_at = Some(Utc::now());
        previous
    }

    pub fn summary(&self) -> GuildSummary {
        GuildSummary {
            has_mapping: self.mapping.is_some(),
            entry_count: self.mapping.as_ref().map_or(0, MappingTable::len),
            role_channel_bound: self.role_channel_id.is_some(),
            admin_channel_bound: self.admin_channel_id.is_some(),
        }
    }
}

/// Read-only view of a guild for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuildSummary {
    pub has_mapping: bool,
    pub entry_count: usize,
    pub role_channel_bound: bool,
    pub admin_channel_bound: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary_is_unset() {
        let summary = GuildConfig::default().summary();
        assert!(!summary.has_mapping);
        assert_eq!(summary.entry_count, 0);
        assert!(!summary.role_channel_bound);
        assert!(!summary.admin_channel_bound);
    }

    #[test]
    fn test_replace_mapping_reports_previous_size() {
        let mut config = GuildConfig::default();
        let mut table = MappingTable::new();
        table.upsert("x", "roleA");

        assert_eq!(config.replace_mapping(table), None);
        assert_eq!(config.replace_mapping(MappingTable::new()), Some(1));
        assert!(config.mapping_updated_at.is_some());

        let summary = config.summary();
        assert!(summary.has_mapping);
        assert_eq!(summary.entry_count, 0);
    }
}
