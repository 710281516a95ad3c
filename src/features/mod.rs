// Bot features: message routing, role matching, per-guild state
pub mod dispatcher;
pub mod guild_store;
pub mod role_matcher;
