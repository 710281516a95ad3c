// Centralized configuration for SortingHat

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Prefix used when COMMAND_PREFIX is not set
pub const DEFAULT_PREFIX: char = '!';

/// Lifetime of grant/failure notices in the role channel
pub const DEFAULT_FEEDBACK_DELETE_SECS: u64 = 5;

/// Lifetime of the "wrong channel" warning before it and the command vanish
pub const DEFAULT_ADMIN_WARNING_DELETE_SECS: u64 = 5;

/// Discord rejects message content longer than this many characters
pub const MESSAGE_CHAR_LIMIT: usize = 2000;

/// Runtime settings loaded from the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub prefix: char,
    pub feedback_ttl: Duration,
    pub admin_warning_ttl: Duration,
    pub response_limit: usize,
}

impl Settings {
    /// Read settings from process environment (after dotenvy has run)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup, so tests need not touch the real environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing {
                name: "DISCORD_TOKEN",
            })?;

        let prefix = match lookup("COMMAND_PREFIX") {
            None => DEFAULT_PREFIX,
            Some(raw) => {
                let mut chars = raw.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_whitespace() => c,
                    _ => {
                        return Err(ConfigError::Invalid {
                            name: "COMMAND_PREFIX",
                            message: format!("expected a single character, got '{}'", raw),
                        })
                    }
                }
            }
        };

        let feedback_ttl = parse_secs(
            &lookup,
            "FEEDBACK_DELETE_SECS",
            DEFAULT_FEEDBACK_DELETE_SECS,
        )?;
        let admin_warning_ttl = parse_secs(
            &lookup,
            "ADMIN_WARNING_DELETE_SECS",
            DEFAULT_ADMIN_WARNING_DELETE_SECS,
        )?;

        Ok(Self {
            token,
            prefix,
            feedback_ttl,
            admin_warning_ttl,
            response_limit: MESSAGE_CHAR_LIMIT,
        })
    }
}

fn parse_secs<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::Invalid {
                name,
                message: e.to_string(),
            }),
    }
}

/// Placeholder shown by `status` for unset bindings
pub const NOT_SET_LABEL: &str = "未設定";
