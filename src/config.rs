//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Literal database path that selects the in-memory store.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Where per-user and per-conversation state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process-local, lost on restart.
    Memory,
    /// libSQL database file.
    LibSql(PathBuf),
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot account id, used as the recipient of inbound activities.
    pub name: String,
    /// State backend.
    pub storage: StorageConfig,
    /// Whether to serve the HTTP activity endpoint.
    pub http_enabled: bool,
    /// Port for the HTTP activity endpoint.
    pub http_port: u16,
    /// Whether to run the stdin/stdout REPL.
    pub cli_enabled: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "profile-bot".to_string(),
            storage: StorageConfig::LibSql(PathBuf::from("./data/profile-bot.db")),
            http_enabled: true,
            http_port: 3978,
            cli_enabled: true,
        }
    }
}

impl BotConfig {
    /// Build config from `PROFILE_BOT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let name = lookup("PROFILE_BOT_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.name);

        let storage = match lookup("PROFILE_BOT_DB_PATH") {
            Some(path) if path.trim() == IN_MEMORY_DB => StorageConfig::Memory,
            Some(path) if !path.trim().is_empty() => {
                StorageConfig::LibSql(PathBuf::from(path.trim()))
            }
            _ => defaults.storage,
        };

        let http_port = match lookup("PROFILE_BOT_HTTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "PROFILE_BOT_HTTP_PORT".to_string(),
                message: format!("{raw:?} is not a port number: {e}"),
            })?,
            None => defaults.http_port,
        };

        let http_enabled = parse_flag(&lookup, "PROFILE_BOT_HTTP_ENABLED", defaults.http_enabled)?;
        let cli_enabled = parse_flag(&lookup, "PROFILE_BOT_CLI_ENABLED", defaults.cli_enabled)?;

        Ok(Self {
            name,
            storage,
            http_enabled,
            http_port,
            cli_enabled,
        })
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?} is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = BotConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.name, "profile-bot");
        assert_eq!(config.http_port, 3978);
        assert!(config.http_enabled);
        assert!(config.cli_enabled);
        assert_eq!(
            config.storage,
            StorageConfig::LibSql(PathBuf::from("./data/profile-bot.db"))
        );
    }

    #[test]
    fn memory_storage_selected_by_literal() {
        let config =
            BotConfig::from_lookup(lookup_from(&[("PROFILE_BOT_DB_PATH", ":memory:")])).unwrap();
        assert_eq!(config.storage, StorageConfig::Memory);
    }

    #[test]
    fn overrides_are_applied() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("PROFILE_BOT_NAME", "greeter"),
            ("PROFILE_BOT_DB_PATH", "/tmp/bot.db"),
            ("PROFILE_BOT_HTTP_PORT", "8081"),
            ("PROFILE_BOT_HTTP_ENABLED", "no"),
            ("PROFILE_BOT_CLI_ENABLED", "FALSE"),
        ]))
        .unwrap();
        assert_eq!(config.name, "greeter");
        assert_eq!(config.http_port, 8081);
        assert!(!config.http_enabled);
        assert!(!config.cli_enabled);
        assert_eq!(config.storage, StorageConfig::LibSql(PathBuf::from("/tmp/bot.db")));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = BotConfig::from_lookup(lookup_from(&[("PROFILE_BOT_HTTP_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "PROFILE_BOT_HTTP_PORT"));
    }

    #[test]
    fn bad_flag_is_rejected() {
        let err = BotConfig::from_lookup(lookup_from(&[("PROFILE_BOT_CLI_ENABLED", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
