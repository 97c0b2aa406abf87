use std::path::PathBuf;
use anyhow::{bail, Context as _};
use tracing::Level;

pub const DEFAULT_PREFIX: &str = "!!";
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Settings read from the environment (and an optional `.env` file)
#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    /// Directory holding `stickers.json` and `resources/`, else the working directory
    pub sticker_root: Option<PathBuf>,
    pub logs_dir: PathBuf,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").context("Expected DISCORD_TOKEN in env")?;
        let command_prefix = get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if command_prefix.chars().any(char::is_whitespace) {
            bail!("COMMAND_PREFIX must not contain whitespace");
        }

        let log_level = match get("LOG_LEVEL") {
            Some(level) => level
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid LOG_LEVEL: {level}"))?,
            None => Level::INFO,
        };

        Ok(Config {
            discord_token,
            command_prefix,
            sticker_root: get("STICKER_ROOT").map(PathBuf::from),
            logs_dir: get("LOGS_DIR").map(PathBuf::from).unwrap_or_else(|| DEFAULT_LOGS_DIR.into()),
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.command_prefix, DEFAULT_PREFIX);
        assert_eq!(config.sticker_root, None);
        assert_eq!(config.logs_dir, PathBuf::from(DEFAULT_LOGS_DIR));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("DISCORD_TOKEN", "abc"),
            ("COMMAND_PREFIX", "?"),
            ("STICKER_ROOT", "/srv/stickers"),
            ("LOGS_DIR", "/var/log/bot"),
            ("LOG_LEVEL", "debug"),
        ])
        .unwrap();
        assert_eq!(config.command_prefix, "?");
        assert_eq!(config.sticker_root, Some(PathBuf::from("/srv/stickers")));
        assert_eq!(config.logs_dir, PathBuf::from("/var/log/bot"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn requires_token() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("LOG_LEVEL", "loud")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "abc"), ("COMMAND_PREFIX", "! !")]).is_err());
    }
}
