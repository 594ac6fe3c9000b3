//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `MTGBOT_DISCORD_TOKEN` - Discord bot token
//! - `MTGBOT_SPELL_DB` - Path to the spell database
//! - `MTGBOT_CUSTOM_PATH` - Path to the custom trigger file
//! - `MTGBOT_CONFIG` - Config file path when none is given on the command line

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "MTGBOT";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord_token = token;
    }
    if let Ok(path) = env::var(format!("{}_SPELL_DB", ENV_PREFIX)) {
        config.spell_db_path = path;
    }
    if let Ok(path) = env::var(format!("{}_CUSTOM_PATH", ENV_PREFIX)) {
        config.custom_path = Some(path);
    }

    config
}

/// Resolve the config file path.
///
/// The command line argument wins, then `MTGBOT_CONFIG`, then `./config.json`.
pub fn get_config_path(cli_path: Option<String>) -> String {
    cli_path
        .or_else(|| env::var(format!("{}_CONFIG", ENV_PREFIX)).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}
