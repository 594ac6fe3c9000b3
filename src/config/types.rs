//! Configuration type definitions.

use serde::Deserialize;

/// Default location of the spell database.
pub const DEFAULT_SPELL_DB_PATH: &str = "./dndbot.db";

/// Root configuration structure.
///
/// Keys match the classic JSON config file, so an existing `config.json`
/// loads as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Card API URL template with one `%s` slot (card name).
    pub mtg_api_name_only: String,
    /// Card API URL template with two `%s` slots (card name, set name).
    pub mtg_api_name_set: String,
    /// Card API URL template with two `%s` slots (card name, set code).
    pub mtg_api_name_code: String,
    /// Path to the custom trigger/response file. Absent disables triggers.
    pub custom_path: Option<String>,
    /// Chat platform credential.
    #[serde(alias = "slack_key")]
    pub discord_token: String,
    /// Path to the SQLite spell database.
    #[serde(default = "default_spell_db_path")]
    pub spell_db_path: String,
}

fn default_spell_db_path() -> String {
    DEFAULT_SPELL_DB_PATH.to_string()
}

impl Config {
    /// Trigger file path, treating an empty string as unset.
    pub fn custom_path(&self) -> Option<&str> {
        self.custom_path.as_deref().filter(|path| !path.is_empty())
    }
}
