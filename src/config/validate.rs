//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Placeholder token shipped in the sample config.
const PLACEHOLDER_TOKEN: &str = "YOUR_DISCORD_TOKEN_HERE";

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.discord_token.is_empty() {
        errors.push("discord_token is required".to_string());
    }
    if config.discord_token == PLACEHOLDER_TOKEN {
        errors.push("discord_token has not been configured (still using placeholder)".to_string());
    }

    let templates = [
        ("mtg_api_name_only", &config.mtg_api_name_only, 1),
        ("mtg_api_name_set", &config.mtg_api_name_set, 2),
        ("mtg_api_name_code", &config.mtg_api_name_code, 2),
    ];
    for (field, template, expected) in templates {
        let slots = template.matches("%s").count();
        if slots != expected {
            errors.push(format!(
                "{} must contain {} '%s' slot(s) (got {})",
                field, expected, slots
            ));
        }
    }

    if config.spell_db_path.is_empty() {
        errors.push("spell_db_path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
