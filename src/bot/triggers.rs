//! Custom trigger/response matching.
//!
//! Triggers are loaded once from a JSON file of the form
//! `[{"trigger": "<regex>", "response": ["...", "..."]}]`. The first trigger
//! whose pattern matches a message answers with one of its responses, chosen
//! at random.

use std::path::Path;

use fancy_regex::Regex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::warn;

use crate::common::error::TriggerError;

/// A trigger as written in the trigger file.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerDefinition {
    pub trigger: String,
    pub response: Vec<String>,
}

/// A compiled trigger with at least one response.
#[derive(Debug, Clone)]
pub struct TriggerRule {
    original: String,
    pattern: Regex,
    responses: Vec<String>,
}

impl TriggerRule {
    pub fn new(pattern: &str, responses: Vec<String>) -> Result<Self, TriggerError> {
        if responses.is_empty() {
            return Err(TriggerError::EmptyResponses {
                pattern: pattern.to_string(),
            });
        }

        let regex = Regex::new(pattern).map_err(|e| TriggerError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            original: pattern.to_string(),
            pattern: regex,
            responses,
        })
    }

    /// Returns true if the pattern matches anywhere in `message`.
    pub fn matches(&self, message: &str) -> bool {
        self.pattern.is_match(message).unwrap_or_else(|e| {
            warn!("Regex match error for trigger '{}': {}", self.original, e);
            false
        })
    }
}

/// Ordered trigger table plus the random source used to pick responses.
#[derive(Debug)]
pub struct TriggerMatcher {
    rules: Vec<TriggerRule>,
    rng: StdRng,
}

impl TriggerMatcher {
    pub fn new(rules: Vec<TriggerRule>) -> Self {
        Self::with_rng(rules, StdRng::from_entropy())
    }

    pub fn with_rng(rules: Vec<TriggerRule>, rng: StdRng) -> Self {
        Self { rules, rng }
    }

    /// A matcher with no triggers, used when no trigger file is configured.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Load and compile the trigger file.
    ///
    /// Any unreadable file, bad regex or trigger without responses fails the
    /// whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TriggerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TriggerError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, TriggerError> {
        let definitions: Vec<TriggerDefinition> = serde_json::from_str(content)?;
        let rules = definitions
            .into_iter()
            .map(|d| TriggerRule::new(&d.trigger, d.response))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Answer for the first matching trigger, with a trailing newline.
    ///
    /// Returns an empty string when no trigger matches.
    pub fn match_triggers(&mut self, message: &str) -> String {
        let Some(rule) = self.rules.iter().find(|rule| rule.matches(message)) else {
            return String::new();
        };

        match rule.responses.choose(&mut self.rng) {
            Some(response) => format!("{}\n", response),
            None => String::new(),
        }
    }
}
