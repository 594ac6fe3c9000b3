//! Card query parsing and API endpoint selection.
//!
//! A query is either `Name` or `Name|Set`, where `Set` is a 2-3 character
//! alphanumeric set code (`7ED`, `M10`) or otherwise a full set name.

use std::sync::LazyLock;

use fancy_regex::Regex;
use url::form_urlencoded;

use crate::config::Config;

static SET_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]{2,3}$").unwrap());

/// Set disambiguation attached to a card query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetFilter {
    /// Full set name, e.g. "Seventh Edition".
    Name(String),
    /// Short set code, e.g. "7ED".
    Code(String),
}

/// A parsed `[[...]]` card request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardQuery {
    pub name: String,
    pub set: Option<SetFilter>,
}

impl CardQuery {
    /// Parse a raw query string.
    ///
    /// Only a single `|` separator selects a set; with none or several the
    /// text before the first `|` is searched by name alone.
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split('|').collect();
        let name = parts[0].trim().to_string();

        let set = match parts.as_slice() {
            [_, set] => {
                let set = set.trim();
                if is_set_code(set) {
                    Some(SetFilter::Code(set.to_string()))
                } else {
                    Some(SetFilter::Name(set.to_string()))
                }
            }
            _ => None,
        };

        Self { name, set }
    }
}

/// Returns true if `value` looks like a set code rather than a set name.
pub fn is_set_code(value: &str) -> bool {
    SET_CODE_PATTERN.is_match(value).unwrap_or(false)
}

/// URL templates for the three card API lookups.
#[derive(Debug, Clone)]
pub struct CardEndpoints {
    name_only: String,
    name_and_set: String,
    name_and_code: String,
}

impl CardEndpoints {
    pub fn new(
        name_only: impl Into<String>,
        name_and_set: impl Into<String>,
        name_and_code: impl Into<String>,
    ) -> Self {
        Self {
            name_only: name_only.into(),
            name_and_set: name_and_set.into(),
            name_and_code: name_and_code.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.mtg_api_name_only.clone(),
            config.mtg_api_name_set.clone(),
            config.mtg_api_name_code.clone(),
        )
    }

    /// Build the lookup URL for a query.
    ///
    /// The card name and set name are form-encoded; set codes are passed
    /// through since they are already URL-safe.
    pub fn url_for(&self, query: &CardQuery) -> String {
        let name = query_escape(&query.name);
        match &query.set {
            None => fill_template(&self.name_only, &[&name]),
            Some(SetFilter::Name(set_name)) => {
                fill_template(&self.name_and_set, &[&name, &query_escape(set_name)])
            }
            Some(SetFilter::Code(code)) => fill_template(&self.name_and_code, &[&name, code]),
        }
    }
}

/// Form-encode a query component (spaces become `+`).
fn query_escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Substitute `%s` slots left to right. Extra slots are left untouched.
fn fill_template(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len() + 32);
    let mut rest = template;
    let mut args = args.iter();

    while let Some(index) = rest.find("%s") {
        let Some(arg) = args.next() else {
            break;
        };
        result.push_str(&rest[..index]);
        result.push_str(arg);
        rest = &rest[index + 2..];
    }
    result.push_str(rest);

    result
}
