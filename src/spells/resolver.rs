//! Spell lookup and formatting.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::common::error::SpellStoreError;
use crate::spells::store::{SpellRecord, SpellStore};

/// Result of resolving one spell reference.
#[derive(Debug)]
pub enum SpellOutcome {
    Found(SpellRecord),
    /// No spell name matched, or the matched spell has no full record.
    NotFound,
    /// The store could not be queried.
    StoreUnavailable(SpellStoreError),
}

impl SpellOutcome {
    /// Chat text for this outcome. Empty unless a spell was found.
    pub fn to_reply(&self) -> String {
        match self {
            SpellOutcome::Found(spell) => format_spell(spell),
            SpellOutcome::NotFound | SpellOutcome::StoreUnavailable(_) => String::new(),
        }
    }
}

/// Pick the closest spell name for `query`.
///
/// A case-insensitive exact match wins outright. Otherwise the name that
/// compares greatest against the query is kept, the earliest one on ties.
pub fn closest_spell_name<'a>(names: &'a [String], query: &str) -> Option<&'a str> {
    let query = query.to_lowercase();
    let mut best: Option<(&str, Ordering)> = None;

    for name in names {
        let closeness = name.to_lowercase().as_str().cmp(query.as_str());
        if closeness == Ordering::Equal {
            return Some(name.as_str());
        }
        if best.map_or(true, |(_, incumbent)| closeness > incumbent) {
            best = Some((name.as_str(), closeness));
        }
    }

    best.map(|(name, _)| name)
}

/// Format a spell as a block quote with a bold title and italic subtitle.
pub fn format_spell(spell: &SpellRecord) -> String {
    let mut text = format!(
        "> **{}**\n> _Level {} {} Spell_",
        spell.name, spell.level, spell.school
    );
    for line in spell.description.lines() {
        text.push_str("\n> ");
        text.push_str(line);
    }
    text
}

/// Resolves `<...>` references against the spell store.
pub struct SpellResolver {
    store: Arc<dyn SpellStore>,
}

impl SpellResolver {
    pub fn new(store: Arc<dyn SpellStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, query: &str) -> SpellOutcome {
        let names = match self.store.search_names(query).await {
            Ok(names) => names,
            Err(e) => return SpellOutcome::StoreUnavailable(e),
        };

        let Some(name) = closest_spell_name(&names, query) else {
            debug!("No spell matching '{}'", query);
            return SpellOutcome::NotFound;
        };

        match self.store.fetch_spell(name).await {
            Ok(Some(spell)) => SpellOutcome::Found(spell),
            Ok(None) => {
                warn!("Spell '{}' matched '{}' but has no full record", name, query);
                SpellOutcome::NotFound
            }
            Err(e) => SpellOutcome::StoreUnavailable(e),
        }
    }
}
