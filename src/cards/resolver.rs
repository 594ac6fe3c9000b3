//! Card lookup and printing selection.
//!
//! The API's name search is fuzzy, so a lookup can return unrelated cards and
//! many printings of each. Printings are ranked newest first:
//!
//! 1. printings without an image, with a special rarity, or of type
//!    Vanguard are rejected
//! 2. a case-insensitive exact name match wins immediately
//! 3. a name starting with the query followed by `,` or ` ` is preferred
//!    over a printing that does not
//! 4. otherwise the first qualifying printing is kept

use std::fmt;
use std::sync::Arc;

use fancy_regex::Regex;
use tracing::{debug, warn};

use crate::cards::api::{CardApi, CardRecord};
use crate::cards::query::{CardEndpoints, CardQuery};
use crate::cards::rarity::is_allowed_rarity;

/// Reply when the API returns no printings.
pub const CARD_NOT_FOUND: &str = "Card not found :(";

/// Reply when the API request or decoding fails.
pub const CARD_FETCH_ERROR: &str = "Error fetching card from API. See bot logs.";

/// Type line of cards that are never shown.
const VANGUARD_TYPE: &str = "Vanguard";

/// How a single printing ranks against the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Rejected,
    Exact,
    Prefix,
    Other,
}

/// Ranks printings for one card name.
#[derive(Debug)]
pub struct PrintingRanker {
    name: String,
    prefix_pattern: Option<Regex>,
}

impl PrintingRanker {
    pub fn new(name: &str) -> Self {
        let pattern = format!("(?i)^{}(,| )", fancy_regex::escape(name));
        let prefix_pattern = match Regex::new(&pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Could not build prefix pattern for '{}': {}", name, e);
                None
            }
        };

        Self {
            name: name.to_string(),
            prefix_pattern,
        }
    }

    /// Returns true if the printing may be shown at all.
    pub fn qualifies(card: &CardRecord) -> bool {
        !card.image_url().is_empty()
            && is_allowed_rarity(&card.rarity)
            && card.card_type.as_deref() != Some(VANGUARD_TYPE)
    }

    /// Returns true if `name` is the query followed by a comma or space.
    pub fn is_prefix_match(&self, name: &str) -> bool {
        self.prefix_pattern
            .as_ref()
            .map(|regex| regex.is_match(name).unwrap_or(false))
            .unwrap_or(false)
    }

    pub fn rank(&self, card: &CardRecord) -> Rank {
        if !Self::qualifies(card) {
            Rank::Rejected
        } else if card.name.to_lowercase() == self.name.to_lowercase() {
            Rank::Exact
        } else if self.is_prefix_match(&card.name) {
            Rank::Prefix
        } else {
            Rank::Other
        }
    }

    /// Pick the printing to show from API-ordered (oldest first) printings.
    pub fn select<'a>(&self, printings: &'a [CardRecord]) -> Option<&'a CardRecord> {
        let mut best: Option<(&CardRecord, Rank)> = None;

        for card in printings.iter().rev() {
            match self.rank(card) {
                Rank::Rejected => continue,
                Rank::Exact => return Some(card),
                Rank::Prefix => {
                    if !matches!(best, Some((_, Rank::Prefix))) {
                        best = Some((card, Rank::Prefix));
                    }
                }
                rank @ Rank::Other => {
                    if best.is_none() {
                        best = Some((card, rank));
                    }
                }
            }
        }

        best.map(|(card, _)| card)
    }
}

/// Result of resolving one card reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardOutcome {
    /// Image URL of the selected printing.
    Image(String),
    /// Printings were found but none could be shown.
    NoQualifyingPrinting,
    NotFound,
    FetchFailed,
}

impl CardOutcome {
    /// Chat text for this outcome. Empty if nothing should be posted.
    pub fn as_reply(&self) -> &str {
        match self {
            CardOutcome::Image(url) => url,
            CardOutcome::NoQualifyingPrinting => "",
            CardOutcome::NotFound => CARD_NOT_FOUND,
            CardOutcome::FetchFailed => CARD_FETCH_ERROR,
        }
    }
}

impl fmt::Display for CardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reply())
    }
}

/// Resolves `[[...]]` references to card image URLs.
pub struct CardResolver {
    api: Arc<dyn CardApi>,
    endpoints: CardEndpoints,
}

impl CardResolver {
    pub fn new(api: Arc<dyn CardApi>, endpoints: CardEndpoints) -> Self {
        Self { api, endpoints }
    }

    /// Resolve a raw query such as `Counterspell|7ED`.
    ///
    /// Never fails: API errors become a diagnostic outcome.
    pub async fn resolve(&self, raw: &str) -> CardOutcome {
        let query = CardQuery::parse(raw);
        let url = self.endpoints.url_for(&query);

        let printings = match self.api.fetch_cards(&url).await {
            Ok(printings) => printings,
            Err(e) => {
                warn!("Card lookup for '{}' failed: {}", raw, e);
                return CardOutcome::FetchFailed;
            }
        };

        if printings.is_empty() {
            debug!("No printings found for '{}'", raw);
            return CardOutcome::NotFound;
        }

        match PrintingRanker::new(&query.name).select(&printings) {
            Some(card) => {
                debug!(
                    "Selected '{}' from {} ({}), multiverse id {:?}",
                    card.name, card.set_name, card.set, card.multiverse_id
                );
                CardOutcome::Image(card.image_url().to_string())
            }
            None => {
                debug!("All {} printings of '{}' were filtered out", printings.len(), raw);
                CardOutcome::NoQualifyingPrinting
            }
        }
    }
}
