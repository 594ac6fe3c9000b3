//! Per-message orchestration.
//!
//! Custom triggers answer first and suppress all lookups. Otherwise every card
//! reference is resolved, then every spell reference, and the non-empty
//! results are joined into one reply.

use tracing::{debug, error};

use crate::bot::extract::{extract_card_queries, extract_spell_queries};
use crate::bot::triggers::TriggerMatcher;
use crate::cards::CardResolver;
use crate::common::Reply;
use crate::spells::{SpellOutcome, SpellResolver};

/// Turns message text into a reply.
pub struct Dispatcher {
    triggers: TriggerMatcher,
    cards: CardResolver,
    spells: SpellResolver,
}

impl Dispatcher {
    pub fn new(triggers: TriggerMatcher, cards: CardResolver, spells: SpellResolver) -> Self {
        Self {
            triggers,
            cards,
            spells,
        }
    }

    /// Build the reply for one message. An empty reply means stay silent.
    pub async fn process_message(&mut self, message: &str) -> Reply {
        let mut reply = Reply::new();

        let custom = self.triggers.match_triggers(message);
        if !custom.is_empty() {
            debug!("Custom trigger matched");
            reply.push(custom);
            return reply;
        }

        for query in extract_card_queries(message) {
            let outcome = self.cards.resolve(&query).await;
            debug!("Card '{}' -> {:?}", query, outcome);
            reply.push(outcome.as_reply());
        }

        for query in extract_spell_queries(message) {
            match self.spells.resolve(&query).await {
                SpellOutcome::StoreUnavailable(e) => {
                    error!("Spell lookup for '{}' failed: {}", query, e);
                }
                SpellOutcome::NotFound => {
                    debug!("Spell '{}' not found", query);
                }
                outcome @ SpellOutcome::Found(_) => reply.push(outcome.to_reply()),
            }
        }

        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::bot::triggers::TriggerRule;
    use crate::cards::resolver::{CARD_FETCH_ERROR, CARD_NOT_FOUND};
    use crate::cards::api::{CardApi, CardRecord};
    use crate::cards::CardEndpoints;
    use crate::common::error::{CardApiError, SpellStoreError};
    use crate::spells::store::tests::seeded_store;
    use crate::spells::store::{SpellRecord, SpellStore};

    /// Card API that answers every lookup with printings named after the
    /// `name=` parameter, or nothing for "Missing".
    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CardApi for CountingApi {
        async fn fetch_cards(&self, url: &str) -> Result<Vec<CardRecord>, CardApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = url.trim_start_matches("name=").replace('+', " ");
            match name.as_str() {
                "Missing" => Ok(Vec::new()),
                "Broken" => Err(serde_json::from_str::<CardRecord>("{").unwrap_err().into()),
                "Promo" => Ok(vec![CardRecord {
                    name: name.clone(),
                    rarity: "Special".to_string(),
                    image_url: Some("https://img.example/promo.jpg".to_string()),
                    ..Default::default()
                }]),
                _ => Ok(vec![CardRecord {
                    image_url: Some(format!("https://img.example/{}.jpg", name.replace(' ', "_"))),
                    name: name.clone(),
                    rarity: "Common".to_string(),
                    ..Default::default()
                }]),
            }
        }
    }

    /// Spell store whose connection is always down.
    struct DownStore;

    #[async_trait]
    impl SpellStore for DownStore {
        async fn search_names(&self, _fragment: &str) -> Result<Vec<String>, SpellStoreError> {
            Err(SpellStoreError::Unavailable(sqlx::Error::PoolClosed))
        }

        async fn fetch_spell(&self, _name: &str) -> Result<Option<SpellRecord>, SpellStoreError> {
            Err(SpellStoreError::Unavailable(sqlx::Error::PoolClosed))
        }
    }

    async fn dispatcher(triggers: Vec<TriggerRule>, api: Arc<CountingApi>) -> Dispatcher {
        Dispatcher::new(
            TriggerMatcher::with_rng(triggers, StdRng::seed_from_u64(1)),
            CardResolver::new(api, CardEndpoints::new("name=%s", "name=%s&setName=%s", "name=%s&set=%s")),
            SpellResolver::new(Arc::new(seeded_store().await)),
        )
    }

    #[tokio::test]
    async fn test_trigger_overrides_card_lookup() {
        let api = Arc::new(CountingApi::default());
        let trigger = TriggerRule::new("(?i)hello", vec!["hi there".to_string()]).unwrap();
        let mut dispatcher = dispatcher(vec![trigger], api.clone()).await;

        let reply = dispatcher.process_message("hello, show me [[Shock]]").await;

        assert_eq!(reply.render(), "hi there\n");
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cards_then_spells() {
        let api = Arc::new(CountingApi::default());
        let mut dispatcher = dispatcher(Vec::new(), api.clone()).await;

        let reply = dispatcher
            .process_message("[[Lightning Bolt]] [[Missing]] and &lt;fireball&gt;")
            .await;

        let fragments = reply.fragments();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], "https://img.example/Lightning_Bolt.jpg");
        assert_eq!(fragments[1], CARD_NOT_FOUND);
        assert!(fragments[2].starts_with("> **Fireball**"));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_spell_references_resolved() {
        let mut dispatcher = dispatcher(Vec::new(), Arc::new(CountingApi::default())).await;

        let reply = dispatcher
            .process_message("&lt;Mage Hand&gt; then &lt;Fire Shield&gt;")
            .await;

        assert_eq!(reply.fragments().len(), 2);
        assert!(reply.fragments()[0].starts_with("> **Mage Hand**"));
        assert!(reply.fragments()[1].starts_with("> **Fire Shield**"));
    }

    #[tokio::test]
    async fn test_api_failure_and_filtered_card() {
        let mut dispatcher = dispatcher(Vec::new(), Arc::new(CountingApi::default())).await;

        let reply = dispatcher.process_message("[[Broken]] [[Promo]]").await;

        // The filtered-out printing leaves no blank line behind.
        assert_eq!(reply.render(), CARD_FETCH_ERROR);
    }

    #[tokio::test]
    async fn test_plain_message_is_silent() {
        let mut dispatcher = dispatcher(Vec::new(), Arc::new(CountingApi::default())).await;
        assert!(dispatcher.process_message("just chatting").await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_spell_is_silent() {
        let mut dispatcher = dispatcher(Vec::new(), Arc::new(CountingApi::default())).await;
        assert!(dispatcher.process_message("&lt;Wish&gt;").await.is_empty());
    }

    #[tokio::test]
    async fn test_store_outage_is_silent_but_cards_still_answer() {
        let api = Arc::new(CountingApi::default());
        let mut dispatcher = Dispatcher::new(
            TriggerMatcher::empty(),
            CardResolver::new(api, CardEndpoints::new("name=%s", "name=%s&setName=%s", "name=%s&set=%s")),
            SpellResolver::new(Arc::new(DownStore)),
        );

        let reply = dispatcher.process_message("[[Opt]] &lt;Fireball&gt;").await;

        assert_eq!(reply.render(), "https://img.example/Opt.jpg");
    }
}
