//! Card API client.
//!
//! Talks to a magicthegathering.io style endpoint that answers a name search
//! with `{"cards": [...]}`, one record per printing, oldest printing first.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::common::error::CardApiError;

/// One printing of a card as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CardRecord {
    pub name: String,
    #[serde(rename = "multiverseid", default)]
    pub multiverse_id: Option<u64>,
    #[serde(default)]
    pub set: String,
    #[serde(rename = "setName", default)]
    pub set_name: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rarity: String,
    #[serde(rename = "type", default)]
    pub card_type: Option<String>,
}

impl CardRecord {
    /// Image URL, or an empty string if the printing has none.
    pub fn image_url(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }
}

/// Response body of a card search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardList {
    #[serde(default)]
    pub cards: Vec<CardRecord>,
}

/// Source of card printings.
#[async_trait]
pub trait CardApi: Send + Sync {
    /// Fetch all printings returned for a lookup URL, in API order.
    async fn fetch_cards(&self, url: &str) -> Result<Vec<CardRecord>, CardApiError>;
}

/// reqwest-backed card API client.
#[derive(Debug, Clone)]
pub struct HttpCardApi {
    client: reqwest::Client,
}

impl HttpCardApi {
    pub fn new() -> Result<Self, CardApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mtgbot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CardApi for HttpCardApi {
    async fn fetch_cards(&self, url: &str) -> Result<Vec<CardRecord>, CardApiError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CardApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let list = decode_card_list(&body)?;
        debug!("Card API returned {} printings", list.cards.len());
        Ok(list.cards)
    }
}

/// Decode a card search response body.
pub fn decode_card_list(body: &[u8]) -> Result<CardList, CardApiError> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_card_list() {
        let body = br#"{
            "cards": [
                {
                    "name": "Shock",
                    "multiverseid": 4810,
                    "set": "STH",
                    "setName": "Stronghold",
                    "imageUrl": "http://gatherer.wizards.com/Handlers/Image.ashx?multiverseid=4810&type=card",
                    "rarity": "Common",
                    "type": "Instant"
                },
                {
                    "name": "Shock",
                    "set": "pFNM",
                    "setName": "Friday Night Magic",
                    "rarity": "Special"
                }
            ]
        }"#;

        let list = decode_card_list(body).unwrap();
        assert_eq!(list.cards.len(), 2);
        assert_eq!(list.cards[0].multiverse_id, Some(4810));
        assert_eq!(list.cards[0].set_name, "Stronghold");
        assert_eq!(list.cards[0].card_type.as_deref(), Some("Instant"));
        assert_eq!(list.cards[1].image_url(), "");
        assert_eq!(list.cards[1].multiverse_id, None);
    }

    #[test]
    fn test_decode_missing_cards_is_empty() {
        let list = decode_card_list(b"{}").unwrap();
        assert!(list.cards.is_empty());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_card_list(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(CardApiError::Decode(_))));
    }
}
