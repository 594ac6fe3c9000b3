//! Card rarity filtering.
//!
//! Filters out promotional, masterpiece and other special printings that the
//! card API reports under their own rarity tiers.

/// Rarities a printing may have to be shown in chat.
pub const ALLOWED_RARITIES: [&str; 6] = [
    "Common",
    "Uncommon",
    "Rare",
    "Mythic Rare",
    "Mythic",
    "Basic Land",
];

/// Returns true if a printing with this rarity may be returned.
pub fn is_allowed_rarity(rarity: &str) -> bool {
    ALLOWED_RARITIES.contains(&rarity)
}
