//! Reference extraction from message text.
//!
//! - `[[Card Name]]` or `[[Card Name|Set]]` for cards
//! - `&lt;Spell Name&gt;` for spells (message text arrives HTML-escaped)

use std::sync::LazyLock;

use fancy_regex::Regex;
use tracing::warn;

static CARD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[\[[\w ,.!?:|()/'"-]+\]\]"#).unwrap());

static SPELL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;[\w ']+&gt;").unwrap());

const SPELL_OPEN: &str = "&lt;";
const SPELL_CLOSE: &str = "&gt;";

/// Extract card queries in message order. Empty if there are none.
pub fn extract_card_queries(message: &str) -> Vec<String> {
    find_all(&CARD_PATTERN, message)
        .into_iter()
        .map(|m| m[2..m.len() - 2].trim().to_string())
        .collect()
}

/// Extract spell queries in message order. Empty if there are none.
pub fn extract_spell_queries(message: &str) -> Vec<String> {
    find_all(&SPELL_PATTERN, message)
        .into_iter()
        .map(|m| m[SPELL_OPEN.len()..m.len() - SPELL_CLOSE.len()].to_string())
        .collect()
}

fn find_all<'a>(pattern: &Regex, message: &'a str) -> Vec<&'a str> {
    pattern
        .find_iter(message)
        .filter_map(|m| match m {
            Ok(m) => Some(m.as_str()),
            Err(e) => {
                warn!("Reference pattern failed on message: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_queries_in_order() {
        let queries = extract_card_queries("play [[Lightning Bolt]] then [[Counterspell|7ED]]");
        assert_eq!(queries, vec!["Lightning Bolt", "Counterspell|7ED"]);
    }

    #[test]
    fn test_no_card_references() {
        assert!(extract_card_queries("no brackets here").is_empty());
    }

    #[test]
    fn test_blank_card_reference_is_an_empty_query() {
        assert_eq!(extract_card_queries("[[   ]]"), vec![String::new()]);
    }

    #[test]
    fn test_unterminated_brackets_do_not_match_across() {
        let queries = extract_card_queries("[[Shock and then [[Opt]]");
        assert_eq!(queries, vec!["Opt"]);
    }

    #[test]
    fn test_card_punctuation() {
        let queries =
            extract_card_queries(r#"[[Ach! Hans, Run!]] [[Fire/Ice]] [["Ach" (Hans)?: Run-Away]]"#);
        assert_eq!(
            queries,
            vec!["Ach! Hans, Run!", "Fire/Ice", r#""Ach" (Hans)?: Run-Away"#]
        );
    }

    #[test]
    fn test_card_query_trimmed() {
        assert_eq!(extract_card_queries("[[ Opt ]]"), vec!["Opt"]);
    }

    #[test]
    fn test_spell_queries() {
        let queries = extract_spell_queries("cast &lt;Fireball&gt; and &lt;Tenser's Disk&gt;");
        assert_eq!(queries, vec!["Fireball", "Tenser's Disk"]);
    }

    #[test]
    fn test_raw_angle_brackets_are_not_spells() {
        assert!(extract_spell_queries("cast <Fireball>").is_empty());
    }

    #[test]
    fn test_spell_rejects_punctuation() {
        assert!(extract_spell_queries("&lt;Fire-ball&gt;").is_empty());
    }

    #[test]
    fn test_both_reference_kinds() {
        let message = "[[Fireball]] vs &lt;Fireball&gt;";
        assert_eq!(extract_card_queries(message), vec!["Fireball"]);
        assert_eq!(extract_spell_queries(message), vec!["Fireball"]);
    }
}
