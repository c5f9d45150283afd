//! Legacy collection import
//!
//! Older releases stored the collection against a previous catalog
//! generation, with capitalized JSON keys and differently built card ids.
//! Import walks each owned card through a strategy chain from the most
//! reliable key (printed collector code) down to fuzzy name similarity,
//! reusing the scanner's resolution function so the two paths cannot
//! disagree about what a name maps to.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;
use tracing::{debug, info, warn};

use super::{CardIndex, CatalogCard};
use crate::analysis::resolve_best;

/// Minimum similarity for a fuzzy name match to count
const FUZZY_MATCH_THRESHOLD: f32 = 0.85;

/// One owned card from a legacy collection file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyCard {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(rename = "setName", alias = "Set_Name", default)]
    pub set_name: String,
    #[serde(rename = "cardNumber", alias = "Card_Num", default)]
    pub card_number: Option<u32>,
    #[serde(rename = "uniqueId", alias = "Unique_ID", default)]
    pub unique_id: Option<String>,
}

/// Which strategy produced a migration match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMethod {
    #[serde(rename = "uniqueId")]
    UniqueId,
    #[serde(rename = "name+set")]
    NameAndSet,
    #[serde(rename = "number+set")]
    NumberAndSet,
    #[serde(rename = "resolver")]
    Resolver,
    #[serde(rename = "fuzzy")]
    FuzzyName,
}

/// A legacy card mapped onto the current catalog
#[derive(Debug, Clone, Serialize)]
pub struct Migration {
    pub legacy: LegacyCard,
    pub matched: CatalogCard,
    pub method: MatchMethod,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyFile {
    Wrapped { cards: Vec<LegacyCard> },
    Bare(Vec<LegacyCard>),
}

/// Load a legacy collection file.
///
/// Accepts either a bare card array or an object with a `cards` field, in
/// both current and legacy key spellings.
pub fn load_legacy_collection(path: &Path) -> Result<Vec<LegacyCard>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read collection file {:?}", path))?;
    let file: LegacyFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse collection file {:?}", path))?;

    Ok(match file {
        LegacyFile::Wrapped { cards } => cards,
        LegacyFile::Bare(cards) => cards,
    })
}

/// Map every legacy card onto the current catalog.
///
/// Strategies run most reliable first: collector code, name within set,
/// collector number within set, the scanner's resolver over a name search,
/// then fuzzy name similarity within the set. Cards no strategy matches are
/// logged and left out of the result.
pub fn migrate_collection(index: &CardIndex, legacy: &[LegacyCard]) -> Vec<Migration> {
    let mut migrations = Vec::new();

    for old in legacy {
        match match_legacy_card(index, old) {
            Some((matched, method)) => {
                debug!("Matched '{}' via {:?}", old.name, method);
                migrations.push(Migration {
                    legacy: old.clone(),
                    matched,
                    method,
                });
            }
            None => warn!(
                "No catalog match for legacy card '{}' ({})",
                old.name, old.set_name
            ),
        }
    }

    info!(
        "Migrated {} of {} legacy cards",
        migrations.len(),
        legacy.len()
    );
    migrations
}

fn match_legacy_card(index: &CardIndex, old: &LegacyCard) -> Option<(CatalogCard, MatchMethod)> {
    if let Some(uid) = old.unique_id.as_deref() {
        if let Some(card) = index.find_by_unique_id(uid) {
            return Some((card, MatchMethod::UniqueId));
        }
    }

    if !old.set_name.is_empty() {
        if let Some(card) = index.find_by_name_and_set(&old.name, &old.set_name) {
            return Some((card, MatchMethod::NameAndSet));
        }
        if let Some(number) = old.card_number {
            if let Some(card) = index.find_by_number_and_set(number, &old.set_name) {
                return Some((card, MatchMethod::NumberAndSet));
            }
        }
    }

    // Covers set renames between catalog generations
    let results = index.search_cards(&old.name);
    if let Some(card) = resolve_best(&old.name, &results) {
        return Some((card.clone(), MatchMethod::Resolver));
    }

    if !old.set_name.is_empty() {
        if let Some(card) = fuzzy_match_in_set(index, old) {
            return Some((card, MatchMethod::FuzzyName));
        }
    }

    None
}

/// Best fuzzy name match within the legacy card's set
fn fuzzy_match_in_set(index: &CardIndex, old: &LegacyCard) -> Option<CatalogCard> {
    let mut best: Option<(f32, CatalogCard)> = None;

    for card in index.cards_in_set(&old.set_name) {
        let score = name_similarity(&old.name, &card.name)
            .max(name_similarity(&old.name, card.main_name()));
        if score >= FUZZY_MATCH_THRESHOLD && best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, card));
        }
    }

    best.map(|(_, card)| card)
}

/// Similarity from 0.0 (different) to 1.0 (identical), tolerant of case and
/// punctuation drift between catalog generations
fn name_similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let base = normalized_levenshtein(&a_lower, &b_lower) as f32;

    let a_stripped: String = a_lower.chars().filter(|c| c.is_alphanumeric()).collect();
    let b_stripped: String = b_lower.chars().filter(|c| c.is_alphanumeric()).collect();
    let stripped = if !a_stripped.is_empty() && !b_stripped.is_empty() {
        normalized_levenshtein(&a_stripped, &b_stripped) as f32
    } else {
        0.0
    };

    base.max(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardVariant;

    fn catalog_card(name: &str, set: &str, number: u32, unique_id: &str) -> CatalogCard {
        CatalogCard {
            id: format!("{}_{}", set.replace(' ', "_"), number),
            name: name.to_string(),
            set_name: set.to_string(),
            card_number: Some(number),
            unique_id: Some(unique_id.to_string()),
            variant: CardVariant::Normal,
        }
    }

    fn legacy(name: &str, set: &str) -> LegacyCard {
        LegacyCard {
            id: String::new(),
            name: name.to_string(),
            set_name: set.to_string(),
            card_number: None,
            unique_id: None,
        }
    }

    fn sample_index() -> CardIndex {
        let index = CardIndex::new();
        index.load_cards(vec![
            catalog_card(
                "Mickey Mouse - Brave Little Tailor",
                "The First Chapter",
                12,
                "TFC-012",
            ),
            catalog_card("Elsa - Snow Queen", "The First Chapter", 42, "TFC-042"),
            catalog_card(
                "Dalmatian Puppy - Tail Wagger",
                "Promo Set 1",
                17,
                "P1-017",
            ),
        ]);
        index
    }

    #[test]
    fn test_unique_id_match_wins_over_name() {
        let index = sample_index();
        let mut old = legacy("Totally Wrong Name", "The First Chapter");
        old.unique_id = Some("TFC-042".to_string());

        let (matched, method) = match_legacy_card(&index, &old).expect("match");

        assert_eq!(matched.name, "Elsa - Snow Queen");
        assert_eq!(method, MatchMethod::UniqueId);
    }

    #[test]
    fn test_name_and_set_match_ignores_case() {
        let index = sample_index();
        let old = legacy("mickey mouse - brave little tailor", "the first chapter");

        let (matched, method) = match_legacy_card(&index, &old).expect("match");

        assert_eq!(matched.unique_id.as_deref(), Some("TFC-012"));
        assert_eq!(method, MatchMethod::NameAndSet);
    }

    #[test]
    fn test_number_and_set_match_survives_garbled_name() {
        let index = sample_index();
        let mut old = legacy("M1ckey M0use", "The First Chapter");
        old.card_number = Some(12);

        let (matched, method) = match_legacy_card(&index, &old).expect("match");

        assert_eq!(matched.name, "Mickey Mouse - Brave Little Tailor");
        assert_eq!(method, MatchMethod::NumberAndSet);
    }

    #[test]
    fn test_resolver_match_survives_set_rename() {
        let index = sample_index();
        // "Promo" became "Promo Set 1" in the current catalog
        let old = legacy("Dalmatian Puppy - Tail Wagger", "Promo");

        let (matched, method) = match_legacy_card(&index, &old).expect("match");

        assert_eq!(matched.set_name, "Promo Set 1");
        assert_eq!(method, MatchMethod::Resolver);
    }

    #[test]
    fn test_fuzzy_match_catches_typo() {
        let index = sample_index();
        let old = legacy("Elsa - Snow Quen", "The First Chapter");

        let (matched, method) = match_legacy_card(&index, &old).expect("match");

        assert_eq!(matched.name, "Elsa - Snow Queen");
        assert_eq!(method, MatchMethod::FuzzyName);
    }

    #[test]
    fn test_dissimilar_card_stays_unmatched() {
        let index = sample_index();
        let old = legacy("Aurora - Briar Rose", "The First Chapter");

        assert!(match_legacy_card(&index, &old).is_none());
    }

    #[test]
    fn test_migrate_collection_keeps_only_matches() {
        let index = sample_index();
        let cards = vec![
            legacy("Elsa - Snow Queen", "The First Chapter"),
            legacy("Aurora - Briar Rose", "The First Chapter"),
            legacy("Mickey Mouse - Brave Little Tailor", "The First Chapter"),
        ];

        let migrations = migrate_collection(&index, &cards);

        assert_eq!(migrations.len(), 2);
        assert!(migrations
            .iter()
            .all(|m| m.method == MatchMethod::NameAndSet));
    }

    #[test]
    fn test_load_legacy_collection_with_capitalized_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("collection.json");
        std::fs::write(
            &path,
            r#"{"cards": [{
                "Name": "Elsa - Snow Queen",
                "Set_Name": "The First Chapter",
                "Card_Num": 42,
                "Unique_ID": "TFC-042"
            }]}"#,
        )
        .expect("write");

        let cards = load_legacy_collection(&path).expect("load");

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Elsa - Snow Queen");
        assert_eq!(cards[0].card_number, Some(42));
        assert_eq!(cards[0].unique_id.as_deref(), Some("TFC-042"));
    }

    #[test]
    fn test_load_legacy_collection_bare_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("collection.json");
        std::fs::write(
            &path,
            r#"[{"name": "Lantern", "setName": "The First Chapter"}]"#,
        )
        .expect("write");

        let cards = load_legacy_collection(&path).expect("load");

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Lantern");
    }

    #[test]
    fn test_name_similarity_tolerates_punctuation() {
        assert!(name_similarity("Elsas Snow Queen", "Elsa's Snow Queen") > 0.9);
        assert_eq!(name_similarity("", ""), 1.0);
        assert_eq!(name_similarity("Elsa", ""), 0.0);
        assert!(name_similarity("Elsa - Snow Queen", "Maui - Demigod") < 0.5);
    }
}
