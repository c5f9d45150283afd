//! In-memory card index
//!
//! Loads the per-set JSON data files into one flat list and serves exact and
//! substring lookups over it. Loading is tolerant: a file that fails to parse
//! is skipped with a warning so one corrupt set cannot take down the catalog.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::{CardCatalog, CatalogCard, SetFile};

/// Thread-safe in-memory catalog backed by per-set JSON files
#[derive(Debug, Default)]
pub struct CardIndex {
    cards: RwLock<Vec<CatalogCard>>,
    loaded: AtomicBool,
}

impl CardIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents with an already-built card list
    pub fn load_cards(&self, cards: Vec<CatalogCard>) {
        let count = cards.len();
        *self.cards.write() = cards;
        self.loaded.store(true, Ordering::SeqCst);
        info!("Card index loaded with {} cards", count);
    }

    /// Load every set data file in a directory.
    ///
    /// Files are read in name order. Cards without their own set name inherit
    /// the file-level one. Returns the number of cards loaded.
    pub fn load_sets_dir(&self, dir: &Path) -> Result<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read catalog directory {:?}", dir))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut cards = Vec::new();
        for path in &paths {
            match load_set_file(path) {
                Ok(set) => {
                    for mut card in set.cards {
                        if card.set_name.is_empty() {
                            card.set_name = set.set_name.clone();
                        }
                        cards.push(card);
                    }
                }
                Err(e) => warn!("Skipping catalog file {:?}: {}", path, e),
            }
        }

        let count = cards.len();
        self.load_cards(cards);
        Ok(count)
    }

    /// Number of cards currently indexed
    pub fn card_count(&self) -> usize {
        self.cards.read().len()
    }

    /// Exact lookup by printed collector code
    pub fn find_by_unique_id(&self, unique_id: &str) -> Option<CatalogCard> {
        self.cards
            .read()
            .iter()
            .find(|card| card.unique_id.as_deref() == Some(unique_id))
            .cloned()
    }

    /// Case-insensitive lookup by full name within a set
    pub fn find_by_name_and_set(&self, name: &str, set_name: &str) -> Option<CatalogCard> {
        self.cards
            .read()
            .iter()
            .find(|card| {
                card.name.eq_ignore_ascii_case(name) && card.set_name.eq_ignore_ascii_case(set_name)
            })
            .cloned()
    }

    /// Lookup by collector number within a set
    pub fn find_by_number_and_set(&self, number: u32, set_name: &str) -> Option<CatalogCard> {
        self.cards
            .read()
            .iter()
            .find(|card| {
                card.card_number == Some(number) && card.set_name.eq_ignore_ascii_case(set_name)
            })
            .cloned()
    }

    /// All cards belonging to one set
    pub fn cards_in_set(&self, set_name: &str) -> Vec<CatalogCard> {
        self.cards
            .read()
            .iter()
            .filter(|card| card.set_name.eq_ignore_ascii_case(set_name))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over full names
    pub fn search_cards(&self, query: &str) -> Vec<CatalogCard> {
        let lower = query.to_lowercase();
        self.cards
            .read()
            .iter()
            .filter(|card| card.name.to_lowercase().contains(&lower))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CardCatalog for CardIndex {
    fn is_data_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    async fn search(&self, query: &str) -> Vec<CatalogCard> {
        self.search_cards(query)
    }
}

/// Load one set data file
fn load_set_file(path: &Path) -> Result<SetFile> {
    let content = std::fs::read_to_string(path)?;
    let set: SetFile = serde_json::from_str(&content)?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardVariant;

    fn card(name: &str, set: &str, number: u32, unique_id: &str) -> CatalogCard {
        CatalogCard {
            id: format!("{}_{}", set.replace(' ', "_"), number),
            name: name.to_string(),
            set_name: set.to_string(),
            card_number: Some(number),
            unique_id: Some(unique_id.to_string()),
            variant: CardVariant::Normal,
        }
    }

    fn sample_index() -> CardIndex {
        let index = CardIndex::new();
        index.load_cards(vec![
            card(
                "Mickey Mouse - Brave Little Tailor",
                "The First Chapter",
                12,
                "TFC-012",
            ),
            card("Elsa - Snow Queen", "The First Chapter", 42, "TFC-042"),
            card("Elsa - Spirit of Winter", "Rise of the Floodborn", 37, "ROF-037"),
        ]);
        index
    }

    #[test]
    fn test_new_index_is_not_loaded() {
        let index = CardIndex::new();
        assert!(!index.is_data_loaded());
        assert_eq!(index.card_count(), 0);
    }

    #[test]
    fn test_load_cards_marks_loaded() {
        let index = sample_index();
        assert!(index.is_data_loaded());
        assert_eq!(index.card_count(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let index = sample_index();

        let hits = index.search_cards("elsa");
        assert_eq!(hits.len(), 2);

        let hits = index.search_cards("BRAVE LITTLE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mickey Mouse - Brave Little Tailor");

        assert!(index.search_cards("Aladdin").is_empty());
    }

    #[test]
    fn test_find_by_unique_id() {
        let index = sample_index();

        let found = index.find_by_unique_id("ROF-037").expect("hit");
        assert_eq!(found.name, "Elsa - Spirit of Winter");

        assert!(index.find_by_unique_id("TFC-999").is_none());
    }

    #[test]
    fn test_find_by_name_and_set_ignores_case() {
        let index = sample_index();

        let found = index
            .find_by_name_and_set("elsa - snow queen", "the first chapter")
            .expect("hit");
        assert_eq!(found.unique_id.as_deref(), Some("TFC-042"));

        assert!(index
            .find_by_name_and_set("Elsa - Snow Queen", "Rise of the Floodborn")
            .is_none());
    }

    #[test]
    fn test_find_by_number_and_set() {
        let index = sample_index();

        let found = index
            .find_by_number_and_set(37, "Rise of the Floodborn")
            .expect("hit");
        assert_eq!(found.name, "Elsa - Spirit of Winter");

        assert!(index.find_by_number_and_set(37, "The First Chapter").is_none());
    }

    #[test]
    fn test_cards_in_set() {
        let index = sample_index();
        assert_eq!(index.cards_in_set("The First Chapter").len(), 2);
        assert_eq!(index.cards_in_set("Rise of the Floodborn").len(), 1);
        assert!(index.cards_in_set("Ursula's Return").is_empty());
    }

    #[test]
    fn test_load_sets_dir_fills_missing_set_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("the_first_chapter.json"),
            r#"{
                "setName": "The First Chapter",
                "setCode": "TFC",
                "cards": [
                    {"name": "Lantern", "cardNumber": 100},
                    {"name": "Elsa - Snow Queen", "setName": "Elsewhere", "cardNumber": 42}
                ]
            }"#,
        )
        .expect("write");

        let index = CardIndex::new();
        let count = index.load_sets_dir(dir.path()).expect("load");

        assert_eq!(count, 2);
        assert!(index.is_data_loaded());
        let lantern = index.find_by_number_and_set(100, "The First Chapter").expect("hit");
        assert_eq!(lantern.name, "Lantern");
        // a card-level set name is never overwritten
        assert!(index.find_by_number_and_set(42, "Elsewhere").is_some());
    }

    #[test]
    fn test_load_sets_dir_skips_corrupt_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broken.json"), "{not json").expect("write");
        std::fs::write(
            dir.path().join("ursulas_return.json"),
            r#"{"setName": "Ursula's Return", "cards": [{"name": "Lantern"}]}"#,
        )
        .expect("write");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let index = CardIndex::new();
        let count = index.load_sets_dir(dir.path()).expect("load");

        assert_eq!(count, 1);
        assert_eq!(index.cards_in_set("Ursula's Return").len(), 1);
    }

    #[test]
    fn test_load_sets_dir_tolerates_cardless_sidecar() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("migration_map.json"),
            r#"{"migrations": {}}"#,
        )
        .expect("write");

        let index = CardIndex::new();
        let count = index.load_sets_dir(dir.path()).expect("load");

        assert_eq!(count, 0);
        assert!(index.is_data_loaded());
    }

    #[test]
    fn test_load_sets_dir_missing_directory_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");

        let index = CardIndex::new();
        assert!(index.load_sets_dir(&missing).is_err());
        assert!(!index.is_data_loaded());
    }
}
