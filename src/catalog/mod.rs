//! Card catalog model
//!
//! Catalog entries are read-only to the scanning pipeline. The data files are
//! one JSON file per set, produced by the catalog updater, with card keys in
//! camelCase plus legacy capitalized spellings from older exports. Field
//! aliases keep both generations loadable.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod import;
pub mod index;

pub use import::{migrate_collection, LegacyCard, MatchMethod, Migration};
pub use index::CardIndex;

/// Print treatment of a catalog entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardVariant {
    #[default]
    Normal,
    Foil,
    Enchanted,
    Promo,
    Borderless,
    Epic,
    Iconic,
}

/// One entry in the card catalog.
///
/// `name` is the full display name, `"Name - Subtitle"` for subtitled cards.
/// `unique_id` is the printed collector code such as `"TFC-012"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCard {
    /// Stable identifier assigned by the catalog updater
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
    #[serde(default)]
    pub variant: CardVariant,
}

impl CatalogCard {
    /// Portion of the name before the `" - "` subtitle separator
    pub fn main_name(&self) -> &str {
        self.name.split(" - ").next().unwrap_or(&self.name)
    }

    /// Subtitle after the `" - "` separator, if the card has one
    pub fn subtitle(&self) -> Option<&str> {
        self.name.split_once(" - ").map(|(_, sub)| sub)
    }
}

/// On-disk shape of one set data file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFile {
    #[serde(rename = "setName", alias = "Set_Name", default)]
    pub set_name: String,
    #[serde(rename = "setCode", default)]
    pub set_code: String,
    /// Defaults to empty so card-less sidecar files in the data directory
    /// load as zero cards instead of failing
    #[serde(default)]
    pub cards: Vec<CatalogCard>,
}

/// Read-only catalog collaborator the pipeline resolves against.
///
/// `search` is expected to match the query case-insensitively as a substring
/// of the full card name.
#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Whether the catalog data has finished loading
    fn is_data_loaded(&self) -> bool;

    /// All entries matching the query
    async fn search(&self, query: &str) -> Vec<CatalogCard>;
}

/// Conventional location of the set data files
pub fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "cardscan", "CardScan")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

    let data_dir = proj_dirs.data_dir().join("sets");
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}
