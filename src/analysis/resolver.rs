//! Tiered catalog resolution
//!
//! Candidate queries are tried against the catalog one at a time, stopping at
//! the first query that returns results. Picking the best entry out of a
//! result set is a pure function shared with the collection import path so
//! scanning and import can never disagree about what a query resolves to.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::catalog::{CardCatalog, CatalogCard};

/// Resolution tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// How long to wait for the catalog to finish loading before giving up
    /// on the current cycle (milliseconds)
    pub catalog_wait_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            catalog_wait_ms: 500,
        }
    }
}

/// Try each candidate query in order and return the first resolved card.
///
/// Queries run sequentially so a hit on a high-confidence query skips the
/// weaker ones entirely. If the catalog has not finished loading yet, this
/// waits once for `catalog_wait_ms` and rechecks rather than blocking the
/// cycle indefinitely.
pub async fn resolve_candidates(
    catalog: &dyn CardCatalog,
    queries: &[String],
    config: &ResolverConfig,
) -> Option<CatalogCard> {
    if queries.is_empty() {
        return None;
    }

    if !catalog.is_data_loaded() {
        debug!(
            "Catalog still loading, waiting {}ms before recheck",
            config.catalog_wait_ms
        );
        sleep(Duration::from_millis(config.catalog_wait_ms)).await;
        if !catalog.is_data_loaded() {
            warn!("Catalog not loaded, giving up on this cycle");
            return None;
        }
    }

    for query in queries {
        let results = catalog.search(query).await;
        if results.is_empty() {
            continue;
        }

        debug!("Query '{}' returned {} result(s)", query, results.len());
        if let Some(card) = resolve_best(query, &results) {
            return Some(card.clone());
        }
    }

    None
}

/// Select the best entry for `query` out of a non-empty result set.
///
/// Fixed priority: paired main/subtitle containment for spaced queries,
/// exact full-name match, exact main-segment match, main-segment substring,
/// full-name prefix, full-name substring, then the raw first result as a
/// best-effort fallback. All comparisons are case-insensitive.
pub fn resolve_best<'a>(query: &str, results: &'a [CatalogCard]) -> Option<&'a CatalogCard> {
    if results.is_empty() {
        return None;
    }

    let query_lower = query.to_lowercase();

    // Spaced queries carry two independent signals: match each half against
    // the corresponding half of the catalog name
    if let Some((main, sub)) = query.split_once(' ') {
        let main_lower = main.to_lowercase();
        let sub_lower = sub.to_lowercase();
        let paired = results.iter().find(|card| {
            card.name.split_once(" - ").is_some_and(|(m, s)| {
                m.to_lowercase().contains(&main_lower) && s.to_lowercase().contains(&sub_lower)
            })
        });
        if let Some(card) = paired {
            return Some(card);
        }
    }

    if let Some(card) = results
        .iter()
        .find(|card| card.name.to_lowercase() == query_lower)
    {
        return Some(card);
    }

    if let Some(card) = results
        .iter()
        .find(|card| card.main_name().to_lowercase() == query_lower)
    {
        return Some(card);
    }

    if let Some(card) = results
        .iter()
        .find(|card| card.main_name().to_lowercase().contains(&query_lower))
    {
        return Some(card);
    }

    if let Some(card) = results
        .iter()
        .find(|card| card.name.to_lowercase().starts_with(&query_lower))
    {
        return Some(card);
    }

    if let Some(card) = results
        .iter()
        .find(|card| card.name.to_lowercase().contains(&query_lower))
    {
        return Some(card);
    }

    results.first()
}
