//! Fragment analysis and catalog resolution
//!
//! Everything between raw OCR output and a resolved catalog entry: candidate
//! name extraction over the fragment list, then tiered fuzzy matching against
//! the catalog. Both halves are deterministic given the same inputs.

pub mod candidates;
pub mod resolver;

pub use candidates::candidate_queries;
pub use resolver::{resolve_best, resolve_candidates, ResolverConfig};
