//! Cache types for catalog reads.

use fashionable_queen_core::Category;

use crate::sanity::types::{CatalogEntry, CatalogSummary};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Listing(Category),
    Entry { category: Category, id: String },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Listing(Vec<CatalogSummary>),
    Entry(Box<CatalogEntry>),
}
