//! Catalog categories.
//!
//! Each catalog entry is stored as a document whose `_type` is one of the
//! four category tags below.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Document type discriminator for catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Ready-to-wear stitched suits.
    Stitch,
    /// Unstitched fabric sets.
    Unstitch,
    /// Stitched trousers.
    Trouser,
    /// Generic products created from the admin form without a category.
    Product,
}

/// Error returned when a string is not a known category tag.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(pub String);

impl Category {
    /// Every document type that holds a catalog entry.
    pub const ALL: [Self; 4] = [Self::Stitch, Self::Unstitch, Self::Trouser, Self::Product];

    /// Categories shown as collections on the storefront.
    pub const STOREFRONT: [Self; 3] = [Self::Stitch, Self::Unstitch, Self::Trouser];

    /// The document `_type` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stitch => "stitch",
            Self::Unstitch => "unstitch",
            Self::Trouser => "trouser",
            Self::Product => "product",
        }
    }

    /// Collection heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Stitch => "Stitched Collection",
            Self::Unstitch => "Unstitched Collection",
            Self::Trouser => "Trouser Collection",
            Self::Product => "Products",
        }
    }

    /// Whether a size must be chosen before the entry can go into the cart.
    #[must_use]
    pub const fn requires_size(self) -> bool {
        matches!(self, Self::Stitch | Self::Trouser)
    }

    /// Storefront path of a detail page for an entry of this category.
    #[must_use]
    pub fn detail_path(self, id: &str) -> String {
        format!("/{}/{id}", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stitch" => Ok(Self::Stitch),
            "unstitch" => Ok(Self::Unstitch),
            "trouser" => Ok(Self::Trouser),
            "product" => Ok(Self::Product),
            _ => Err(CategoryError(s.to_owned())),
        }
    }
}
