//! Document shapes read from and written to the content store.
//!
//! Read types mirror the GROQ projections in `client/queries.rs`; fields a
//! projection cannot find come back as `null`, so list fields accept `null`
//! and default to empty.

use chrono::{DateTime, Utc};
use fashionable_queen_core::{AssetId, Category, ProductId, Rating, ReviewId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A catalog entry as shown in listings and related-product rails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(rename = "_type")]
    pub category: Category,
    #[serde(default)]
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CatalogSummary {
    /// Price charged: the discounted price when present, else list price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        effective_price(self.price, self.discounted_price)
    }

    /// Whether a lower discounted price should be shown next to the list price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        is_discounted(self.price, self.discounted_price)
    }

    /// Storefront path of the detail page.
    #[must_use]
    pub fn path(&self) -> String {
        self.category.detail_path(self.id.as_str())
    }
}

/// A full catalog entry for the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(rename = "_type")]
    pub category: Category,
    #[serde(default)]
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub fabric: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub size_options: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub color_options: Vec<String>,
    /// Single-colour documents store `color` instead of `colorOptions`.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub pieces_included: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub size_chart_url: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// Price charged: the discounted price when present, else list price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        effective_price(self.price, self.discounted_price)
    }

    #[must_use]
    pub fn is_discounted(&self) -> bool {
        is_discounted(self.price, self.discounted_price)
    }

    /// Colours the shopper can choose from.
    #[must_use]
    pub fn colors(&self) -> Vec<String> {
        if !self.color_options.is_empty() {
            return self.color_options.clone();
        }
        self.color
            .iter()
            .filter(|c| !c.trim().is_empty())
            .cloned()
            .collect()
    }
}

fn effective_price(price: Decimal, discounted: Option<Decimal>) -> Decimal {
    discounted.filter(|d| !d.is_zero()).unwrap_or(price)
}

fn is_discounted(price: Decimal, discounted: Option<Decimal>) -> bool {
    discounted.is_some_and(|d| !d.is_zero() && d < price)
}

/// Accept `null`, a single string, or a list of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<Option<String>>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(items)) => items.into_iter().flatten().collect(),
    })
}

// =============================================================================
// Reviews
// =============================================================================

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    #[serde(deserialize_with = "stored_rating")]
    pub rating: Rating,
    #[serde(rename = "review")]
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Ratings written before validation was tightened may be fractional.
fn stored_rating<'de, D>(deserializer: D) -> Result<Rating, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(Rating::nearest)
}

/// A review document ready to be created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewDocument {
    #[serde(rename = "_type")]
    pub doc_type: &'static str,
    pub product: Reference,
    pub rating: Rating,
    pub review: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// References, images and assets
// =============================================================================

/// A strong reference to another document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_type")]
    pub ref_type: String,
    #[serde(rename = "_ref")]
    pub target: String,
}

impl Reference {
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            ref_type: "reference".to_string(),
            target: target.into(),
        }
    }
}

/// An image field pointing at an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageField {
    #[serde(rename = "_type")]
    pub field_type: String,
    pub asset: Reference,
}

impl ImageField {
    #[must_use]
    pub fn for_asset(asset: &AssetId) -> Self {
        Self {
            field_type: "image".to_string(),
            asset: Reference::to(asset.as_str()),
        }
    }
}

/// Gallery items are array members and need a `_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(flatten)]
    pub image: ImageField,
}

/// Asset document returned by an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedAsset {
    #[serde(rename = "_id")]
    pub id: AssetId,
    #[serde(default)]
    pub url: Option<String>,
}

/// A catalog document ready to be created from the admin form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductDocument {
    #[serde(rename = "_type")]
    pub doc_type: Category,
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub discounted_price: Option<Decimal>,
    pub fabric: String,
    pub category: Category,
    pub size_options: Vec<String>,
    pub pieces_included: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub image: ImageField,
    pub gallery: Vec<GalleryImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_chart: Option<ImageField>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// API envelopes
// =============================================================================

/// `GET /data/query` response.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse<T> {
    pub result: T,
}

/// `POST /data/mutate?returnDocuments=true` response.
#[derive(Debug, Deserialize)]
pub(crate) struct MutateResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<MutationResult<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MutationResult<T> {
    pub document: Option<T>,
}

/// `POST /assets/images` response.
#[derive(Debug, Deserialize)]
pub(crate) struct AssetResponse {
    pub document: UploadedAsset,
}
