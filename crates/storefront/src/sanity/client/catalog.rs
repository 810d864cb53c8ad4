//! Catalog and review reads, review creation.

use fashionable_queen_core::{Category, ProductId};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::SanityClient;
use super::cache::{CacheKey, CacheValue};
use super::queries;
use crate::sanity::SanityError;
use crate::sanity::types::{CatalogEntry, CatalogSummary, NewReviewDocument, Review};

/// `$types` parameter covering every catalog document type.
fn catalog_types() -> Value {
    Value::Array(
        Category::ALL
            .iter()
            .map(|c| Value::String(c.as_str().to_string()))
            .collect(),
    )
}

impl SanityClient {
    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List every entry of a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn list_category(
        &self,
        category: Category,
    ) -> Result<Vec<CatalogSummary>, SanityError> {
        let cache_key = CacheKey::Listing(category);

        if let Some(CacheValue::Listing(entries)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for listing");
            return Ok(entries);
        }

        let entries: Vec<CatalogSummary> = self
            .query(
                queries::LIST_BY_CATEGORY,
                &[("type", json!(category.as_str()))],
            )
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Listing(entries.clone()))
            .await;

        Ok(entries)
    }

    /// Get one entry by category and id.
    ///
    /// # Errors
    ///
    /// Returns [`SanityError::NotFound`] if no such document exists, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(category = %category, id = %id))]
    pub async fn get_entry(
        &self,
        category: Category,
        id: &str,
    ) -> Result<CatalogEntry, SanityError> {
        let cache_key = CacheKey::Entry {
            category,
            id: id.to_string(),
        };

        if let Some(CacheValue::Entry(entry)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for entry");
            return Ok(*entry);
        }

        let entry: Option<CatalogEntry> = self
            .query(
                queries::ENTRY_BY_ID,
                &[("type", json!(category.as_str())), ("id", json!(id))],
            )
            .await?;

        let entry =
            entry.ok_or_else(|| SanityError::NotFound(format!("{category} {id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Entry(Box::new(entry.clone())))
            .await;

        Ok(entry)
    }

    /// Up to `limit` entries of any category made of the same fabric,
    /// excluding `product_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id, fabric = %fabric))]
    pub async fn related_by_fabric(
        &self,
        product_id: &ProductId,
        fabric: &str,
        limit: usize,
    ) -> Result<Vec<CatalogSummary>, SanityError> {
        self.query(
            &queries::related_by_fabric(limit),
            &[
                ("types", catalog_types()),
                ("fabric", json!(fabric)),
                ("productId", json!(product_id.as_str())),
            ],
        )
        .await
    }

    /// Whether `id` names a document of any catalog type.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn catalog_entry_exists(&self, id: &str) -> Result<bool, SanityError> {
        let found: Option<String> = self
            .query(
                queries::CATALOG_ID_EXISTS,
                &[("types", catalog_types()), ("id", json!(id))],
            )
            .await?;
        Ok(found.is_some())
    }

    // =========================================================================
    // Review Methods
    // =========================================================================

    /// Reviews for a product, newest first. Never cached.
    ///
    /// Documents that do not decode are skipped with a warning so one bad
    /// review never hides the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn reviews_for(&self, product_id: &ProductId) -> Result<Vec<Review>, SanityError> {
        let documents: Vec<Value> = self
            .query(
                queries::REVIEWS_FOR_PRODUCT,
                &[("productId", json!(product_id.as_str()))],
            )
            .await?;

        Ok(documents
            .into_iter()
            .filter_map(|document| {
                let id = document.get("_id").cloned();
                serde_json::from_value::<Review>(document)
                    .inspect_err(|e| warn!(error = %e, review_id = ?id, "Skipping malformed review"))
                    .ok()
            })
            .collect())
    }

    /// Create a review document.
    ///
    /// # Errors
    ///
    /// Returns an error if no write token is configured or the mutation fails.
    #[instrument(skip(self, review), fields(product_id = %review.product.target))]
    pub async fn create_review(&self, review: &NewReviewDocument) -> Result<Review, SanityError> {
        self.create(review).await
    }
}
