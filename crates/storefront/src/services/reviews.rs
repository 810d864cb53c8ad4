//! Review submission.
//!
//! Input is validated field by field before anything is sent to the content
//! store. The product must exist as a catalog document of any category.

use chrono::Utc;
use fashionable_queen_core::{AuthorName, ProductId, Rating, ReviewFieldError, ReviewText};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::sanity::{NewReviewDocument, Reference, Review, SanityClient, SanityError};

/// Errors that can occur when submitting a review.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// A field failed validation.
    #[error(transparent)]
    Invalid(#[from] ReviewFieldError),

    /// The referenced product does not exist.
    #[error("Product not found")]
    UnknownProduct,

    /// The content store failed.
    #[error(transparent)]
    Sanity(#[from] SanityError),
}

/// A review that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub product: ProductId,
    pub rating: Rating,
    pub text: ReviewText,
    pub author: AuthorName,
}

impl ReviewSubmission {
    /// Validate a JSON body of the form `{product, rating, review, author}`.
    ///
    /// Fields are checked in that order and the first failure is returned.
    /// `rating` must be a JSON number; strings are rejected.
    ///
    /// # Errors
    ///
    /// Returns the [`ReviewFieldError`] for the first invalid field.
    pub fn from_json(body: &Value) -> Result<Self, ReviewFieldError> {
        let product = body
            .get("product")
            .and_then(Value::as_str)
            .filter(|p| !p.trim().is_empty())
            .ok_or(ReviewFieldError::MissingProduct)?;
        let rating = Rating::from_json(body.get("rating").unwrap_or(&Value::Null))?;
        let text = ReviewText::parse(body.get("review").and_then(Value::as_str).unwrap_or(""))?;
        let author = AuthorName::parse(body.get("author").and_then(Value::as_str).unwrap_or(""))?;

        Ok(Self {
            product: ProductId::new(product),
            rating,
            text,
            author,
        })
    }

    /// Validate already-separated form fields.
    ///
    /// # Errors
    ///
    /// Returns the [`ReviewFieldError`] for the first invalid field.
    pub fn from_fields(
        product: &str,
        rating: i64,
        review: &str,
        author: &str,
    ) -> Result<Self, ReviewFieldError> {
        if product.trim().is_empty() {
            return Err(ReviewFieldError::MissingProduct);
        }
        Ok(Self {
            product: ProductId::new(product),
            rating: Rating::new(rating)?,
            text: ReviewText::parse(review)?,
            author: AuthorName::parse(author)?,
        })
    }

    fn into_document(self) -> NewReviewDocument {
        NewReviewDocument {
            doc_type: "review",
            product: Reference::to(self.product.into_inner()),
            rating: self.rating,
            review: self.text.as_str().to_string(),
            author: self.author.as_str().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Create a review after confirming its product exists.
///
/// # Errors
///
/// Returns [`ReviewError::UnknownProduct`] when no catalog document has the
/// product id, or [`ReviewError::Sanity`] when a request fails.
#[instrument(skip(sanity, submission), fields(product_id = %submission.product))]
pub async fn submit_review(
    sanity: &SanityClient,
    submission: ReviewSubmission,
) -> Result<Review, ReviewError> {
    if !sanity
        .catalog_entry_exists(submission.product.as_str())
        .await?
    {
        return Err(ReviewError::UnknownProduct);
    }

    let review = sanity.create_review(&submission.into_document()).await?;
    tracing::info!(review_id = %review.id, "Review created");
    Ok(review)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(rating: Value, review: &str) -> Value {
        json!({"product": "abc", "rating": rating, "review": review, "author": "Sana"})
    }

    #[test]
    fn test_valid_submission() {
        let submission = ReviewSubmission::from_json(&body(json!(5), "  Great fit  ")).unwrap();
        assert_eq!(submission.product.as_str(), "abc");
        assert_eq!(submission.rating.get(), 5);
        assert_eq!(submission.text.as_str(), "Great fit");
    }

    #[test]
    fn test_rating_bounds() {
        for bad in [json!(0), json!(6), json!("4"), json!(4.5), Value::Null] {
            assert!(matches!(
                ReviewSubmission::from_json(&body(bad, "ok")),
                Err(ReviewFieldError::InvalidRating { .. })
            ));
        }
        assert!(ReviewSubmission::from_json(&body(json!(1), "ok")).is_ok());
    }

    #[test]
    fn test_text_length_bounds() {
        let max = "a".repeat(500);
        let over = "a".repeat(501);
        assert!(ReviewSubmission::from_json(&body(json!(3), &max)).is_ok());
        assert_eq!(
            ReviewSubmission::from_json(&body(json!(3), &over)).unwrap_err(),
            ReviewFieldError::TextLength { max: 500 }
        );
        assert_eq!(
            ReviewSubmission::from_json(&body(json!(3), "   ")).unwrap_err(),
            ReviewFieldError::TextLength { max: 500 }
        );
    }

    #[test]
    fn test_blank_author_and_product() {
        let blank_author = json!({"product": "abc", "rating": 4, "review": "ok", "author": " "});
        assert_eq!(
            ReviewSubmission::from_json(&blank_author).unwrap_err(),
            ReviewFieldError::MissingAuthor
        );

        let missing_product = json!({"rating": 4, "review": "ok", "author": "Sana"});
        assert_eq!(
            ReviewSubmission::from_json(&missing_product).unwrap_err(),
            ReviewFieldError::MissingProduct
        );
    }

    #[test]
    fn test_document_shape() {
        let doc = ReviewSubmission::from_fields("abc", 4, "Lovely", "Sana")
            .unwrap()
            .into_document();
        assert_eq!(doc.doc_type, "review");
        assert_eq!(doc.product.target, "abc");
        assert_eq!(doc.product.ref_type, "reference");
    }
}
