//! Sanity content store client.
//!
//! # Architecture
//!
//! - Plain HTTP + JSON via `reqwest`; queries are GROQ strings with
//!   JSON-encoded `$params`
//! - The content store is the source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog reads (5 minute TTL); reviews
//!   are never cached so a new review shows up on the next read
//!
//! # Endpoints
//!
//! - `GET  /v{version}/data/query/{dataset}` - catalog and review reads
//! - `POST /v{version}/data/mutate/{dataset}` - review and product creation
//! - `POST /v{version}/assets/images/{dataset}` - image uploads
//!
//! # Example
//!
//! ```rust,ignore
//! use fashionable_queen_storefront::sanity::SanityClient;
//!
//! let client = SanityClient::new(&config.sanity)?;
//!
//! let entries = client.list_category(Category::Stitch).await?;
//! let reviews = client.reviews_for(&entries[0].id).await?;
//! ```

mod client;
pub mod types;

pub use client::SanityClient;
pub use client::queries::RELATED_LIMIT;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the content store.
#[derive(Debug, Error)]
pub enum SanityError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Description extracted from the error body.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Document not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A mutation or upload was attempted without a write token.
    #[error("Write token not configured")]
    MissingWriteToken,

    /// The mutation succeeded but returned no document.
    #[error("Mutation returned no document")]
    EmptyMutation,
}

/// Pull a human-readable message out of an API error body.
///
/// The API uses both `{"error": {"description": ...}}` and
/// `{"error": "...", "message": "..."}` shapes.
fn describe_error_body(body: &str) -> String {
    let snippet = || body.chars().take(200).collect::<String>();

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return snippet();
    };

    value
        .pointer("/error/description")
        .or_else(|| value.get("message"))
        .or_else(|| value.get("error"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(snippet, str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanity_error_display() {
        let err = SanityError::NotFound("stitch abc".to_string());
        assert_eq!(err.to_string(), "Not found: stitch abc");

        let err = SanityError::Api {
            status: 403,
            message: "Insufficient permissions".to_string(),
        };
        assert_eq!(err.to_string(), "API error (403): Insufficient permissions");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = SanityError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_describe_error_body_nested_description() {
        let body = r#"{"error":{"description":"Mutation failed: invalid _type","type":"mutationError"}}"#;
        assert_eq!(describe_error_body(body), "Mutation failed: invalid _type");
    }

    #[test]
    fn test_describe_error_body_flat_message() {
        let body = r#"{"error":"Unauthorized","message":"Session not found","statusCode":401}"#;
        assert_eq!(describe_error_body(body), "Session not found");
    }

    #[test]
    fn test_describe_error_body_not_json() {
        assert_eq!(describe_error_body("<html>bad gateway</html>"), "<html>bad gateway</html>");
    }
}
