//! Validated review fields.
//!
//! A review is accepted only when every field parses. The storefront turns
//! a [`ReviewFieldError`] into a 400 response without contacting the
//! content store.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating review input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewFieldError {
    /// The product reference is missing or blank.
    #[error("Missing or invalid product ID")]
    MissingProduct,
    /// The rating is not a whole number in range.
    #[error("Rating must be a number between {min} and {max}")]
    InvalidRating {
        /// Lowest accepted rating.
        min: u8,
        /// Highest accepted rating.
        max: u8,
    },
    /// The review body is empty or too long after trimming.
    #[error("Review text must be between 1 and {max} characters")]
    TextLength {
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// The author name is blank.
    #[error("Author name is required")]
    MissingAuthor,
}

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Create a rating from an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewFieldError::InvalidRating`] outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, ReviewFieldError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(ReviewFieldError::InvalidRating {
                min: Self::MIN,
                max: Self::MAX,
            })
    }

    /// Create a rating from an arbitrary JSON value.
    ///
    /// Only whole numbers are accepted; `4.5`, `"4"` and `null` are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewFieldError::InvalidRating`] for anything else.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ReviewFieldError> {
        let invalid = ReviewFieldError::InvalidRating {
            min: Self::MIN,
            max: Self::MAX,
        };
        match value {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Self::new(v),
                None => match n.as_f64() {
                    #[allow(clippy::cast_possible_truncation)] // fract() == 0 checked first
                    Some(f) if f.fract() == 0.0 => Self::new(f as i64),
                    _ => Err(invalid),
                },
            },
            _ => Err(invalid),
        }
    }

    /// The closest rating to a stored number.
    ///
    /// Stored documents may hold fractional or out-of-range values; they are
    /// rounded and clamped to `1..=5`. `NaN` reads as the minimum.
    #[must_use]
    pub fn nearest(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        let clamped = value
            .round()
            .clamp(f64::from(Self::MIN), f64::from(Self::MAX));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 1..=5
        Self(clamped as u8)
    }

    /// The numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Star glyphs for display, e.g. `★★★☆☆`.
    #[must_use]
    pub fn stars(self) -> String {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl TryFrom<i64> for Rating {
    type Error = ReviewFieldError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review body, trimmed, 1 to 500 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewText(String);

impl ReviewText {
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 500;

    /// Parse review text.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewFieldError::TextLength`] when the trimmed text is
    /// empty or longer than [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, ReviewFieldError> {
        let trimmed = s.trim();
        let len = trimmed.chars().count();
        if len == 0 || len > Self::MAX_LENGTH {
            return Err(ReviewFieldError::TextLength {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reviewer display name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorName(String);

impl AuthorName {
    /// Parse an author name.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewFieldError::MissingAuthor`] when blank.
    pub fn parse(s: &str) -> Result<Self, ReviewFieldError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ReviewFieldError::MissingAuthor);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_rating_from_json() {
        assert_eq!(Rating::from_json(&json!(4)).unwrap().get(), 4);
        assert_eq!(Rating::from_json(&json!(3.0)).unwrap().get(), 3);
        assert!(Rating::from_json(&json!(4.5)).is_err());
        assert!(Rating::from_json(&json!("4")).is_err());
        assert!(Rating::from_json(&json!(null)).is_err());
        assert!(Rating::from_json(&json!(6)).is_err());
    }

    #[test]
    fn test_rating_nearest() {
        assert_eq!(Rating::nearest(4.5).get(), 5);
        assert_eq!(Rating::nearest(3.2).get(), 3);
        assert_eq!(Rating::nearest(0.0).get(), 1);
        assert_eq!(Rating::nearest(9.0).get(), 5);
        assert_eq!(Rating::nearest(f64::NAN).get(), 1);
    }

    #[test]
    fn test_rating_error_message() {
        let err = Rating::new(6).unwrap_err();
        assert_eq!(err.to_string(), "Rating must be a number between 1 and 5");
    }

    #[test]
    fn test_rating_stars() {
        assert_eq!(Rating::new(3).unwrap().stars(), "★★★☆☆");
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("6").is_err());
        assert_eq!(serde_json::from_str::<Rating>("2").unwrap().get(), 2);
    }

    #[test]
    fn test_review_text_length() {
        assert!(ReviewText::parse("").is_err());
        assert!(ReviewText::parse("   ").is_err());
        assert!(ReviewText::parse(&"a".repeat(500)).is_ok());
        assert!(ReviewText::parse(&"a".repeat(501)).is_err());
        assert_eq!(ReviewText::parse("  lovely fabric ").unwrap().as_str(), "lovely fabric");
    }

    #[test]
    fn test_review_text_counts_chars_not_bytes() {
        // 500 two-byte characters is still within the limit
        assert!(ReviewText::parse(&"é".repeat(500)).is_ok());
    }

    #[test]
    fn test_author_name() {
        assert_eq!(
            AuthorName::parse(" \t"),
            Err(ReviewFieldError::MissingAuthor)
        );
        assert_eq!(AuthorName::parse(" Ayesha ").unwrap().as_str(), "Ayesha");
    }
}
