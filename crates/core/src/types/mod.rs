//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod id;
pub mod price;
pub mod review;

pub use category::{Category, CategoryError};
pub use id::*;
pub use price::{CurrencyCode, CurrencyCodeError, Price};
pub use review::{AuthorName, Rating, ReviewFieldError, ReviewText};
