//! JSON API handlers.
//!
//! Errors are JSON bodies: `{"error": ...}` for reads and reviews,
//! `{"success": false, "message": ...}` for product creation.

pub mod products;
pub mod related;
pub mod reviews;
