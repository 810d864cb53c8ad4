//! Fashionable Queen Core - Shared types library.
//!
//! This crate provides the types shared by the storefront binary and its
//! tests.
//!
//! # Architecture
//!
//! The core crate contains only types and pure bookkeeping - no I/O, no HTTP
//! clients, no session access. This keeps it lightweight and allows the cart
//! rules to be tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document IDs, prices, categories and review fields
//! - [`cart`] - The cart reducer and its derived totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartSnapshot, LineItem, LineKey};
pub use types::*;
