//! Business logic services for storefront.
//!
//! # Services
//!
//! - `checkout` - Order message and chat deep link for the cart
//! - `reviews` - Review validation and creation
//! - `products` - Admin product creation (form, uploads, document)

pub mod checkout;
pub mod products;
pub mod reviews;

pub use checkout::CheckoutError;
pub use products::{CreateProductError, NewProductRequest, ProductForm, ProductFormError};
pub use reviews::{ReviewError, ReviewSubmission};
