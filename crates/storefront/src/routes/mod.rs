//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (newest of each collection)
//! GET  /health                    - Health check
//! GET  /health/ready              - Readiness (pings the content store)
//!
//! # Catalog
//! GET  /{category}                - Category listing (stitch, unstitch, trouser, product)
//! GET  /{category}/{id}           - Product detail with reviews and related products
//! POST /{category}/{id}/reviews   - Review form post (redirects back)
//!
//! # Cart (forms, or HTMX fragments)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add to cart
//! POST /cart/update               - Update quantity
//! POST /cart/remove               - Remove line
//! POST /cart/clear                - Empty the cart
//! GET  /cart/count                - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                  - Redirect to the chat deep link
//!
//! # Admin
//! GET  /admin                     - Product creation form
//!
//! # JSON API
//! GET  /api/review?product=       - Reviews for a product
//! POST /api/review                - Create a review
//! GET  /api/related-products      - Related products by fabric
//! POST /api/products              - Create a product (multipart)
//! ```

pub mod admin;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod home;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted admin upload body (all images together).
const PRODUCT_UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/review", get(api::reviews::list).post(api::reviews::create))
        .route("/related-products", get(api::related::related_products))
        .route(
            "/products",
            post(api::products::create).layer(DefaultBodyLimit::max(PRODUCT_UPLOAD_LIMIT)),
        )
}

/// Create the catalog routes router.
///
/// Mounted last; its path parameters only see what the fixed routes leave.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/{category}", get(catalog::index))
        .route("/{category}/{id}", get(catalog::show))
        .route("/{category}/{id}/reviews", post(catalog::submit_review))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout redirect
        .route("/checkout", get(cart::checkout))
        // Admin
        .route("/admin", get(admin::new_product))
        // JSON API
        .nest("/api", api_routes())
        // Catalog
        .merge(catalog_routes())
}
