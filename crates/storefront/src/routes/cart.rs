//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every handler loads it through a
//! [`CartStore`], applies at most one mutation, and lets the store write the
//! whole list back. Form posts redirect; HTMX requests get the count badge
//! plus a `cart-updated` trigger instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use fashionable_queen_core::{CartSnapshot, CurrencyCode, LineItem, LineKey, Price};
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{CartStore, SessionCartStorage};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Notice;
use crate::routes::catalog::parse_category;
use crate::sanity::SanityError;
use crate::services::checkout::{self, CheckoutError};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub subtotal: String,
    pub delivery: String,
    pub grand_total: String,
}

impl CartView {
    fn new(snapshot: &CartSnapshot, currency: CurrencyCode) -> Self {
        let money = |amount| Price::new(amount, currency).display();
        Self {
            items: snapshot
                .items
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id.to_string(),
                    name: item.name.clone(),
                    image_url: item.image_url.clone(),
                    size: item.selected_size.clone(),
                    color: item.selected_color.clone(),
                    quantity: item.quantity,
                    price: money(item.unit_price),
                    line_price: money(item.line_total()),
                })
                .collect(),
            item_count: snapshot.count,
            subtotal: money(snapshot.subtotal),
            delivery: money(snapshot.delivery_charge),
            grand_total: money(snapshot.grand_total),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
///
/// Name, price and image are looked up from the catalog, not trusted from
/// the form.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub category: String,
    pub product_id: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quantity: Option<u32>,
}

/// A cleared number input posts `quantity=`; treat it as absent.
fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Identifies one cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

impl LineForm {
    fn key(&self) -> LineKey<'_> {
        LineKey::new(&self.product_id, &self.size, &self.color)
    }
}

/// Update quantity form data. Values below 1 are stored as 1.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub quantity: i64,
}

impl UpdateCartForm {
    fn key(&self) -> LineKey<'_> {
        LineKey::new(&self.product_id, &self.size, &self.color)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub notice: Option<Notice>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_cart(state: &AppState, session: Session) -> Result<CartStore<SessionCartStorage>> {
    Ok(CartStore::load(
        SessionCartStorage::new(session),
        state.config().checkout.delivery_charge,
    )
    .await?)
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

fn cart_updated(count: u64) -> Response {
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count },
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let notice = Notice::take(&session).await;
    let store = load_cart(&state, session).await?;

    Ok(CartShowTemplate {
        cart: CartView::new(&store.snapshot(), state.config().checkout.currency),
        notice,
    })
}

/// Add an item to the cart.
///
/// Sized categories need a size before anything is added.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let category = parse_category(&form.category)?;
    let back = category.detail_path(&form.product_id);

    if category.requires_size() && form.size.trim().is_empty() {
        Notice::error("Please select a size.").flash(&session).await;
        return Ok(Redirect::to(&back).into_response());
    }

    let entry = match state.sanity().get_entry(category, &form.product_id).await {
        Ok(entry) => entry,
        Err(SanityError::NotFound(_)) => {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let item = LineItem {
        unit_price: entry.effective_price(),
        product_id: entry.id,
        name: entry.title,
        quantity: form.quantity.unwrap_or(1).max(1),
        image_url: entry.image_url.unwrap_or_default(),
        selected_size: form.size.trim().to_string(),
        selected_color: form.color.trim().to_string(),
    };

    let mut store = load_cart(&state, session.clone()).await?;
    store.add_item(item).await?;

    if is_htmx(&headers) {
        return Ok(cart_updated(store.cart().count()));
    }

    Notice::info("Product added to cart!").flash(&session).await;
    Ok(Redirect::to(&back).into_response())
}

/// Update a line's quantity.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut store = load_cart(&state, session).await?;
    store.update_quantity(form.key(), form.quantity).await?;

    if is_htmx(&headers) {
        return Ok(cart_updated(store.cart().count()));
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Remove a line.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let mut store = load_cart(&state, session).await?;
    store.remove_item(form.key()).await?;

    if is_htmx(&headers) {
        return Ok(cart_updated(store.cart().count()));
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut store = load_cart(&state, session).await?;
    store.clear().await?;
    Ok(Redirect::to("/cart"))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let store = load_cart(&state, session).await?;
    Ok(CartCountTemplate {
        count: store.cart().count(),
    })
}

/// Hand the cart off to the chat application.
///
/// An empty cart goes back to the cart page with a notice.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut store = load_cart(&state, session.clone()).await?;

    match checkout::handoff(state.config(), &store.snapshot()) {
        Ok(link) => {
            tracing::info!(items = store.cart().len(), "Checkout handoff");
            if state.config().checkout.clear_cart_on_checkout {
                store.clear().await?;
            }
            Ok(Redirect::to(&link))
        }
        Err(CheckoutError::EmptyCart) => {
            Notice::error(CheckoutError::EmptyCart.to_string())
                .flash(&session)
                .await;
            Ok(Redirect::to("/cart"))
        }
    }
}
