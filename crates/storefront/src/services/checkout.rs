//! Checkout handoff to the chat application.
//!
//! Checkout does not take payment. The cart snapshot is formatted into an
//! order message and the shopper is sent to a chat deep link carrying it.

use std::fmt::Write as _;

use fashionable_queen_core::{CartSnapshot, CurrencyCode, Price};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::{CheckoutConfig, StorefrontConfig};

/// Errors that stop a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Your cart is empty!")]
    EmptyCart,
}

const CLOSING_LINE: &str =
    "Please provide your delivery address and contact number to confirm the order. Thank you!";

/// Make a stored image reference absolute.
///
/// References starting with `http` are returned unchanged; anything else is
/// treated as a path on the storefront. Blank references yield `None`.
#[must_use]
pub fn resolve_image_url(base_url: &str, image_url: &str) -> Option<String> {
    let image_url = image_url.trim();
    if image_url.is_empty() {
        return None;
    }
    if image_url.starts_with("http") {
        return Some(image_url.to_string());
    }

    let base = base_url.trim_end_matches('/');
    let path = image_url.trim_start_matches('/');
    Some(format!("{base}/{path}"))
}

fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

/// Format the order message for a non-empty snapshot.
#[must_use]
pub fn build_order_message(
    store_name: &str,
    base_url: &str,
    currency: CurrencyCode,
    snapshot: &CartSnapshot,
) -> String {
    let mut message = format!("*New Order from {store_name}*\n\n");

    // Writing into a String cannot fail.
    for (index, item) in snapshot.items.iter().enumerate() {
        let _ = writeln!(message, "*Item {}: {}*", index + 1, item.name);
        let _ = writeln!(message, "Size: {}", item.selected_size);
        if !item.selected_color.is_empty() {
            let _ = writeln!(message, "Color: {}", item.selected_color);
        }
        let _ = writeln!(message, "Quantity: {}", item.quantity);
        let _ = writeln!(message, "Price: {}", money(item.unit_price, currency));
        let _ = writeln!(message, "Subtotal: {}", money(item.line_total(), currency));
        if let Some(url) = resolve_image_url(base_url, &item.image_url) {
            let _ = writeln!(message, "Image: {url}");
        }
        message.push('\n');
    }

    message.push_str("*Order Summary*\n");
    let _ = writeln!(message, "Subtotal: {}", money(snapshot.subtotal, currency));
    let _ = writeln!(
        message,
        "Delivery: {}",
        money(snapshot.delivery_charge, currency)
    );
    let _ = writeln!(
        message,
        "*Grand Total: {}*",
        money(snapshot.grand_total, currency)
    );
    message.push('\n');
    message.push_str(CLOSING_LINE);

    message
}

/// Deep link opening a chat with `message` pre-filled.
#[must_use]
pub fn chat_link(checkout: &CheckoutConfig, message: &str) -> String {
    format!(
        "{}/{}?text={}",
        checkout.chat_base_url.trim_end_matches('/'),
        checkout.contact_id,
        urlencoding::encode(message)
    )
}

/// Build the chat deep link for a cart.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when the cart has no lines.
pub fn handoff(config: &StorefrontConfig, snapshot: &CartSnapshot) -> Result<String, CheckoutError> {
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let message = build_order_message(
        &config.store_name,
        &config.base_url,
        config.checkout.currency,
        snapshot,
    );
    Ok(chat_link(&config.checkout, &message))
}
