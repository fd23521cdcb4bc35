use serde::{Deserialize, Serialize};
use tracing::warn;

/// Cart payload as received on the wire: shops post either a structured
/// value (JSON body) or the same object serialized into a string field
/// (form post). Held as-is here; conversion into `CartData` happens in
/// `parse_cart` so a bad cart can never fail request deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CartField {
    Raw(String),
    Structured(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartData {
    pub items: Vec<CartItem>,
}

/// A single order line. Prices are in minor currency units (cents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
    pub quantity: u32,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_price: Option<i64>,
}

impl CartItem {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.product_title.as_deref())
            .unwrap_or("Onbekend product")
    }

    /// Line total in minor units, falling back to quantity × unit price when
    /// the shop did not precompute one. Saturates instead of overflowing on
    /// hostile payloads.
    pub fn line_total(&self) -> i64 {
        self.line_price
            .unwrap_or_else(|| self.price.saturating_mul(i64::from(self.quantity)))
    }
}

/// Normalizes the incoming cart field. A malformed payload, structured or
/// string, is logged and dropped; the checkout still succeeds and renders
/// without products.
pub fn parse_cart(raw: Option<&CartField>) -> Option<CartData> {
    match raw {
        None => None,
        Some(CartField::Structured(value)) => match serde_json::from_value(value.clone()) {
            Ok(cart) => Some(cart),
            Err(err) => {
                warn!(error = %err, "failed to parse structured cart_items, rendering without products");
                None
            }
        },
        Some(CartField::Raw(s)) => match serde_json::from_str(s) {
            Ok(cart) => Some(cart),
            Err(err) => {
                warn!(error = %err, "failed to parse cart_items, rendering without products");
                None
            }
        },
    }
}

/// Formats minor units as a major-unit amount with two decimals: 500 → "5.00".
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
