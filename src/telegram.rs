use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::cart::{format_cents, CartData};
use crate::config::AppConfig;

/// Customer details collected by the checkout form. Everything is trimmed
/// client-side; only first name and email are required before payment starts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
}

impl CustomerData {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Best-effort Telegram delivery. Without credentials every send is a no-op;
/// with credentials, failures are logged and swallowed. Nothing here may ever
/// block or fail the checkout flow.
#[derive(Clone)]
pub struct Notifier {
    http: Client,
    api_base: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl Notifier {
    pub fn new(config: &AppConfig, http: Client) -> Self {
        Self {
            http,
            api_base: config.telegram_api_base.clone(),
            bot_token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
        }
    }

    pub async fn send(&self, text: &str) {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return;
        };
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        match self.http.post(&url).json(&payload).send().await {
            Ok(resp) if !resp.status().is_success() => {
                warn!(status = %resp.status(), "telegram rejected notification");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "telegram notification failed");
            }
        }
    }
}

/// Message sent when a customer submits the checkout form (static-link flow).
pub fn checkout_message(
    amount: &str,
    customer: &CustomerData,
    cart: Option<&CartData>,
    pay_link: &str,
) -> String {
    format!(
        "<b>🛒 NIEUWE CHECKOUT</b>\n\
         \n\
         <b>💰 Bedrag:</b> €{amount}\n\
         <b>👤 Klant:</b> {name}\n\
         <b>📧 Email:</b> {email}\n\
         <b>📍 Adres:</b> {address}, {postal_code} {city}{products}\n\
         \n\
         <b>🔗 Payment Link:</b> {pay_link}\n\
         \n\
         <i>⏳ Wachten op betaling...</i>",
        amount = amount,
        name = customer.full_name(),
        email = customer.email,
        address = customer.address,
        postal_code = customer.postal_code,
        city = customer.city,
        products = products_block(cart),
        pay_link = pay_link,
    )
}

/// Message sent when a hosted session comes back with status "paid".
pub fn payment_received_message(
    amount_cents: Option<i64>,
    customer_name: &str,
    email: &str,
    order_id: &str,
    cart: Option<&CartData>,
) -> String {
    let amount = amount_cents.map(format_cents).unwrap_or_else(|| "?".to_string());
    format!(
        "<b>✅ BETALING ONTVANGEN</b>\n\
         \n\
         <b>💰 Bedrag:</b> €{amount}\n\
         <b>👤 Klant:</b> {customer_name}\n\
         <b>📧 Email:</b> {email}\n\
         <b>🧾 Bestelling:</b> {order_id}{products}\n\
         \n\
         <i>Betaling bevestigd via Stripe.</i>",
        products = products_block(cart),
    )
}

fn products_block(cart: Option<&CartData>) -> String {
    let Some(cart) = cart else {
        return String::new();
    };
    if cart.items.is_empty() {
        return String::new();
    }
    let mut block = String::from("\n\n<b>🛒 Producten:</b>\n");
    for item in &cart.items {
        block.push_str(&format!(
            "• {}x {} - €{}\n",
            item.quantity,
            item.display_title(),
            format_cents(item.line_total()),
        ));
    }
    block
}
