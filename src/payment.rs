use std::collections::HashMap;

use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// How payment intent is forwarded to the provider. Selected once at startup;
/// the two strategies are mutually exclusive and mount different routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentStrategy {
    /// Deterministic pay-link URL built from the merchant handle and amount.
    StaticLink,
    /// Hosted Stripe checkout session created per request.
    HostedSession,
}

impl PaymentStrategy {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            None => PaymentStrategy::StaticLink,
            Some("static-link") | Some("static_link") => PaymentStrategy::StaticLink,
            Some("hosted-session") | Some("hosted_session") | Some("stripe") => {
                PaymentStrategy::HostedSession
            }
            Some(other) => {
                warn!(strategy = other, "unknown PAYMENT_STRATEGY, using static-link");
                PaymentStrategy::StaticLink
            }
        }
    }
}

/// Builds the static pay-link: `<base>/<handle>/<amount>`.
pub fn pay_link(base: &str, handle: &str, amount: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), handle, amount)
}

/// Converts a major-unit decimal amount ("10.00") to minor units (1000).
pub fn amount_to_minor_units(amount: &str) -> Option<i64> {
    let parsed: Decimal = amount.trim().parse().ok()?;
    (parsed * Decimal::ONE_HUNDRED).round().to_i64()
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("betaalprovider niet bereikbaar: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
}

/// Everything needed to open a hosted session for a single-item purchase.
#[derive(Debug)]
pub struct SessionRequest<'a> {
    pub unit_amount: i64,
    pub currency: &'a str,
    pub order_id: &'a str,
    pub customer_email: &'a str,
    pub customer_name: &'a str,
    pub return_url: Option<&'a str>,
    /// Serialized cart, round-tripped through session metadata so the
    /// completion handler can rebuild the product listing.
    pub cart_json: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }

    pub fn customer_email(&self) -> &str {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or_else(|| self.metadata.get("customer_email").map(String::as_str))
            .unwrap_or("")
    }
}

/// Thin client for the two checkout-session calls this service makes. The
/// session held by Stripe is the source of truth; nothing is persisted here.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(http: Client, api_base: String, secret_key: String) -> Self {
        Self {
            http,
            api_base,
            secret_key,
        }
    }

    pub async fn create_checkout_session(
        &self,
        app_url: &str,
        request: &SessionRequest<'_>,
    ) -> Result<CheckoutSession, ProviderError> {
        let params = build_session_params(app_url, request);
        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;
        decode_session(resp).await
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, ProviderError> {
        let resp = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_base, session_id
            ))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;
        decode_session(resp).await
    }
}

async fn decode_session(resp: reqwest::Response) -> Result<CheckoutSession, ProviderError> {
    if resp.status().is_success() {
        return Ok(resp.json().await?);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    // Stripe errors come back as {"error": {"message": ...}}.
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Stripe antwoordde met status {status}"));
    Err(ProviderError::Api(message))
}

fn build_session_params(app_url: &str, request: &SessionRequest<'_>) -> Vec<(String, String)> {
    let base = app_url.trim_end_matches('/');
    let product_name = if request.order_id.is_empty() {
        "Bestelling".to_string()
    } else {
        format!("Bestelling {}", request.order_id)
    };
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        (
            "success_url".to_string(),
            format!("{base}/payment/success?session_id={{CHECKOUT_SESSION_ID}}"),
        ),
        (
            "cancel_url".to_string(),
            request.return_url.unwrap_or(base).to_string(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.currency.to_lowercase(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            product_name,
        ),
        (
            "metadata[order_id]".to_string(),
            request.order_id.to_string(),
        ),
        (
            "metadata[customer_name]".to_string(),
            request.customer_name.to_string(),
        ),
        (
            "metadata[customer_email]".to_string(),
            request.customer_email.to_string(),
        ),
    ];
    if !request.customer_email.is_empty() {
        params.push((
            "customer_email".to_string(),
            request.customer_email.to_string(),
        ));
    }
    if let Some(cart) = &request.cart_json {
        params.push(("metadata[cart]".to_string(), cart.clone()));
    }
    params
}
