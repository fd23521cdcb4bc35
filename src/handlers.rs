use std::sync::Arc;

use axum::{
    extract::{FromRequest, Query, Request, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::cart::{parse_cart, CartData, CartField};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::page::{render_checkout_page, render_return_page, SubmitAction};
use crate::payment::{
    amount_to_minor_units, pay_link, PaymentStrategy, SessionRequest, StripeClient,
};
use crate::telegram::{checkout_message, payment_received_message, CustomerData, Notifier};

/// Shared per-process state: immutable config plus the outbound clients, all
/// built once at startup.
pub struct AppState {
    pub config: AppConfig,
    pub notifier: Notifier,
    pub stripe: StripeClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let http = Client::new();
        let notifier = Notifier::new(&config, http.clone());
        let stripe = StripeClient::new(
            http,
            config.stripe_api_base.clone(),
            config.stripe_secret_key.clone(),
        );
        Self {
            config,
            notifier,
            stripe,
        }
    }
}

/// Assembles the router. The shared routes are always mounted; the
/// strategy-specific endpoints only exist for the configured strategy.
pub fn app_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/checkout", post(checkout));

    let router = match state.config.strategy {
        PaymentStrategy::StaticLink => router.route("/api/notify", post(notify)),
        PaymentStrategy::HostedSession => router
            .route("/api/create-payment", post(create_payment))
            .route("/payment/success", get(payment_success)),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Shops post the checkout either as a regular form or as JSON; accept both
/// and dispatch on the content type.
pub struct FormOrJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(FormOrJson(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(FormOrJson(value))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub return_url: Option<String>,
    #[serde(default)]
    pub cart_items: Option<CartField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub customer_data: CustomerData,
    #[serde(default)]
    pub cart_data: Option<CartData>,
    #[serde(default)]
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub customer_data: CustomerData,
    #[serde(default)]
    pub cart_data: Option<CartData>,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub return_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub session_id: String,
}

async fn root() -> Json<Value> {
    Json(json!({
        "status": "active",
        "message": "Payment Link Gateway Running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Renders the checkout page. Amount and currency are mandatory; the cart is
/// optional and degrades to an empty listing when malformed.
async fn checkout(
    State(state): State<Arc<AppState>>,
    FormOrJson(req): FormOrJson<CheckoutRequest>,
) -> Result<Html<String>, AppError> {
    let amount = req
        .amount
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::MissingParams)?;
    req.currency
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(AppError::MissingParams)?;
    if amount_to_minor_units(amount).is_none() {
        return Err(AppError::InvalidAmount);
    }

    let cart = parse_cart(req.cart_items.as_ref());
    let order_id = req.order_id.as_deref().unwrap_or("");
    let return_url = req.return_url.as_deref().unwrap_or("");

    let link;
    let action = match state.config.strategy {
        PaymentStrategy::StaticLink => {
            link = pay_link(
                &state.config.pay_link_base,
                &state.config.payment_username,
                amount,
            );
            SubmitAction::StaticLink { pay_link: &link }
        }
        PaymentStrategy::HostedSession => SubmitAction::HostedSession { return_url },
    };

    Ok(Html(render_checkout_page(
        amount,
        order_id,
        cart.as_ref(),
        action,
    )))
}

/// Static-link flow: the page posts here right before it navigates to the pay
/// link. Delivery is best-effort; this endpoint never fails the checkout.
async fn notify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NotifyRequest>,
) -> Json<Value> {
    let link = pay_link(
        &state.config.pay_link_base,
        &state.config.payment_username,
        &req.amount,
    );
    let message = checkout_message(&req.amount, &req.customer_data, req.cart_data.as_ref(), &link);
    state.notifier.send(&message).await;
    Json(json!({ "status": "success" }))
}

/// Hosted-session flow: opens a Stripe checkout session and hands its
/// redirect URL back to the page. Provider failures surface as HTTP 500.
async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let unit_amount = amount_to_minor_units(&req.amount).ok_or(AppError::InvalidAmount)?;
    let currency = if req.currency.trim().is_empty() {
        "eur"
    } else {
        req.currency.trim()
    };
    let customer_name = req.customer_data.full_name();
    let cart_json = req
        .cart_data
        .as_ref()
        .and_then(|cart| serde_json::to_string(cart).ok());

    let session_request = SessionRequest {
        unit_amount,
        currency,
        order_id: &req.order_id,
        customer_email: &req.customer_data.email,
        customer_name: &customer_name,
        return_url: req.return_url.as_deref().filter(|s| !s.is_empty()),
        cart_json,
    };
    let session = state
        .stripe
        .create_checkout_session(&state.config.app_url, &session_request)
        .await?;
    info!(session_id = %session.id, "checkout session created");
    Ok(Json(json!({ "url": session.url })))
}

/// Return leg of the hosted-session flow. Verifies the session with Stripe
/// and notifies on "paid"; the page itself is shown regardless, since the
/// provider-held session is the source of truth, not this redirect.
async fn payment_success(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuccessQuery>,
) -> Html<String> {
    match state.stripe.retrieve_checkout_session(&query.session_id).await {
        Ok(session) if session.is_paid() => {
            let cart_field = session
                .metadata
                .get("cart")
                .map(|raw| CartField::Raw(raw.clone()));
            let cart = parse_cart(cart_field.as_ref());
            let customer_name = session
                .metadata
                .get("customer_name")
                .map(String::as_str)
                .unwrap_or("");
            let order_id = session
                .metadata
                .get("order_id")
                .map(String::as_str)
                .unwrap_or("");
            let message = payment_received_message(
                session.amount_total,
                customer_name,
                session.customer_email(),
                order_id,
                cart.as_ref(),
            );
            info!(session_id = %session.id, "payment confirmed");
            state.notifier.send(&message).await;
        }
        Ok(session) => {
            warn!(
                session_id = %session.id,
                payment_status = ?session.payment_status,
                "session not paid, no notification sent"
            );
        }
        Err(err) => {
            error!(error = %err, "failed to retrieve checkout session");
        }
    }
    Html(render_return_page(&state.config.app_url))
}
