use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use paylink_gateway::config::AppConfig;
use paylink_gateway::payment::PaymentStrategy;
use paylink_gateway::{app_router, AppState};

fn test_config(strategy: PaymentStrategy) -> AppConfig {
    AppConfig {
        port: 0,
        app_url: "http://localhost:10000".to_string(),
        payment_username: "@testshop".to_string(),
        strategy,
        telegram_bot_token: None,
        telegram_chat_id: None,
        stripe_secret_key: "sk_test_placeholder".to_string(),
        telegram_api_base: "http://127.0.0.1:9".to_string(),
        stripe_api_base: "http://127.0.0.1:9".to_string(),
        pay_link_base: "https://pay.example.com".to_string(),
    }
}

fn app(strategy: PaymentStrategy) -> axum::Router {
    app_router(Arc::new(AppState::new(test_config(strategy))))
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn root_reports_active() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#""status":"active""#));
}

#[tokio::test]
async fn health_reports_healthy() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#""status":"healthy""#));
}

#[tokio::test]
async fn checkout_renders_amount_and_cart() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post(
            "/checkout",
            json!({
                "amount": "25.50",
                "currency": "EUR",
                "cart_items": "{\"items\":[{\"title\":\"Mug\",\"quantity\":2,\"price\":500}]}",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("€25.50"));
    assert!(body.contains(r#""title":"Mug""#));
    assert!(body.contains(r#""quantity":2"#));
    assert!(body.contains(r#""price":500"#));
    assert!(body.contains("https://pay.example.com/@testshop/25.50"));
}

#[tokio::test]
async fn checkout_without_currency_is_rejected() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post("/checkout", json!({ "amount": "25.50" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Verplichte parameters ontbreken");
}

#[tokio::test]
async fn checkout_without_amount_is_rejected() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post("/checkout", json!({ "currency": "EUR" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_with_unparseable_amount_is_rejected() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post(
            "/checkout",
            json!({ "amount": "veel", "currency": "EUR" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Ongeldig bedrag");
}

#[tokio::test]
async fn malformed_cart_still_renders_page() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post(
            "/checkout",
            json!({
                "amount": "10.00",
                "currency": "EUR",
                "cart_items": "dit is geen json {",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("const cartData = null;"));
    assert!(body.contains("Geen producten"));
}

#[tokio::test]
async fn structured_cart_is_embedded() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post(
            "/checkout",
            json!({
                "amount": "25.50",
                "currency": "EUR",
                "cart_items": { "items": [{ "title": "Mug", "quantity": 2, "price": 500 }] },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#""title":"Mug""#));
    assert!(body.contains(r#""quantity":2"#));
}

#[tokio::test]
async fn structured_invalid_cart_still_renders_page() {
    // Items without quantity/price must degrade to the empty listing, never
    // reject the checkout itself.
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post(
            "/checkout",
            json!({
                "amount": "25.50",
                "currency": "EUR",
                "cart_items": { "items": [{ "title": "Mug" }] },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("const cartData = null;"));
    assert!(body.contains("Geen producten"));
}

#[tokio::test]
async fn checkout_accepts_form_encoding() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkout")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(
                    "amount=10.00&currency=EUR&order_id=A1&cart_items=%7B%22items%22%3A%5B%7B%22title%22%3A%22Mug%22%2C%22quantity%22%3A1%2C%22price%22%3A500%7D%5D%7D",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("€10.00"));
    assert!(body.contains(r#""title":"Mug""#));
}

#[tokio::test]
async fn notify_succeeds_without_credentials() {
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(json_post(
            "/api/notify",
            json!({
                "amount": "25.50",
                "customerData": { "firstName": "Jan", "email": "jan@example.com" },
                "cartData": null,
                "orderId": "A1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#""status":"success""#));
}

#[tokio::test]
async fn hosted_session_page_uses_create_payment_endpoint() {
    let response = app(PaymentStrategy::HostedSession)
        .oneshot(json_post(
            "/checkout",
            json!({ "amount": "10.00", "currency": "EUR", "return_url": "https://shop.example.com/cart" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("/api/create-payment"));
    assert!(body.contains("https://shop.example.com/cart"));
    assert!(!body.contains("/api/notify"));
}

#[tokio::test]
async fn strategy_gates_routes() {
    // Static-link deployments do not expose the hosted-session endpoints.
    let response = app(PaymentStrategy::StaticLink)
        .oneshot(
            Request::builder()
                .uri("/payment/success?session_id=cs_x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // And hosted-session deployments do not expose the notify endpoint.
    let response = app(PaymentStrategy::HostedSession)
        .oneshot(json_post("/api/notify", json!({ "amount": "1.00" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
