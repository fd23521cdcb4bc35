use crate::payment::PaymentStrategy;

/// Process-wide configuration, read once at startup and shared immutably.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    /// Externally reachable base URL of this service (success/cancel URLs).
    pub app_url: String,
    /// Merchant handle for the static pay-link strategy.
    pub payment_username: String,
    pub strategy: PaymentStrategy,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub stripe_secret_key: String,
    /// API bases are overridable so tests can point them at local doubles.
    pub telegram_api_base: String,
    pub stripe_api_base: String,
    pub pay_link_base: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
            app_url: std::env::var("APP_URL")
                .unwrap_or_else(|_| "http://localhost:10000".to_string()),
            payment_username: std::env::var("PAYMENT_USERNAME")
                .unwrap_or_else(|_| "@username".to_string()),
            strategy: PaymentStrategy::from_env_value(
                std::env::var("PAYMENT_STRATEGY").ok().as_deref(),
            ),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").ok(),
            // Not validated here: a missing key fails at request time when the
            // hosted-session strategy first talks to Stripe.
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| "sk_test_placeholder".to_string()),
            telegram_api_base: std::env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            pay_link_base: std::env::var("PAY_LINK_BASE")
                .unwrap_or_else(|_| "https://pay.example.com".to_string()),
        }
    }
}
