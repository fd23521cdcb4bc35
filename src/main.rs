use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::signal;
use tracing::info;

use paylink_gateway::{app_router, AppConfig, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env if available
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let port = config.port;
    let strategy = config.strategy;
    let state = Arc::new(AppState::new(config));
    let app = app_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse().expect("Invalid address");
    info!("🚀 Checkout gateway listening on {addr} (strategy: {strategy:?})");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind port");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping gracefully");
}
