pub mod cart;
pub mod config;
pub mod error;
pub mod handlers;
pub mod page;
pub mod payment;
pub mod telegram;

pub use config::AppConfig;
pub use handlers::{app_router, AppState};
