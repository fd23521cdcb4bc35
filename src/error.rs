use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::payment::ProviderError;

/// Request-level errors. Anything on the money-movement path surfaces to the
/// client; notification failures never reach this type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required checkout parameters (amount, currency) are missing.
    #[error("Verplichte parameters ontbreken")]
    MissingParams,
    /// The amount was present but is not a decimal number.
    #[error("Ongeldig bedrag")]
    InvalidAmount,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingParams | AppError::InvalidAmount => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            AppError::Provider(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": err.to_string() })),
            )
                .into_response(),
        }
    }
}
