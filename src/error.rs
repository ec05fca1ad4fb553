use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// User-facing error messages shared by handlers and tests.
pub mod msg {
    pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields: email, items, totals";
    pub const MISSING_REFERENCE: &str = "Missing reference";
    pub const MISSING_SIGNATURE: &str = "Missing signature";
    pub const INVALID_SIGNATURE: &str = "Invalid signature";
    pub const INVALID_SIGNATURE_HEADER: &str = "Invalid signature header";
    pub const SERVER_MISCONFIGURATION: &str = "Server misconfiguration";
    pub const ORDER_CREATE_FAILED: &str = "Failed to create order";
    pub const ORDER_NOT_FOUND: &str = "Order not found";
    pub const PAYSTACK_INIT_FAILED: &str = "Failed to initialize Paystack";
    pub const PAYSTACK_VERIFY_FAILED: &str = "Failed to verify Paystack transaction";
    pub const NEGATIVE_AMOUNT: &str = "Monetary amounts must be non-negative numbers";
    pub const NEGATIVE_TOTAL: &str = "Order total cannot be negative";
    pub const INVALID_QUANTITY: &str = "Item quantity must be at least 1";
    pub const INVALID_EMAIL: &str = "Invalid email address";
    pub const INVALID_CURRENCY: &str = "Currency must be a three-letter code";
    pub const AMOUNT_TOO_LARGE: &str = "Order total is too large";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server misconfiguration: {0}")]
    Misconfigured(String),

    /// The payment provider rejected a call or could not be reached.
    /// `details` carries the provider's response body for debugging.
    #[error("Payment gateway error: {message}")]
    Gateway {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn gateway(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        AppError::Gateway {
            message: message.into(),
            details,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details): (StatusCode, &str, Option<serde_json::Value>) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.into())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.into()))
            }
            AppError::Misconfigured(what) => {
                tracing::error!("Server misconfiguration: {}", what);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    msg::SERVER_MISCONFIGURATION,
                    None,
                )
            }
            AppError::Gateway { message, details } => {
                tracing::error!("Payment gateway error: {}", message);
                let body = ErrorResponse {
                    error: message,
                    details,
                };
                return (StatusCode::BAD_GATEWAY, Json(body)).into_response();
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string().into()))
            }
            AppError::Internal(message) => {
                // Message is client-facing; the cause was logged at the call site
                let body = ErrorResponse {
                    error: message,
                    details: None,
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Convert `Option<T>` lookups into `NotFound` errors.
pub trait OptionExt<T> {
    fn or_not_found(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(msg.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
