//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Order API                          │
//! │                                                                         │
//! │  Storefront                  Rust Backend                               │
//! │  ──────────                  ────────────                               │
//! │                                                                         │
//! │  POST /api/orders                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<T, ApiError>                                    │  │
//! │  │                                                                  │  │
//! │  │  ValidationError ──► 400 no_blocks / missing_customer_fields /  │  │
//! │  │                          invalid_postal_code / bad_request      │  │
//! │  │  CoreError::ModelNotReady ──► 400 model_not_ready               │  │
//! │  │  TicketRejection ──► 400 invalid_ticket (+ human message)       │  │
//! │  │  Order insert failure ──► 500 order_insert_failed               │  │
//! │  │  Shipping record failure ──► 500 shipping_encrypt_failed        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄─── { "error": "invalid_ticket", "message": "..." } ───               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `error` strings are a stable contract with the storefront; change
//! them only together with the frontend error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use qbu_core::{CoreError, TicketRejection, ValidationError};
use qbu_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// { "error": "invalid_ticket", "message": "この割引コードは有効期限が切れています" }
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    /// Stable machine-readable error code
    pub code: &'static str,
    /// Human-readable message for display
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 with the generic `bad_request` code.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// 400 `invalid_ticket` with the rejection's customer-facing message.
    pub fn invalid_ticket(rejection: TicketRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_ticket",
            rejection.to_string(),
        )
    }

    /// 500 `order_insert_failed`.
    pub fn order_insert_failed() -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "order_insert_failed",
            "Failed to save the order",
        )
    }

    /// 500 `shipping_encrypt_failed`.
    pub fn shipping_encrypt_failed() -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "shipping_encrypt_failed",
            "Failed to save the shipping record",
        )
    }

    /// 500 with the generic `internal` code.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.code,
            message: &self.message,
        });
        (self.status, body).into_response()
    }
}

/// Converts submission validation errors to API errors with their stable
/// error codes.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::NoBlocks => {
                ApiError::new(StatusCode::BAD_REQUEST, "no_blocks", err.to_string())
            }
            ValidationError::Required { .. } | ValidationError::IncompleteAddress { .. } => {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "missing_customer_fields",
                    err.to_string(),
                )
            }
            ValidationError::InvalidFormat { field, .. } if field == "postalCode" => {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_postal_code",
                    err.to_string(),
                )
            }
            ValidationError::InvalidFormat { .. } | ValidationError::TooMany { .. } => {
                ApiError::bad_request(err.to_string())
            }
        }
    }
}

/// Converts pipeline errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ModelNotReady => ApiError::new(
                StatusCode::BAD_REQUEST,
                "model_not_ready",
                "The model must be a single connected piece before it can be printed",
            ),
            CoreError::Ticket(rejection) => ApiError::invalid_ticket(rejection),
            CoreError::Validation(v) => v.into(),
        }
    }
}

/// Converts database errors to API errors.
///
/// Handlers that need a more specific code (order insert, shipping record)
/// map those failures explicitly before this blanket conversion applies.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!(error = %err, "Database operation failed");
        ApiError::internal("Database operation failed")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
