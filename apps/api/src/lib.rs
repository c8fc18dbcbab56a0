//! # Q-BU! Order API
//!
//! HTTP server for print-order quoting and submission.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order API Routes                                │
//! │                                                                         │
//! │  GET  /api/health   liveness + database round trip                     │
//! │  POST /api/quote    price preview (nothing persisted)                  │
//! │  POST /api/orders   order submission                                   │
//! │                                                                         │
//! │  Both POST routes run the same pricing pipeline, so a preview can      │
//! │  never disagree with the order it becomes.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `QBU_HTTP_PORT` - HTTP listen port (default: 8080)
//! - `QBU_DATABASE_PATH` - SQLite database file (default: qbu.db)
//! - `QBU_TICKET_SALT` - shop-wide ticket code hashing salt
//! - `QBU_INVOICE_FROM` - invoice email sender address

pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod state;
pub mod tasks;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router. Separated from `main` so tests can mount
/// the same routes on an in-memory database.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/quote", post(handlers::quotes::preview_quote))
        .route("/api/orders", post(handlers::orders::submit_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
