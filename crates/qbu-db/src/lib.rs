//! # qbu-db: Database Layer for the Q-BU! Order Backend
//!
//! This crate provides database access for the order backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Q-BU! Order Backend Data Flow                      │
//! │                                                                         │
//! │  API handler (POST /api/orders)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      qbu-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ PricingConfig │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Shipping      │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │    │ Ticket        │    │ ...          │  │   │
//! │  │   │               │    │ Order, Audit  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   Raw rows are parsed into qbu-core entities HERE, once.        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qbu_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("qbu.db")).await?;
//! let active_pricing = db.pricing_configs().active().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditLogRepository;
pub use repository::order::{generate_order_id, OrderRepository};
pub use repository::pricing_config::PricingConfigRepository;
pub use repository::shipping::ShippingRepository;
pub use repository::ticket::{generate_redemption_id, TicketRepository};
