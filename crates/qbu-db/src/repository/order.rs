//! # Order Repository
//!
//! Database operations for accepted print orders.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. insert_order()     - the order row + frozen breakdown JSON          │
//! │                          (hard failure: submission returns 500)         │
//! │  2. insert_shipping()  - the destination record, separate table         │
//! │                          (hard failure: submission returns 500)         │
//! │  3. redemption / audit - best-effort, after the order is committed      │
//! │                          (failures logged, order stands)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use qbu_core::{Order, QuoteBreakdown};

/// Raw order row; the breakdown JSON is parsed back into its typed form
/// at this boundary.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    item_subtotal_yen: i64,
    shipping_yen: i64,
    discount_yen: i64,
    total_yen: i64,
    ticket_id: Option<String>,
    breakdown: String,
    customer_name: String,
    customer_email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let breakdown: QuoteBreakdown = serde_json::from_str(&row.breakdown)
            .map_err(|e| DbError::malformed("Order", &row.id, format!("breakdown: {}", e)))?;

        Ok(Order {
            id: row.id,
            item_subtotal_yen: row.item_subtotal_yen,
            shipping_yen: row.shipping_yen,
            discount_yen: row.discount_yen,
            total_yen: row.total_yen,
            ticket_id: row.ticket_id,
            breakdown,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            created_at: row.created_at,
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an accepted order with its frozen breakdown.
    pub async fn insert_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = %order.total_yen, "Inserting order");

        let breakdown = serde_json::to_string(&order.breakdown)
            .map_err(|e| DbError::Internal(format!("breakdown serialization: {}", e)))?;

        sqlx::query(
            "INSERT INTO orders (\
                 id, item_subtotal_yen, shipping_yen, discount_yen, total_yen, \
                 ticket_id, breakdown, customer_name, customer_email, created_at\
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&order.id)
        .bind(order.item_subtotal_yen)
        .bind(order.shipping_yen)
        .bind(order.discount_yen)
        .bind(order.total_yen)
        .bind(&order.ticket_id)
        .bind(breakdown)
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts the shipping destination record for an order.
    ///
    /// The payload is opaque to this layer; securing it (and failing the
    /// submission when that goes wrong) belongs to the caller.
    pub async fn insert_shipping(&self, order_id: &str, payload: &str) -> DbResult<()> {
        debug!(order_id = %order_id, "Inserting shipping record");

        sqlx::query(
            "INSERT INTO order_shipping (order_id, payload, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(order_id)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, item_subtotal_yen, shipping_yen, discount_yen, total_yen, \
                    ticket_id, breakdown, customer_name, customer_email, created_at \
             FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Gets the raw shipping payload for an order, if present.
    pub async fn get_shipping(&self, order_id: &str) -> DbResult<Option<String>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM order_shipping WHERE order_id = ?1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(payload)
    }
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
