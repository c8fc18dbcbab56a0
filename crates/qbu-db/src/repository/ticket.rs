//! # Ticket Repository
//!
//! Database operations for discount tickets and their redemption ledger.
//!
//! ## Usage Counting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tickets                 ticket_redemptions (append-only)               │
//! │  ┌────────────────┐      ┌──────────────────────────────┐               │
//! │  │ max_total_uses │      │ ticket_id, redeemer_id, ...  │               │
//! │  │ max_uses_per_  │      │ ticket_id, redeemer_id, ...  │               │
//! │  │          user  │      └──────────────┬───────────────┘               │
//! │  └───────┬────────┘                     │                               │
//! │          │          usage(ticket, id)   │                               │
//! │          └─────► COUNT rows ◄───────────┘                               │
//! │                                                                         │
//! │  No mutable counter on the ticket row. Counting at validation time     │
//! │  is eventually-consistent under concurrent redemption; the pipeline    │
//! │  accepts that instead of taking a cross-order lock.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use qbu_core::ticket::{ApplyScope, TicketKind};
use qbu_core::{Ticket, TicketRedemption, TicketUsage};

/// Raw ticket row. Kind and scope are stored as text and parsed exactly
/// once, here; a row that fails to parse is a [`DbError::MalformedRow`].
#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: String,
    code_prefix: String,
    kind: String,
    value: i64,
    apply_scope: String,
    shipping_free: bool,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    max_total_uses: Option<i64>,
    max_uses_per_user: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DbError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let kind: TicketKind = row
            .kind
            .parse()
            .map_err(|()| DbError::malformed("Ticket", &row.id, format!("kind '{}'", row.kind)))?;
        let apply_scope: ApplyScope = row.apply_scope.parse().map_err(|()| {
            DbError::malformed(
                "Ticket",
                &row.id,
                format!("apply_scope '{}'", row.apply_scope),
            )
        })?;

        Ok(Ticket {
            id: row.id,
            code_prefix: row.code_prefix,
            kind,
            value: row.value,
            apply_scope,
            shipping_free: row.shipping_free,
            is_active: row.is_active,
            expires_at: row.expires_at,
            max_total_uses: row.max_total_uses,
            max_uses_per_user: row.max_uses_per_user,
            created_at: row.created_at,
        })
    }
}

const TICKET_COLUMNS: &str = "id, code_prefix, kind, value, apply_scope, shipping_free, \
                              is_active, expires_at, max_total_uses, max_uses_per_user, created_at";

/// Repository for tickets and redemption records.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Creates a new TicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    /// Looks a ticket up by the salted hash of its code.
    ///
    /// The raw code never reaches the database; hashing happens in the
    /// handler with the shop-wide salt.
    pub async fn find_by_code_hash(&self, code_hash: &str) -> DbResult<Option<Ticket>> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE code_hash = ?1"
        ))
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Ticket::try_from).transpose()
    }

    /// Gets a ticket by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Ticket>> {
        let row: Option<TicketRow> =
            sqlx::query_as(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Ticket::try_from).transpose()
    }

    /// Inserts a ticket. `code_hash` is stored alongside the entity; it is
    /// deliberately not a field of [`Ticket`] so it cannot leak outward.
    pub async fn insert(&self, ticket: &Ticket, code_hash: &str) -> DbResult<()> {
        debug!(id = %ticket.id, prefix = %ticket.code_prefix, "Inserting ticket");

        sqlx::query(
            "INSERT INTO tickets (\
                 id, code_hash, code_prefix, kind, value, apply_scope, shipping_free, \
                 is_active, expires_at, max_total_uses, max_uses_per_user, created_at\
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&ticket.id)
        .bind(code_hash)
        .bind(&ticket.code_prefix)
        .bind(ticket.kind.as_str())
        .bind(ticket.value)
        .bind(ticket.apply_scope.as_str())
        .bind(ticket.shipping_free)
        .bind(ticket.is_active)
        .bind(ticket.expires_at)
        .bind(ticket.max_total_uses)
        .bind(ticket.max_uses_per_user)
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fresh usage counts for one validation attempt.
    ///
    /// One query returns both the aggregate count and the count for the
    /// redeeming identity; the caller treats a failure here as an invalid
    /// ticket rather than guessing at limits.
    pub async fn usage(&self, ticket_id: &str, redeemer_id: &str) -> DbResult<TicketUsage> {
        let (total, by_redeemer): (i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(CASE WHEN redeemer_id = ?2 THEN 1 ELSE 0 END) \
             FROM ticket_redemptions WHERE ticket_id = ?1",
        )
        .bind(ticket_id)
        .bind(redeemer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TicketUsage {
            total,
            by_redeemer: by_redeemer.unwrap_or(0),
        })
    }

    /// Appends a redemption record.
    ///
    /// Called after the order row is committed; failure here is logged by
    /// the caller and never rolls the order back.
    pub async fn record_redemption(&self, redemption: &TicketRedemption) -> DbResult<()> {
        debug!(
            ticket_id = %redemption.ticket_id,
            order_id = %redemption.order_id,
            discount = %redemption.discount_yen,
            "Recording ticket redemption"
        );

        let snapshot = redemption.snapshot.to_string();

        sqlx::query(
            "INSERT INTO ticket_redemptions (\
                 id, ticket_id, order_id, redeemer_id, discount_yen, snapshot, created_at\
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&redemption.id)
        .bind(&redemption.ticket_id)
        .bind(&redemption.order_id)
        .bind(&redemption.redeemer_id)
        .bind(redemption.discount_yen)
        .bind(snapshot)
        .bind(redemption.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Generates a new redemption record ID.
pub fn generate_redemption_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use qbu_core::ticket::hash_ticket_code;

    fn ticket(id: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            code_prefix: "QBU2".to_string(),
            kind: TicketKind::Percent,
            value: 20,
            apply_scope: ApplyScope::Subtotal,
            shipping_free: false,
            is_active: true,
            expires_at: None,
            max_total_uses: Some(10),
            max_uses_per_user: Some(1),
            created_at: Utc::now(),
        }
    }

    fn redemption(ticket_id: &str, order_id: &str, redeemer_id: &str) -> TicketRedemption {
        TicketRedemption {
            id: generate_redemption_id(),
            ticket_id: ticket_id.to_string(),
            order_id: order_id.to_string(),
            redeemer_id: redeemer_id.to_string(),
            discount_yen: 280,
            snapshot: serde_json::json!({"kind": "percent", "value": 20}),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_by_code_hash() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tickets();

        let hash = hash_ticket_code("QBU2026-LAUNCH", "test-salt");
        repo.insert(&ticket("tkt-1"), &hash).await.unwrap();

        let found = repo.find_by_code_hash(&hash).await.unwrap().unwrap();
        assert_eq!(found.id, "tkt-1");
        assert_eq!(found.kind, TicketKind::Percent);
        assert_eq!(found.apply_scope, ApplyScope::Subtotal);

        let miss = repo
            .find_by_code_hash(&hash_ticket_code("WRONG", "test-salt"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_hash_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tickets();

        let hash = hash_ticket_code("QBU2026", "s");
        repo.insert(&ticket("tkt-1"), &hash).await.unwrap();
        let err = repo.insert(&ticket("tkt-2"), &hash).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_usage_counts_are_scoped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tickets();

        let hash = hash_ticket_code("QBU2026", "s");
        repo.insert(&ticket("tkt-1"), &hash).await.unwrap();

        repo.record_redemption(&redemption("tkt-1", "ord-1", "alice@example.com"))
            .await
            .unwrap();
        repo.record_redemption(&redemption("tkt-1", "ord-2", "bob@example.com"))
            .await
            .unwrap();
        repo.record_redemption(&redemption("tkt-1", "ord-3", "alice@example.com"))
            .await
            .unwrap();

        let usage = repo.usage("tkt-1", "alice@example.com").await.unwrap();
        assert_eq!(usage.total, 3);
        assert_eq!(usage.by_redeemer, 2);

        let usage = repo.usage("tkt-1", "carol@example.com").await.unwrap();
        assert_eq!(usage.total, 3);
        assert_eq!(usage.by_redeemer, 0);
    }

    #[tokio::test]
    async fn test_usage_empty_ledger() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let usage = db.tickets().usage("missing", "nobody").await.unwrap();
        assert_eq!(usage.total, 0);
        assert_eq!(usage.by_redeemer, 0);
    }

    #[tokio::test]
    async fn test_malformed_kind_rejected_at_boundary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tickets();

        sqlx::query(
            "INSERT INTO tickets (id, code_hash, code_prefix, kind, value, apply_scope, \
             shipping_free, is_active, created_at) \
             VALUES ('bad-1', 'hash-1', 'XX', 'bogus_kind', 0, 'subtotal', 0, 1, ?1)",
        )
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let err = repo.find_by_code_hash("hash-1").await.unwrap_err();
        assert!(matches!(err, DbError::MalformedRow { .. }));
    }
}
