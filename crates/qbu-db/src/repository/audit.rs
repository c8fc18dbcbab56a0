//! # Audit Log Repository
//!
//! Append-only, best-effort audit trail. Callers fire these writes after
//! the order decision is committed; a failure here is logged and swallowed,
//! never propagated into the submission result.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends an audit entry.
    pub async fn append(&self, action: &str, detail: &serde_json::Value) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO audit_logs (id, action, detail, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(action)
        .bind(detail.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of entries for an action (diagnostics and tests).
    pub async fn count(&self, action: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE action = ?1")
            .bind(action)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
