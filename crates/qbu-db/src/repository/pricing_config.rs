//! # Pricing Config Repository
//!
//! Database operations for the versioned pricing configuration.
//!
//! ## Versioning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert_active(params)                                                  │
//! │     └── TX: UPDATE old active → inactive, INSERT new row active         │
//! │                                                                         │
//! │  active()                                                               │
//! │     └── the one row the pricing pipeline consumes                       │
//! │         (None → pipeline falls back to PricingParams::fallback())       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use qbu_core::{PricingConfig, PricingParams, CURRENCY};

/// Raw pricing config row, parsed into [`PricingConfig`] at this boundary.
#[derive(Debug, sqlx::FromRow)]
struct PricingConfigRow {
    id: String,
    base_fee_yen: i64,
    per_cm3_yen: i64,
    min_fee_yen: i64,
    rounding_step_yen: i64,
    currency: String,
    is_active: bool,
    effective_from: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<PricingConfigRow> for PricingConfig {
    fn from(row: PricingConfigRow) -> Self {
        PricingConfig {
            id: row.id,
            base_fee_yen: row.base_fee_yen,
            per_cm3_yen: row.per_cm3_yen,
            min_fee_yen: row.min_fee_yen,
            rounding_step_yen: row.rounding_step_yen,
            currency: row.currency,
            is_active: row.is_active,
            effective_from: row.effective_from,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, base_fee_yen, per_cm3_yen, min_fee_yen, rounding_step_yen, \
                              currency, is_active, effective_from, created_at";

/// Repository for pricing configuration rows.
#[derive(Debug, Clone)]
pub struct PricingConfigRepository {
    pool: SqlitePool,
}

impl PricingConfigRepository {
    /// Creates a new PricingConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PricingConfigRepository { pool }
    }

    /// Gets the currently active pricing config, if any.
    pub async fn active(&self) -> DbResult<Option<PricingConfig>> {
        let row: Option<PricingConfigRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM pricing_configs \
             WHERE is_active = 1 ORDER BY created_at DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PricingConfig::from))
    }

    /// Gets a pricing config by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PricingConfig>> {
        let row: Option<PricingConfigRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM pricing_configs WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(PricingConfig::from))
    }

    /// Inserts a new pricing config and makes it the active one.
    ///
    /// The previous active row is deactivated in the same transaction, so
    /// there is never a moment with two active configs.
    pub async fn insert_active(
        &self,
        params: PricingParams,
        effective_from: Option<DateTime<Utc>>,
    ) -> DbResult<PricingConfig> {
        let config = PricingConfig {
            id: Uuid::new_v4().to_string(),
            base_fee_yen: params.base_fee_yen,
            per_cm3_yen: params.per_cm3_yen,
            min_fee_yen: params.min_fee_yen,
            rounding_step_yen: params.rounding_step_yen,
            currency: CURRENCY.to_string(),
            is_active: true,
            effective_from,
            created_at: Utc::now(),
        };

        debug!(id = %config.id, "Inserting active pricing config");

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE pricing_configs SET is_active = 0 WHERE is_active = 1")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO pricing_configs (\
                 id, base_fee_yen, per_cm3_yen, min_fee_yen, rounding_step_yen, \
                 currency, is_active, effective_from, created_at\
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)",
        )
        .bind(&config.id)
        .bind(config.base_fee_yen)
        .bind(config.per_cm3_yen)
        .bind(config.min_fee_yen)
        .bind(config.rounding_step_yen)
        .bind(&config.currency)
        .bind(config.effective_from)
        .bind(config.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(config)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use qbu_core::PricingParams;

    #[tokio::test]
    async fn test_no_active_config_initially() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.pricing_configs().active().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_activates_and_deactivates_previous() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.pricing_configs();

        let first = repo
            .insert_active(PricingParams::fallback(), None)
            .await
            .unwrap();
        let second = repo
            .insert_active(
                PricingParams {
                    base_fee_yen: 1000,
                    per_cm3_yen: 80,
                    min_fee_yen: 1500,
                    rounding_step_yen: 50,
                },
                None,
            )
            .await
            .unwrap();

        let active = repo.active().await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(active.base_fee_yen, 1000);

        let old = repo.get_by_id(&first.id).await.unwrap().unwrap();
        assert!(!old.is_active);
    }

    #[tokio::test]
    async fn test_active_params_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.pricing_configs();

        repo.insert_active(PricingParams::fallback(), None)
            .await
            .unwrap();

        let active = repo.active().await.unwrap().unwrap();
        assert_eq!(active.params(), PricingParams::fallback());
        assert_eq!(active.currency, "JPY");
    }
}
