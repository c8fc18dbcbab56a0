//! # Shipping Repository
//!
//! Database operations for shipping configurations and their rate matrices.
//!
//! ## Matrix Invariant
//! The admin replace path always writes the full 9-zone × 4-tier grid,
//! filling unspecified cells with 0. Reads still tolerate partial or
//! malformed matrices: a cell that fails to parse is skipped with a
//! warning, and the lookup chain in qbu-core covers the hole.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DbResult;
use qbu_core::shipping::RateMatrix;
use qbu_core::size_tier::SizeTier;
use qbu_core::zone::Zone;
use qbu_core::{ShippingConfig, ShippingRate};

/// Raw shipping config row.
#[derive(Debug, sqlx::FromRow)]
struct ShippingConfigRow {
    id: String,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ShippingConfigRow> for ShippingConfig {
    fn from(row: ShippingConfigRow) -> Self {
        ShippingConfig {
            id: row.id,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Raw rate cell row. Zone and tier are free text in storage and are
/// parsed (trim, case-fold) exactly once, here.
#[derive(Debug, sqlx::FromRow)]
struct ShippingRateRow {
    zone: String,
    size_tier: String,
    price_yen: i64,
}

impl ShippingRateRow {
    fn parse(self) -> Option<ShippingRate> {
        let zone: Zone = match self.zone.parse() {
            Ok(z) => z,
            Err(()) => {
                warn!(zone = %self.zone, "Skipping rate row with unknown zone");
                return None;
            }
        };
        let size_tier: SizeTier = match self.size_tier.parse() {
            Ok(t) => t,
            Err(()) => {
                warn!(size_tier = %self.size_tier, "Skipping rate row with unknown size tier");
                return None;
            }
        };
        Some(ShippingRate {
            zone,
            size_tier,
            price_yen: self.price_yen,
        })
    }
}

/// Repository for shipping configs and rate rows.
#[derive(Debug, Clone)]
pub struct ShippingRepository {
    pool: SqlitePool,
}

impl ShippingRepository {
    /// Creates a new ShippingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShippingRepository { pool }
    }

    /// Gets the currently active shipping config, if any.
    pub async fn active_config(&self) -> DbResult<Option<ShippingConfig>> {
        let row: Option<ShippingConfigRow> = sqlx::query_as(
            "SELECT id, name, is_active, created_at FROM shipping_configs \
             WHERE is_active = 1 ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShippingConfig::from))
    }

    /// Gets the parsed rate rows for a config. Malformed cells are skipped.
    pub async fn rates_for(&self, config_id: &str) -> DbResult<Vec<ShippingRate>> {
        let rows: Vec<ShippingRateRow> = sqlx::query_as(
            "SELECT zone, size_tier, price_yen FROM shipping_rates \
             WHERE config_id = ?1 ORDER BY rowid",
        )
        .bind(config_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(ShippingRateRow::parse).collect())
    }

    /// Gets the active config together with its rate matrix, if any.
    ///
    /// This is the read the order pipeline issues; `None` sends the
    /// pipeline to the hardcoded fallback matrix.
    pub async fn active_matrix(&self) -> DbResult<Option<(ShippingConfig, RateMatrix)>> {
        let Some(config) = self.active_config().await? else {
            return Ok(None);
        };

        let rates = self.rates_for(&config.id).await?;
        Ok(Some((config, RateMatrix::from_rows(&rates))))
    }

    /// Inserts a new shipping config with the given rates and makes it
    /// active.
    ///
    /// The full 9×4 grid is always written: cells not present in `rates`
    /// default to 0. Duplicate cells in `rates` are last-write-wins,
    /// matching matrix construction.
    pub async fn replace_active(
        &self,
        name: &str,
        rates: &[ShippingRate],
    ) -> DbResult<ShippingConfig> {
        let config = ShippingConfig {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(id = %config.id, name = %config.name, "Replacing active shipping config");

        let mut provided: HashMap<(Zone, SizeTier), i64> = HashMap::with_capacity(rates.len());
        for rate in rates {
            provided.insert((rate.zone, rate.size_tier), rate.price_yen.max(0));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE shipping_configs SET is_active = 0 WHERE is_active = 1")
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO shipping_configs (id, name, is_active, created_at) \
             VALUES (?1, ?2, 1, ?3)",
        )
        .bind(&config.id)
        .bind(&config.name)
        .bind(config.created_at)
        .execute(&mut *tx)
        .await?;

        for zone in Zone::ALL {
            for tier in SizeTier::ALL {
                let price = provided.get(&(zone, tier)).copied().unwrap_or(0);
                sqlx::query(
                    "INSERT INTO shipping_rates (id, config_id, zone, size_tier, price_yen) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&config.id)
                .bind(zone.as_str())
                .bind(tier.as_str())
                .bind(price)
                .execute(&mut *tx)
                .await?;
            }
        }

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
    use qbu_core::size_tier::SizeTier;
    use qbu_core::zone::Zone;
    use qbu_core::ShippingRate;

    fn rate(zone: Zone, size_tier: SizeTier, price_yen: i64) -> ShippingRate {
        ShippingRate {
            zone,
            size_tier,
            price_yen,
        }
    }

    #[tokio::test]
    async fn test_no_active_matrix_initially() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.shipping().active_matrix().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_writes_full_grid() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shipping();

        repo.replace_active("v1", &[rate(Zone::Kanto, SizeTier::S60, 640)])
            .await
            .unwrap();

        let (_, matrix) = repo.active_matrix().await.unwrap().unwrap();
        assert_eq!(matrix.len(), 36);
        assert_eq!(matrix.lookup(Zone::Kanto, SizeTier::S60), Some(640));
        // unspecified cells default to 0
        assert_eq!(matrix.lookup(Zone::Okinawa, SizeTier::S120), Some(0));
    }

    #[tokio::test]
    async fn test_replace_deactivates_previous() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shipping();

        let first = repo.replace_active("v1", &[]).await.unwrap();
        let second = repo
            .replace_active("v2", &[rate(Zone::Kanto, SizeTier::S60, 700)])
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let (active, matrix) = repo.active_matrix().await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(matrix.lookup(Zone::Kanto, SizeTier::S60), Some(700));
    }

    #[tokio::test]
    async fn test_duplicate_rates_last_write_wins() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shipping();

        repo.replace_active(
            "v1",
            &[
                rate(Zone::Kinki, SizeTier::S80, 900),
                rate(Zone::Kinki, SizeTier::S80, 950),
            ],
        )
        .await
        .unwrap();

        let (_, matrix) = repo.active_matrix().await.unwrap().unwrap();
        assert_eq!(matrix.lookup(Zone::Kinki, SizeTier::S80), Some(950));
    }
}
