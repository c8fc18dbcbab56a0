//! # Domain Types
//!
//! Core domain entities used throughout the Q-BU! order backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PricingConfig  │   │ ShippingConfig  │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  base_fee_yen   │   │  name           │   │  total_yen      │       │
//! │  │  per_cm3_yen    │   │  is_active      │   │  ticket_id?     │       │
//! │  │  min_fee_yen    │   │  rate rows ──┐  │   │  breakdown      │       │
//! │  │  rounding_step  │   └──────────────┼──┘   └─────────────────┘       │
//! │  └─────────────────┘                  │                                 │
//! │                        ┌──────────────▼──┐   ┌─────────────────┐       │
//! │                        │  ShippingRate   │   │TicketRedemption │       │
//! │                        │  (zone, tier)   │   │  append-only    │       │
//! │                        │  → price_yen    │   │  usage ledger   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Versioned Config Pattern
//! Pricing and shipping configs are append-only: a new row is inserted and
//! marked active while the previous active row is deactivated. This crate
//! only *consumes* the active row; when none exists the pipeline falls back
//! to hardcoded defaults so order submission stays possible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::assembler::QuoteBreakdown;
use crate::pricing::PricingParams;
use crate::size_tier::SizeTier;
use crate::zone::Zone;

// =============================================================================
// Scale Setting
// =============================================================================

/// How the editor's unit grid maps to real-world millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMode {
    /// The model's longest bounding-box side is printed at `max_side_mm`.
    MaxSide,
    /// Every block edge is printed at `block_edge_mm`.
    BlockEdge,
}

/// The scale setting attached to a draft.
///
/// Only the field matching `mode` is consulted; the other may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSetting {
    pub mode: ScaleMode,
    pub max_side_mm: Option<f64>,
    pub block_edge_mm: Option<f64>,
}

// =============================================================================
// Order Draft
// =============================================================================

/// The printable draft submitted from the editor.
///
/// Block keys are `"x,y,z"` integer grid coordinates. Support blocks are the
/// auxiliary sub-voxels the editor adds to make the model a single connected
/// component.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub blocks: Vec<String>,
    #[serde(default)]
    pub support_blocks: Vec<String>,
    pub scale_setting: ScaleSetting,
}

// =============================================================================
// Customer
// =============================================================================

/// Customer contact and shipping destination fields from the checkout form.
///
/// The address is accepted either as one free-text line or as the structured
/// prefecture/city/town triple the postal-lookup widget fills in.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub prefecture: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub ticket_code: Option<String>,
    /// Anonymous identity for per-identity ticket limits when the customer
    /// is not signed in.
    #[serde(default)]
    pub anon_id: Option<String>,
}

impl CustomerInfo {
    /// The identity that ticket per-user limits are counted against:
    /// the anonymous id when present, otherwise the (lowercased) email.
    pub fn redeemer_id(&self) -> String {
        match &self.anon_id {
            Some(anon) if !anon.trim().is_empty() => anon.trim().to_string(),
            _ => self.email.trim().to_lowercase(),
        }
    }
}

// =============================================================================
// Pricing Config
// =============================================================================

/// A versioned pricing configuration row.
///
/// Exactly one row is active at a time; activation is enforced by the
/// admin write path, not by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub id: String,
    pub base_fee_yen: i64,
    pub per_cm3_yen: i64,
    pub min_fee_yen: i64,
    pub rounding_step_yen: i64,
    pub currency: String,
    pub is_active: bool,
    #[ts(as = "Option<String>")]
    pub effective_from: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PricingConfig {
    /// The pricing parameters this config contributes to the quoter.
    #[inline]
    pub fn params(&self) -> PricingParams {
        PricingParams {
            base_fee_yen: self.base_fee_yen,
            per_cm3_yen: self.per_cm3_yen,
            min_fee_yen: self.min_fee_yen,
            rounding_step_yen: self.rounding_step_yen,
        }
    }
}

// =============================================================================
// Shipping Config
// =============================================================================

/// A versioned shipping configuration row. Owns a set of [`ShippingRate`]
/// rows covering the 9-zone × 4-tier grid.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingConfig {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One cell of a shipping rate matrix.
///
/// Zone and tier are already parsed; free-text normalization happens at the
/// storage boundary, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRate {
    pub zone: Zone,
    pub size_tier: SizeTier,
    pub price_yen: i64,
}

// =============================================================================
// Ticket Redemption
// =============================================================================

/// An append-only record of one ticket redemption.
///
/// ## Why append-only?
/// Redemption rows are the sole source of truth for usage-limit
/// enforcement. There is no mutable use-counter on the ticket itself;
/// limits are enforced by counting these rows at validation time.
/// Counting is best-effort under concurrent redemption (no distributed
/// lock), which is an accepted tradeoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRedemption {
    pub id: String,
    pub ticket_id: String,
    pub order_id: String,
    /// User id when signed in, otherwise the anonymous identity.
    pub redeemer_id: String,
    pub discount_yen: i64,
    /// Snapshot of the ticket at redemption time, for dispute resolution.
    pub snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// An accepted print order.
///
/// Uses the snapshot pattern: the full quote breakdown is frozen into the
/// order so the charge can be reconstructed later even after pricing or
/// shipping configs change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub item_subtotal_yen: i64,
    pub shipping_yen: i64,
    pub discount_yen: i64,
    pub total_yen: i64,
    pub ticket_id: Option<String>,
    pub breakdown: QuoteBreakdown,
    pub customer_name: String,
    pub customer_email: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
