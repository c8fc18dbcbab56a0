//! # qbu-core: Pure Pricing Logic for the Q-BU! Print Shop
//!
//! This crate is the **heart** of the Q-BU! order backend. It contains the
//! whole print-order pricing pipeline as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Q-BU! Order Backend Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront Frontend (React)                     │   │
//! │  │    Voxel Editor ──► Quote Preview ──► Checkout Form             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (Axum handlers)                     │   │
//! │  │    POST /api/quote, POST /api/orders                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ★ qbu-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  volume  │ │ pricing  │ │ shipping │ │      ticket      │  │   │
//! │  │   │  model   │ │  quote   │ │ zone+tier│ │ validate+discount│  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                        ┌───────────┐                            │   │
//! │  │                        │ assembler │  final total + breakdown   │   │
//! │  │                        └───────────┘                            │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    qbu-db (Database Layer)                      │   │
//! │  │       SQLite: configs, tickets, redemptions, orders             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Voxel model geometry (block keys, bounding box, connectivity)
//! - [`volume`] - Print volume estimation from block counts
//! - [`money`] - Whole-yen integer money type (no floating point totals!)
//! - [`pricing`] - Quote computation (base fee + volume fee, minimum, rounding)
//! - [`size_tier`] - Shipping size-tier resolution from bounding-box girth
//! - [`zone`] - Prefecture → shipping zone resolution
//! - [`shipping`] - Shipping rate matrix lookup with hardcoded fallback
//! - [`ticket`] - Discount ticket validation and discount computation
//! - [`assembler`] - Final order price assembly and audit breakdown
//! - [`types`] - Domain entities (PricingConfig, Ticket, Order, ...)
//! - [`validation`] - Submission input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same yen
//! 2. **No I/O**: Database, network, clock access is FORBIDDEN here; `now` is
//!    always a parameter
//! 3. **Integer Yen**: All totals are whole yen (i64); floats only appear for
//!    physical measurements (cm³, mm)
//! 4. **Total over inputs**: out-of-range numerics clamp, they never panic
//!
//! ## Example Usage
//!
//! ```rust
//! use qbu_core::pricing::{quote_volume, PricingParams};
//!
//! // 10 cm³ against the fallback pricing parameters
//! let quote = quote_volume(10.0, &PricingParams::fallback());
//!
//! // base 800 + 10 × 60 = 1400, already a multiple of the 10-yen step
//! assert_eq!(quote.subtotal_yen, 1400);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assembler;
pub mod error;
pub mod model;
pub mod money;
pub mod pricing;
pub mod shipping;
pub mod size_tier;
pub mod ticket;
pub mod types;
pub mod validation;
pub mod volume;
pub mod zone;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use qbu_core::Yen` instead of
// `use qbu_core::money::Yen`

pub use assembler::{assemble_order_price, OrderPrice, QuoteBreakdown, ShippingQuote};
pub use error::{CoreError, ValidationError};
pub use money::Yen;
pub use pricing::{quote_volume, PricingParams, Quote};
pub use shipping::{resolve_shipping_yen, RateMatrix};
pub use size_tier::{resolve_size_tier, SizeTier, SizeTierResult};
pub use ticket::{ApplyScope, Ticket, TicketKind, TicketRejection, TicketUsage};
pub use types::*;
pub use zone::{resolve_zone, Zone};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Packaging allowance added to every bounding-box dimension, in millimeters.
///
/// ## Why a constant?
/// The carrier measures the outer box, not the bare print. 20mm per axis
/// covers the protective padding used by fulfillment. Configurable per-shop
/// in a future version.
pub const DEFAULT_PADDING_MM: f64 = 20.0;

/// Maximum number of block keys accepted in a single submission
/// (base and support blocks counted together).
///
/// ## Business Reason
/// The editor grid is bounded; anything beyond this is a malformed or
/// hostile payload, not a printable model.
pub const MAX_BLOCKS_PER_ORDER: usize = 65_536;

/// The only currency the shop accounts in. Whole yen, no minor unit.
pub const CURRENCY: &str = "JPY";
