//! # Submission Pricing Pipeline
//!
//! Runs one draft through the full pricing pipeline: validation → geometry
//! → volume → quote → zone/tier/rate → ticket → assembly. Shared by the
//! quote-preview and order-submission handlers so a preview can never
//! disagree with the persisted order.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  draft + customer                                                       │
//! │       │                                                                 │
//! │       ├── validate_draft / validate_customer      (400 on failure)      │
//! │       ├── VoxelModel::from_keys + is_connected    (400 on failure)      │
//! │       │                                                                 │
//! │       ├── pricing_configs().active() ──unavailable──► fallback params   │
//! │       ├── shipping().active_matrix() ──unavailable──► fallback matrix   │
//! │       ├── tickets().find + usage     ──any failure──► invalid_ticket    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  assemble_order_price() → PricedSubmission                              │
//! │                                                                         │
//! │  Config reads never fail the submission; ticket problems always do      │
//! │  (the customer must be told, not silently overcharged).                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;
use qbu_core::model::VoxelModel;
use qbu_core::shipping::RateMatrix;
use qbu_core::ticket::hash_ticket_code;
use qbu_core::validation::{validate_customer, validate_draft};
use qbu_core::volume::estimate_volume_cm3;
use qbu_core::{
    assemble_order_price, quote_volume, resolve_shipping_yen, resolve_size_tier, CoreError,
    CustomerInfo, OrderDraft, OrderPrice, PricingParams, ShippingQuote, Ticket, TicketRejection,
    DEFAULT_PADDING_MM,
};

/// The result of pricing one submission, ready to persist or to preview.
#[derive(Debug, Clone)]
pub struct PricedSubmission {
    pub price: OrderPrice,
    /// The validated ticket, when a code was submitted.
    pub ticket: Option<Ticket>,
    /// Identity the ticket limits were counted against.
    pub redeemer_id: String,
}

/// Prices a draft for the given customer.
///
/// `now` is passed in (not read here) so previews, submissions, and tests
/// all price against an explicit instant.
pub async fn price_submission(
    state: &AppState,
    draft: &OrderDraft,
    customer: &CustomerInfo,
    now: DateTime<Utc>,
) -> Result<PricedSubmission, ApiError> {
    // ---- 1. Input validation, before any pricing work ----
    validate_draft(draft).map_err(ApiError::from)?;
    validate_customer(customer).map_err(ApiError::from)?;

    // ---- 2. Geometry guard ----
    let model =
        VoxelModel::from_keys(&draft.blocks, &draft.support_blocks).map_err(ApiError::from)?;
    if !model.is_connected() {
        return Err(CoreError::ModelNotReady.into());
    }

    // ---- 3. Volume and item quote ----
    let mm_per_unit = model.mm_per_unit(&draft.scale_setting);
    let volume_cm3 = estimate_volume_cm3(
        model.block_count() as i64,
        model.support_block_count() as i64,
        mm_per_unit,
    );

    // The two config snapshots are independent reads
    let (pricing, active_matrix) =
        tokio::join!(load_pricing_params(state), load_active_matrix(state));
    let quote = quote_volume(volume_cm3, &pricing);

    // ---- 4. Shipping leg ----
    let zone = customer
        .prefecture
        .as_deref()
        .and_then(qbu_core::resolve_zone);
    let tier = resolve_size_tier(model.size_mm(mm_per_unit), DEFAULT_PADDING_MM);

    let shipping_yen = resolve_shipping_yen(
        active_matrix.as_ref().map(|(_, m)| m),
        zone,
        tier.size_tier,
    );
    // Attribute the price to the active config only when its matrix
    // actually supplied the cell
    let config_id = match (&active_matrix, zone) {
        (Some((config_id, matrix)), Some(z)) if matrix.lookup(z, tier.size_tier).is_some() => {
            Some(config_id.clone())
        }
        _ => None,
    };

    let shipping = ShippingQuote {
        config_id,
        zone,
        tier,
        yen: shipping_yen,
    };

    // ---- 5. Ticket validation (fresh, per attempt) ----
    let redeemer_id = customer.redeemer_id();
    let ticket = match customer.ticket_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            Some(validate_ticket_code(state, code, &redeemer_id, now).await?)
        }
        _ => None,
    };

    // ---- 6. Assembly ----
    let price = assemble_order_price(&quote, &shipping, ticket.as_ref());

    Ok(PricedSubmission {
        price,
        ticket,
        redeemer_id,
    })
}

/// Loads the active pricing parameters, degrading to the documented
/// fallback on a missing row or a failed query. Submission must stay
/// possible with the config store down.
async fn load_pricing_params(state: &AppState) -> PricingParams {
    match state.db.pricing_configs().active().await {
        Ok(Some(config)) => config.params(),
        Ok(None) => {
            warn!("No active pricing config; using fallback parameters");
            PricingParams::fallback()
        }
        Err(e) => {
            warn!(error = %e, "Pricing config query failed; using fallback parameters");
            PricingParams::fallback()
        }
    }
}

/// Loads the active shipping matrix, or `None` on miss/failure (which
/// sends the rate lookup to the hardcoded fallback matrix).
async fn load_active_matrix(state: &AppState) -> Option<(String, RateMatrix)> {
    match state.db.shipping().active_matrix().await {
        Ok(Some((config, matrix))) => Some((config.id, matrix)),
        Ok(None) => {
            warn!("No active shipping config; using fallback rates");
            None
        }
        Err(e) => {
            warn!(error = %e, "Shipping config query failed; using fallback rates");
            None
        }
    }
}

/// Validates a submitted ticket code end to end: lookup by salted hash,
/// fresh usage counts, then the state-machine checks.
///
/// Every failure path is `invalid_ticket`; a lookup or count failure is
/// conservatively invalid rather than silently allowed.
async fn validate_ticket_code(
    state: &AppState,
    code: &str,
    redeemer_id: &str,
    now: DateTime<Utc>,
) -> Result<Ticket, ApiError> {
    let hash = hash_ticket_code(code, &state.config.ticket_salt);

    let ticket = match state.db.tickets().find_by_code_hash(&hash).await {
        Ok(Some(ticket)) => ticket,
        Ok(None) => return Err(ApiError::invalid_ticket(TicketRejection::NotFound)),
        Err(e) => {
            warn!(error = %e, "Ticket lookup failed; rejecting conservatively");
            return Err(ApiError::invalid_ticket(TicketRejection::UsageUnavailable));
        }
    };

    let usage = match state.db.tickets().usage(&ticket.id, redeemer_id).await {
        Ok(usage) => usage,
        Err(e) => {
            warn!(error = %e, ticket_id = %ticket.id, "Usage count failed; rejecting conservatively");
            return Err(ApiError::invalid_ticket(TicketRejection::UsageUnavailable));
        }
    };

    ticket
        .validate(&usage, now)
        .map_err(ApiError::invalid_ticket)?;

    Ok(ticket)
}
