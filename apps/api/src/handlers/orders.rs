//! # Order Submission Handler
//!
//! The submission boundary: prices the draft, persists the order with its
//! frozen breakdown, then dispatches the best-effort side effects.
//!
//! ## Handler Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  parse ──► validate ──► geometry guard ──► price (pipeline)             │
//! │                                               │                         │
//! │                                               ▼                         │
//! │  insert order row ──fail──► 500 order_insert_failed                     │
//! │  insert shipping record ──fail──► 500 shipping_encrypt_failed           │
//! │       │                                                                 │
//! │       ▼ (committed)                                                     │
//! │  spawn: redemption record, audit log, invoice email  (best-effort)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  200 { ok, order_id, quote, ticket_id }                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use super::{QuoteDto, SubmissionRequest};
use crate::error::ApiError;
use crate::pipeline::price_submission;
use crate::state::AppState;
use crate::tasks::dispatch_order_side_effects;
use qbu_core::{CustomerInfo, Order};
use qbu_db::generate_order_id;

#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub ok: bool,
    pub order_id: String,
    pub quote: QuoteDto,
    pub ticket_id: Option<String>,
}

/// `POST /api/orders`
pub async fn submit_order(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<SubmitOrderResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let now = Utc::now();

    let priced = price_submission(&state, &request.draft, &request.customer, now).await?;
    let ticket_id = priced.ticket.as_ref().map(|t| t.id.clone());

    let order = Order {
        id: generate_order_id(),
        item_subtotal_yen: priced.price.item_subtotal_yen,
        shipping_yen: priced.price.shipping_yen,
        discount_yen: priced.price.discount_yen,
        total_yen: priced.price.total_yen,
        ticket_id: ticket_id.clone(),
        breakdown: priced.price.breakdown.clone(),
        customer_name: request.customer.name.trim().to_string(),
        customer_email: request.customer.email.trim().to_string(),
        created_at: now,
    };

    // Hard failure: without the order row there is no order
    state.db.orders().insert_order(&order).await.map_err(|e| {
        error!(error = %e, order_id = %order.id, "Order insert failed");
        ApiError::order_insert_failed()
    })?;

    // Hard failure: an order we cannot ship to is not accepted either
    let shipping_payload = seal_shipping_payload(&request.customer).ok_or_else(|| {
        error!(order_id = %order.id, "Shipping payload serialization failed");
        ApiError::shipping_encrypt_failed()
    })?;
    state
        .db
        .orders()
        .insert_shipping(&order.id, &shipping_payload)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = %order.id, "Shipping record insert failed");
            ApiError::shipping_encrypt_failed()
        })?;

    info!(
        order_id = %order.id,
        total = %order.total_yen,
        discount = %order.discount_yen,
        ticket = ?ticket_id,
        "Order accepted"
    );

    let order_id = order.id.clone();
    let quote = QuoteDto::from_priced(&priced);
    dispatch_order_side_effects(state, order, priced.ticket, priced.redeemer_id);

    Ok(Json(SubmitOrderResponse {
        ok: true,
        order_id,
        quote,
        ticket_id,
    }))
}

/// Serializes the destination fields into the shipping record payload.
///
/// The store treats this blob as opaque; securing it at rest is the
/// store's concern, failing the submission when it cannot be produced is
/// ours.
fn seal_shipping_payload(customer: &CustomerInfo) -> Option<String> {
    let payload = serde_json::json!({
        "name": customer.name.trim(),
        "postalCode": customer.postal_code,
        "prefecture": customer.prefecture,
        "city": customer.city,
        "town": customer.town,
        "addressLine2": customer.address_line2,
        "address": customer.address,
    });
    serde_json::to_string(&payload).ok()
}
