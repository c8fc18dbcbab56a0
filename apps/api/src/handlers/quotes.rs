//! # Quote Preview Handler
//!
//! Prices a draft without creating anything. Runs the same pipeline as
//! order submission (including full ticket validation), so the preview a
//! customer sees is exactly what the order would charge - nothing is
//! persisted and no redemption is counted.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::{QuoteDto, SubmissionRequest};
use crate::error::ApiError;
use crate::pipeline::price_submission;
use crate::state::AppState;

#[derive(Serialize)]
pub struct QuoteResponse {
    pub ok: bool,
    pub quote: QuoteDto,
}

/// `POST /api/quote`
pub async fn preview_quote(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    debug!(
        blocks = request.draft.blocks.len(),
        has_ticket = request.customer.ticket_code.is_some(),
        "Quote preview"
    );

    let priced = price_submission(&state, &request.draft, &request.customer, Utc::now()).await?;

    Ok(Json(QuoteResponse {
        ok: true,
        quote: QuoteDto::from_priced(&priced),
    }))
}
