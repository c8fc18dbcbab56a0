//! # HTTP Handlers
//!
//! One module per route group. Handlers stay thin: parse, run the shared
//! pricing pipeline, persist, respond.

pub mod health;
pub mod orders;
pub mod quotes;

use serde::{Deserialize, Serialize};

use crate::pipeline::PricedSubmission;
use qbu_core::{CustomerInfo, OrderDraft};

/// The submission payload shared by quote preview and order submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub draft: OrderDraft,
    pub customer: CustomerInfo,
}

/// The quote object returned to the storefront.
///
/// Field names are the wire contract (snake_case), distinct from the
/// camelCase persisted breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteDto {
    pub item_subtotal_yen: i64,
    pub shipping_yen: i64,
    pub total_before_discount_yen: i64,
    pub discount_yen: i64,
    pub total_yen: i64,
    pub ticket_apply_scope: Option<&'static str>,
    pub shipping_zone: Option<&'static str>,
    pub shipping_size_tier: &'static str,
}

impl QuoteDto {
    /// Builds the wire quote from a priced submission.
    pub fn from_priced(priced: &PricedSubmission) -> Self {
        let price = &priced.price;
        QuoteDto {
            item_subtotal_yen: price.item_subtotal_yen,
            shipping_yen: price.shipping_yen,
            total_before_discount_yen: price.total_before_discount_yen,
            discount_yen: price.discount_yen,
            total_yen: price.total_yen,
            ticket_apply_scope: priced.ticket.as_ref().map(|t| t.apply_scope.as_str()),
            shipping_zone: price.breakdown.shipping.zone.map(|z| z.as_str()),
            shipping_size_tier: price.breakdown.shipping.size_tier.as_str(),
        }
    }
}
