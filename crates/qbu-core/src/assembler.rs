//! # Order Price Assembly
//!
//! Combines the item quote, the shipping cost, and an optional validated
//! ticket into the final order total and the audit-ready breakdown persisted
//! with the order.
//!
//! ## Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_before_discount = item_subtotal + shipping                       │
//! │                                                                         │
//! │  with a ticket:                                                         │
//! │    raw_discount = ticket.discount_yen(...)                              │
//! │                 + shipping           (when the ticket zeroes shipping)  │
//! │                 ... clamped to total_before_discount                    │
//! │    raw_final    = max(0, total_before_discount − raw_discount)          │
//! │    total        = round_to_step(raw_final, rounding_step)               │
//! │    discount     = total_before_discount − total      ◄── RECOMPUTED     │
//! │                                                                         │
//! │  without a ticket:                                                      │
//! │    total = total_before_discount   (no re-rounding beyond the           │
//! │                                     subtotal's own)                     │
//! │                                                                         │
//! │  The recompute is the reconciliation guarantee:                         │
//! │    item_subtotal + shipping − discount == total, exactly, always        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure: persistence and redemption logging are the caller's job.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Yen;
use crate::pricing::Quote;
use crate::size_tier::{SizeTier, SizeTierResult};
use crate::ticket::{ApplyScope, Ticket, TicketKind};
use crate::zone::Zone;

// =============================================================================
// Shipping Quote
// =============================================================================

/// The resolved shipping leg of a quote, as fed into the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingQuote {
    /// Active shipping config id, `None` when the fallback matrix priced it.
    pub config_id: Option<String>,
    /// `None` when the destination prefecture did not resolve.
    pub zone: Option<Zone>,
    pub tier: SizeTierResult,
    pub yen: i64,
}

// =============================================================================
// Breakdown
// =============================================================================

/// Ticket fields frozen into the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TicketSnapshot {
    pub id: String,
    pub kind: TicketKind,
    pub value: i64,
    pub apply_scope: ApplyScope,
}

/// Shipping fields frozen into the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingBreakdown {
    pub config_id: Option<String>,
    pub zone: Option<Zone>,
    pub size_tier: SizeTier,
    pub yen: i64,
    pub sum_cm: f64,
    pub capped_tier: bool,
}

/// The permanent audit record persisted alongside an order.
///
/// Must be reconstructible from the same inputs (pricing config snapshot +
/// shipping config snapshot + ticket snapshot) to support later dispute
/// resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBreakdown {
    pub base_fee_yen: i64,
    pub volume_fee_yen: i64,
    pub rounding_step_yen: i64,
    pub item_subtotal_yen: i64,
    pub shipping: ShippingBreakdown,
    pub total_before_discount_yen: i64,
    pub total_yen: i64,
    /// Only present when a ticket applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_discount_yen: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_yen: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<TicketSnapshot>,
}

// =============================================================================
// Order Price
// =============================================================================

/// The assembled order price: the numbers the order row is billed with,
/// plus the full breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPrice {
    pub item_subtotal_yen: i64,
    pub shipping_yen: i64,
    pub total_before_discount_yen: i64,
    pub discount_yen: i64,
    pub total_yen: i64,
    pub breakdown: QuoteBreakdown,
}

/// Assembles the final order price.
///
/// `ticket` must already be validated; passing an invalid ticket here is a
/// caller bug (the engine never silently drops a discount - invalid tickets
/// reject the whole submission upstream).
///
/// ## Example
/// ```rust
/// use qbu_core::assembler::{assemble_order_price, ShippingQuote};
/// use qbu_core::pricing::{quote_volume, PricingParams};
/// use qbu_core::size_tier::{resolve_size_tier, SizeMm};
/// use qbu_core::zone::Zone;
///
/// let quote = quote_volume(10.0, &PricingParams::fallback());
/// let shipping = ShippingQuote {
///     config_id: None,
///     zone: Some(Zone::Kanto),
///     tier: resolve_size_tier(SizeMm { x: 100.0, y: 100.0, z: 100.0 }, 20.0),
///     yen: 700,
/// };
///
/// let price = assemble_order_price(&quote, &shipping, None);
/// assert_eq!(price.total_yen, 2100);
/// ```
pub fn assemble_order_price(
    quote: &Quote,
    shipping: &ShippingQuote,
    ticket: Option<&Ticket>,
) -> OrderPrice {
    let item_subtotal = Yen::from_yen(quote.subtotal_yen).clamp_non_negative();
    let shipping_yen = Yen::from_yen(shipping.yen).clamp_non_negative();
    let total_before_discount = item_subtotal + shipping_yen;

    let (total, discount, pre_discount) = match ticket {
        None => (total_before_discount, Yen::zero(), None),
        Some(ticket) => {
            let mut raw_discount =
                Yen::from_yen(ticket.discount_yen(item_subtotal.yen(), shipping_yen.yen()));
            if ticket.zeroes_shipping() {
                raw_discount += shipping_yen;
            }
            // a free-total ticket that also zeroes shipping would otherwise
            // double-count the shipping leg
            let raw_discount = raw_discount.min(total_before_discount);

            let raw_final = (total_before_discount - raw_discount).clamp_non_negative();
            let total = raw_final.round_to_step(quote.rounding_step_yen);

            // Recomputed after rounding: the persisted discount must
            // reconcile exactly with subtotal + shipping − discount == total
            let discount = total_before_discount - total;

            (total, discount, Some(total_before_discount.yen()))
        }
    };

    let breakdown = QuoteBreakdown {
        base_fee_yen: quote.base_fee_yen,
        volume_fee_yen: quote.volume_fee_yen,
        rounding_step_yen: quote.rounding_step_yen,
        item_subtotal_yen: item_subtotal.yen(),
        shipping: ShippingBreakdown {
            config_id: shipping.config_id.clone(),
            zone: shipping.zone,
            size_tier: shipping.tier.size_tier,
            yen: shipping_yen.yen(),
            sum_cm: shipping.tier.sum_cm,
            capped_tier: shipping.tier.capped,
        },
        total_before_discount_yen: total_before_discount.yen(),
        total_yen: total.yen(),
        pre_discount_yen: pre_discount,
        discount_yen: ticket.map(|_| discount.yen()),
        ticket: ticket.map(|t| TicketSnapshot {
            id: t.id.clone(),
            kind: t.kind,
            value: t.value,
            apply_scope: t.apply_scope,
        }),
    };

    OrderPrice {
        item_subtotal_yen: item_subtotal.yen(),
        shipping_yen: shipping_yen.yen(),
        total_before_discount_yen: total_before_discount.yen(),
        discount_yen: discount.yen(),
        total_yen: total.yen(),
        breakdown,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{quote_volume, PricingParams};
    use crate::size_tier::{resolve_size_tier, SizeMm};
    use crate::ticket::TicketUsage;
    use chrono::Utc;

    fn quote_10cm3() -> Quote {
        quote_volume(10.0, &PricingParams::fallback())
    }

    fn kanto_shipping(yen: i64) -> ShippingQuote {
        ShippingQuote {
            config_id: Some("ship-1".to_string()),
            zone: Some(Zone::Kanto),
            tier: resolve_size_tier(
                SizeMm {
                    x: 100.0,
                    y: 100.0,
                    z: 100.0,
                },
                20.0,
            ),
            yen,
        }
    }

    fn ticket(kind: TicketKind, value: i64, apply_scope: ApplyScope) -> Ticket {
        Ticket {
            id: "tkt-1".to_string(),
            code_prefix: "QBU2".to_string(),
            kind,
            value,
            apply_scope,
            shipping_free: false,
            is_active: true,
            expires_at: None,
            max_total_uses: None,
            max_uses_per_user: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_ticket_total_is_plain_sum() {
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(700), None);
        assert_eq!(price.item_subtotal_yen, 1400);
        assert_eq!(price.shipping_yen, 700);
        assert_eq!(price.total_before_discount_yen, 2100);
        assert_eq!(price.discount_yen, 0);
        assert_eq!(price.total_yen, 2100);
        assert!(price.breakdown.ticket.is_none());
        assert!(price.breakdown.pre_discount_yen.is_none());
    }

    #[test]
    fn test_no_ticket_shipping_not_rerounded() {
        // shipping 703 leaves the sum off the 10-yen grid; without a ticket
        // it stays there
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(703), None);
        assert_eq!(price.total_yen, 2103);
    }

    #[test]
    fn test_percent_ticket_subtotal_scope() {
        // subtotal 1400, shipping 700, 20% on subtotal → 280 off
        let t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(700), Some(&t));

        assert_eq!(price.total_before_discount_yen, 2100);
        assert_eq!(price.total_yen, 1820);
        assert_eq!(price.discount_yen, 280);
        assert_eq!(price.breakdown.pre_discount_yen, Some(2100));
        assert_eq!(price.breakdown.discount_yen, Some(280));
        assert_eq!(price.breakdown.ticket.as_ref().unwrap().id, "tkt-1");
    }

    #[test]
    fn test_breakdown_reconciles_exactly() {
        let tickets = [
            ticket(TicketKind::Percent, 33, ApplyScope::Subtotal),
            ticket(TicketKind::Percent, 33, ApplyScope::Total),
            ticket(TicketKind::Fixed, 777, ApplyScope::Subtotal),
            ticket(TicketKind::Free, 0, ApplyScope::Subtotal),
            ticket(TicketKind::Free, 0, ApplyScope::Total),
            ticket(TicketKind::ShippingFree, 0, ApplyScope::Subtotal),
        ];
        for t in &tickets {
            for shipping_yen in [0, 640, 700, 703] {
                let price = assemble_order_price(
                    &quote_10cm3(),
                    &kanto_shipping(shipping_yen),
                    Some(t),
                );
                assert_eq!(
                    price.item_subtotal_yen + price.shipping_yen - price.discount_yen,
                    price.total_yen,
                    "{:?} shipping={}",
                    t.kind,
                    shipping_yen
                );
                assert!(price.total_yen >= 0);
            }
        }
    }

    #[test]
    fn test_shipping_free_zeroes_shipping_leg() {
        let t = ticket(TicketKind::ShippingFree, 0, ApplyScope::Subtotal);
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(700), Some(&t));

        // customer pays the item subtotal only
        assert_eq!(price.total_yen, 1400);
        assert_eq!(price.discount_yen, 700);
        // the shipping leg itself is still recorded at its real rate
        assert_eq!(price.breakdown.shipping.yen, 700);
    }

    #[test]
    fn test_shipping_free_flag_composes_with_percent() {
        let mut t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        t.shipping_free = true;
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(700), Some(&t));

        // 280 off the subtotal, plus the 700 shipping leg
        assert_eq!(price.total_yen, 1120);
        assert_eq!(price.discount_yen, 980);
    }

    #[test]
    fn test_free_total_with_shipping_free_does_not_double_count() {
        let mut t = ticket(TicketKind::Free, 0, ApplyScope::Total);
        t.shipping_free = true;
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(700), Some(&t));

        assert_eq!(price.total_yen, 0);
        assert_eq!(price.discount_yen, 2100);
    }

    #[test]
    fn test_final_total_rounded_to_step() {
        // 15% of 1400 = 210 → raw_final 1890... pick one that lands off-grid:
        // fixed 123 → raw_final 2100−123 = 1977 → rounds to 1980
        let t = ticket(TicketKind::Fixed, 123, ApplyScope::Subtotal);
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(700), Some(&t));

        assert_eq!(price.total_yen, 1980);
        // discount recomputed against the rounded total
        assert_eq!(price.discount_yen, 120);
    }

    #[test]
    fn test_validated_expired_ticket_is_callers_bug_not_ours() {
        // the assembler trusts the caller: validation happens upstream
        let t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        assert!(t.validate(&TicketUsage::default(), Utc::now()).is_ok());
    }

    #[test]
    fn test_unresolved_zone_ships_for_zero() {
        let shipping = ShippingQuote {
            config_id: None,
            zone: None,
            tier: resolve_size_tier(
                SizeMm {
                    x: 100.0,
                    y: 100.0,
                    z: 100.0,
                },
                20.0,
            ),
            yen: 0,
        };
        let price = assemble_order_price(&quote_10cm3(), &shipping, None);
        assert_eq!(price.total_yen, 1400);
        assert_eq!(price.breakdown.shipping.zone, None);
    }

    #[test]
    fn test_breakdown_serializes_camel_case() {
        let price = assemble_order_price(&quote_10cm3(), &kanto_shipping(700), None);
        let json = serde_json::to_value(&price.breakdown).unwrap();

        assert_eq!(json["itemSubtotalYen"], 1400);
        assert_eq!(json["shipping"]["sizeTier"], "60");
        assert_eq!(json["shipping"]["zone"], "kanto");
        assert_eq!(json["totalBeforeDiscountYen"], 2100);
        // ticket-less breakdowns omit the discount fields entirely
        assert!(json.get("discountYen").is_none());
        assert!(json.get("preDiscountYen").is_none());
    }
}
