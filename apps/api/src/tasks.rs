//! # Best-Effort Side Effects
//!
//! Everything that happens *after* an order is committed: the redemption
//! record, the audit trail, and the invoice email. Each runs as its own
//! spawned task with its own failure handling.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The order row is already committed when these fire.                    │
//! │                                                                         │
//! │  order_insert ──committed──► spawn: redemption record                   │
//! │                              spawn: audit log entry                     │
//! │                              spawn: invoice email                       │
//! │                                                                         │
//! │  A failure here is logged and swallowed. Losing a notification is      │
//! │  recoverable; losing an accepted order is not. None of these may       │
//! │  invalidate the committed order.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{error, info};

use crate::state::AppState;
use qbu_core::{Order, Ticket, TicketRedemption};
use qbu_db::generate_redemption_id;

/// Dispatches all post-commit side effects for an accepted order.
///
/// Returns immediately; the tasks run to completion in the background.
pub fn dispatch_order_side_effects(
    state: AppState,
    order: Order,
    ticket: Option<Ticket>,
    redeemer_id: String,
) {
    // Redemption record: the usage ledger entry this redemption counts as.
    // Appended post-commit, so limit enforcement stays eventually-consistent.
    if let Some(ticket) = &ticket {
        let state = state.clone();
        let redemption = TicketRedemption {
            id: generate_redemption_id(),
            ticket_id: ticket.id.clone(),
            order_id: order.id.clone(),
            redeemer_id,
            discount_yen: order.discount_yen,
            snapshot: serde_json::to_value(ticket).unwrap_or(serde_json::Value::Null),
            created_at: Utc::now(),
        };
        tokio::spawn(async move {
            if let Err(e) = state.db.tickets().record_redemption(&redemption).await {
                error!(
                    error = %e,
                    order_id = %redemption.order_id,
                    ticket_id = %redemption.ticket_id,
                    "Failed to record ticket redemption"
                );
            }
        });
    }

    // Audit trail entry with the frozen breakdown.
    {
        let state = state.clone();
        let order = order.clone();
        tokio::spawn(async move {
            let detail = serde_json::json!({
                "orderId": order.id,
                "totalYen": order.total_yen,
                "breakdown": order.breakdown,
            });
            if let Err(e) = state.db.audit_logs().append("order_accepted", &detail).await {
                error!(error = %e, order_id = %order.id, "Failed to write audit log");
            }
        });
    }

    // Invoice email. Delivery is an external collaborator; this renders
    // the invoice and hands it to the dispatcher.
    tokio::spawn(async move {
        let invoice = render_invoice_text(&order);
        // Dispatcher stub: log the handoff. A delivery failure would land
        // here and stay here.
        info!(
            to = %order.customer_email,
            from = %state.config.invoice_from,
            order_id = %order.id,
            bytes = invoice.len(),
            "Invoice email dispatched"
        );
    });
}

/// Renders the plain-text invoice from an order's frozen breakdown.
///
/// The email must show exactly the numbers that were persisted; it is
/// rendered from the breakdown, never recomputed.
pub fn render_invoice_text(order: &Order) -> String {
    let b = &order.breakdown;
    let mut lines = vec![
        "Q-BU! ご注文ありがとうございます".to_string(),
        String::new(),
        format!("ご注文番号: {}", order.id),
        format!("{} 様", order.customer_name),
        String::new(),
        format!("商品小計: ¥{}", b.item_subtotal_yen),
        format!(
            "  (基本料金 ¥{} + 造形料金 ¥{})",
            b.base_fee_yen, b.volume_fee_yen
        ),
        format!(
            "送料: ¥{} ({}サイズ{})",
            b.shipping.yen,
            b.shipping.size_tier,
            b.shipping
                .zone
                .map(|z| format!(" / {}", z))
                .unwrap_or_default()
        ),
    ];

    if let Some(discount) = b.discount_yen {
        lines.push(format!("割引: -¥{}", discount));
    }

    lines.push(String::new());
    lines.push(format!("合計: ¥{}", order.total_yen));
    lines.join("\n")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qbu_core::assembler::{assemble_order_price, ShippingQuote};
    use qbu_core::pricing::{quote_volume, PricingParams};
    use qbu_core::size_tier::{resolve_size_tier, SizeMm};
    use qbu_core::zone::Zone;

    fn order() -> Order {
        let quote = quote_volume(10.0, &PricingParams::fallback());
        let shipping = ShippingQuote {
            config_id: None,
            zone: Some(Zone::Kanto),
            tier: resolve_size_tier(
                SizeMm {
                    x: 100.0,
                    y: 100.0,
                    z: 100.0,
                },
                20.0,
            ),
            yen: 700,
        };
        let price = assemble_order_price(&quote, &shipping, None);
        Order {
            id: "ord-1".to_string(),
            item_subtotal_yen: price.item_subtotal_yen,
            shipping_yen: price.shipping_yen,
            discount_yen: price.discount_yen,
            total_yen: price.total_yen,
            ticket_id: None,
            breakdown: price.breakdown,
            customer_name: "山田太郎".to_string(),
            customer_email: "taro@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_invoice_shows_persisted_numbers() {
        let invoice = render_invoice_text(&order());
        assert!(invoice.contains("¥1400"));
        assert!(invoice.contains("¥700"));
        assert!(invoice.contains("合計: ¥2100"));
        assert!(invoice.contains("ord-1"));
        // no discount line without a ticket
        assert!(!invoice.contains("割引"));
    }
}
