//! # Ticket Discount Engine
//!
//! Validates redeemable discount tickets and computes discount amounts.
//!
//! ## Validation State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ticket Validation (per attempt)                      │
//! │                                                                         │
//! │  lookup by hashed code ──miss──► NotFound                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  is_active? ──false──► Inactive                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  expires_at > now? ──no──► Expired     (expires_at ≤ now is expired)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total redemptions < max_total_uses? ──no──► TotalLimitReached          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  redemptions by this identity < max_uses_per_user? ──no──►              │
//! │       │                                          PerUserLimitReached    │
//! │       ▼                                                                 │
//! │  VALID                                                                  │
//! │                                                                         │
//! │  Short-circuits at the first failure; each failure carries its own      │
//! │  customer-facing message. Evaluated FRESH on every attempt - there is   │
//! │  no cached validity.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage Counting
//! Usage comes from counting append-only redemption rows, never from a
//! mutable counter. Counting at validation time is eventually-consistent
//! under concurrent redemption (no distributed lock); a small amount of
//! over-redemption is an accepted tradeoff. A failed count query is treated
//! conservatively as invalid, not silently allowed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

use crate::money::Yen;

/// The largest fixed-amount discount a ticket can carry, in yen.
pub const MAX_FIXED_DISCOUNT_YEN: i64 = 1_000_000;

/// Length of the non-secret code prefix kept for display.
const CODE_PREFIX_LEN: usize = 4;

// =============================================================================
// Ticket Kind and Scope
// =============================================================================

/// What a ticket takes off the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// `value`% off the scope amount (value clamped into 0..=100).
    Percent,
    /// A fixed yen amount off, capped at the scope amount.
    Fixed,
    /// The entire scope amount.
    Free,
    /// Shipping costs nothing; the item price is untouched.
    ShippingFree,
}

impl TicketKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketKind::Percent => "percent",
            TicketKind::Fixed => "fixed",
            TicketKind::Free => "free",
            TicketKind::ShippingFree => "shipping_free",
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" => Ok(TicketKind::Percent),
            "fixed" => Ok(TicketKind::Fixed),
            "free" => Ok(TicketKind::Free),
            "shipping_free" => Ok(TicketKind::ShippingFree),
            _ => Err(()),
        }
    }
}

/// Which amount a discount is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApplyScope {
    /// Item subtotal only.
    Subtotal,
    /// Item subtotal plus shipping.
    Total,
}

impl ApplyScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ApplyScope::Subtotal => "subtotal",
            ApplyScope::Total => "total",
        }
    }
}

impl fmt::Display for ApplyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplyScope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtotal" => Ok(ApplyScope::Subtotal),
            "total" => Ok(ApplyScope::Total),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// A redeemable discount ticket.
///
/// The raw code is never stored or exposed after creation; only the salted
/// hash (for lookup) and a short display prefix survive.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    /// Non-secret prefix of the original code, for admin display.
    pub code_prefix: String,
    pub kind: TicketKind,
    /// Meaning depends on `kind`: 0-100 for percent, yen for fixed,
    /// unused otherwise.
    pub value: i64,
    pub apply_scope: ApplyScope,
    /// Zeroes shipping in addition to whatever `kind` takes off.
    pub shipping_free: bool,
    pub is_active: bool,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Aggregate redemption cap; `None` = unlimited.
    pub max_total_uses: Option<i64>,
    /// Per-identity redemption cap; `None` = unlimited.
    pub max_uses_per_user: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fresh usage counts for one validation attempt, scoped to the redeeming
/// identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketUsage {
    /// Redemption rows for this ticket, all identities.
    pub total: i64,
    /// Redemption rows for this ticket by the current identity.
    pub by_redeemer: i64,
}

// =============================================================================
// Rejection
// =============================================================================

/// Why a ticket cannot be redeemed. Messages are customer-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TicketRejection {
    #[error("この割引コードは見つかりませんでした")]
    NotFound,

    #[error("この割引コードは現在利用できません")]
    Inactive,

    #[error("この割引コードは有効期限が切れています")]
    Expired,

    #[error("この割引コードは利用回数の上限に達しています")]
    TotalLimitReached,

    #[error("この割引コードはすでにご利用済みです")]
    PerUserLimitReached,

    /// The usage-count query failed. Conservatively invalid: guessing at
    /// limits risks over-redemption the shop pays for.
    #[error("割引コードの確認に失敗しました。時間をおいてお試しください")]
    UsageUnavailable,
}

// =============================================================================
// Validation and Discount
// =============================================================================

impl Ticket {
    /// Validates this ticket for one redemption attempt.
    ///
    /// Transition order is fixed and short-circuits at the first failure:
    /// active → expiry → total limit → per-identity limit. `NotFound` and
    /// `UsageUnavailable` belong to the caller, which owns the lookup and
    /// the count queries.
    pub fn validate(&self, usage: &TicketUsage, now: DateTime<Utc>) -> Result<(), TicketRejection> {
        if !self.is_active {
            return Err(TicketRejection::Inactive);
        }

        if let Some(expires_at) = self.expires_at {
            // strict: a ticket expiring exactly now is already expired
            if expires_at <= now {
                return Err(TicketRejection::Expired);
            }
        }

        if let Some(max_total) = self.max_total_uses {
            if usage.total >= max_total {
                return Err(TicketRejection::TotalLimitReached);
            }
        }

        if let Some(max_per_user) = self.max_uses_per_user {
            if usage.by_redeemer >= max_per_user {
                return Err(TicketRejection::PerUserLimitReached);
            }
        }

        Ok(())
    }

    /// Whether shipping is zeroed when this ticket applies.
    #[inline]
    pub fn zeroes_shipping(&self) -> bool {
        self.shipping_free || matches!(self.kind, TicketKind::ShippingFree)
    }

    /// The amount this ticket's `kind` takes off the item price, in yen.
    ///
    /// ## Contract
    /// - `free` → the full scope amount
    /// - `shipping_free` → 0 here; shipping is zeroed separately by the
    ///   assembler
    /// - `percent` → `floor(scope × clamp(value, 0, 100) / 100)`
    /// - `fixed` → `min(scope, clamp(value, 0, 1_000_000))`
    /// - Never exceeds the scope amount; never negative
    pub fn discount_yen(&self, subtotal_yen: i64, shipping_yen: i64) -> i64 {
        let subtotal = Yen::from_yen(subtotal_yen).clamp_non_negative();
        let shipping = Yen::from_yen(shipping_yen).clamp_non_negative();
        let scope = match self.apply_scope {
            ApplyScope::Subtotal => subtotal,
            ApplyScope::Total => subtotal + shipping,
        };

        let discount = match self.kind {
            TicketKind::Free => scope,
            TicketKind::ShippingFree => Yen::zero(),
            TicketKind::Percent => scope.percent(self.value),
            TicketKind::Fixed => {
                Yen::from_yen(self.value.clamp(0, MAX_FIXED_DISCOUNT_YEN)).min(scope)
            }
        };

        discount.clamp_non_negative().yen()
    }
}

// =============================================================================
// Code Hashing
// =============================================================================

/// The salted lookup hash of a ticket code (SHA-256, hex).
///
/// Codes are normalized (trimmed) before hashing so the same code typed
/// with stray whitespace still resolves. The salt is shop-wide
/// configuration, not per-ticket; the hash only needs to be a stable
/// lookup key that keeps raw codes out of the database.
pub fn hash_ticket_code(code: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(code.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// The non-secret display prefix of a ticket code.
pub fn code_prefix(code: &str) -> String {
    code.trim().chars().take(CODE_PREFIX_LEN).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

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
    fn test_valid_ticket_passes() {
        let t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        assert!(t.validate(&TicketUsage::default(), Utc::now()).is_ok());
    }

    #[test]
    fn test_inactive_rejected() {
        let mut t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        t.is_active = false;
        assert_eq!(
            t.validate(&TicketUsage::default(), Utc::now()),
            Err(TicketRejection::Inactive)
        );
    }

    #[test]
    fn test_expired_rejected_strictly() {
        let now = Utc::now();
        let mut t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);

        t.expires_at = Some(now - Duration::hours(1));
        assert_eq!(
            t.validate(&TicketUsage::default(), now),
            Err(TicketRejection::Expired)
        );

        // expiring exactly now is already expired
        t.expires_at = Some(now);
        assert_eq!(
            t.validate(&TicketUsage::default(), now),
            Err(TicketRejection::Expired)
        );

        t.expires_at = Some(now + Duration::seconds(1));
        assert!(t.validate(&TicketUsage::default(), now).is_ok());
    }

    #[test]
    fn test_total_limit() {
        let mut t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        t.max_total_uses = Some(3);

        let under = TicketUsage {
            total: 2,
            by_redeemer: 0,
        };
        assert!(t.validate(&under, Utc::now()).is_ok());

        let at = TicketUsage {
            total: 3,
            by_redeemer: 0,
        };
        assert_eq!(
            t.validate(&at, Utc::now()),
            Err(TicketRejection::TotalLimitReached)
        );
    }

    #[test]
    fn test_per_user_limit() {
        let mut t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        t.max_uses_per_user = Some(1);

        let used = TicketUsage {
            total: 5,
            by_redeemer: 1,
        };
        assert_eq!(
            t.validate(&used, Utc::now()),
            Err(TicketRejection::PerUserLimitReached)
        );
    }

    #[test]
    fn test_check_order_inactive_wins_over_expired() {
        let now = Utc::now();
        let mut t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        t.is_active = false;
        t.expires_at = Some(now - Duration::hours(1));
        assert_eq!(
            t.validate(&TicketUsage::default(), now),
            Err(TicketRejection::Inactive)
        );
    }

    #[test]
    fn test_percent_discount_subtotal_scope() {
        let t = ticket(TicketKind::Percent, 20, ApplyScope::Subtotal);
        // floor(1400 × 0.20) = 280; shipping untouched
        assert_eq!(t.discount_yen(1400, 700), 280);
    }

    #[test]
    fn test_percent_discount_total_scope() {
        let t = ticket(TicketKind::Percent, 20, ApplyScope::Total);
        // floor(2100 × 0.20) = 420
        assert_eq!(t.discount_yen(1400, 700), 420);
    }

    #[test]
    fn test_percent_value_clamped() {
        let t = ticket(TicketKind::Percent, 150, ApplyScope::Subtotal);
        assert_eq!(t.discount_yen(1400, 700), 1400);

        let t = ticket(TicketKind::Percent, -10, ApplyScope::Subtotal);
        assert_eq!(t.discount_yen(1400, 700), 0);
    }

    #[test]
    fn test_fixed_discount_capped_at_scope() {
        let t = ticket(TicketKind::Fixed, 500, ApplyScope::Subtotal);
        assert_eq!(t.discount_yen(1400, 700), 500);

        let t = ticket(TicketKind::Fixed, 99_999, ApplyScope::Subtotal);
        assert_eq!(t.discount_yen(1400, 700), 1400);
    }

    #[test]
    fn test_fixed_value_clamped() {
        let t = ticket(TicketKind::Fixed, 2_000_000, ApplyScope::Total);
        // clamps to 1,000,000 then to the scope amount
        assert_eq!(t.discount_yen(1400, 700), 2100);

        let t = ticket(TicketKind::Fixed, -500, ApplyScope::Subtotal);
        assert_eq!(t.discount_yen(1400, 700), 0);
    }

    #[test]
    fn test_free_discount() {
        let t = ticket(TicketKind::Free, 0, ApplyScope::Subtotal);
        assert_eq!(t.discount_yen(1400, 700), 1400);

        let t = ticket(TicketKind::Free, 0, ApplyScope::Total);
        assert_eq!(t.discount_yen(1400, 700), 2100);
    }

    #[test]
    fn test_shipping_free_discounts_nothing_itself() {
        let t = ticket(TicketKind::ShippingFree, 0, ApplyScope::Subtotal);
        assert_eq!(t.discount_yen(1400, 700), 0);
        assert!(t.zeroes_shipping());
    }

    #[test]
    fn test_shipping_free_flag_composes() {
        let mut t = ticket(TicketKind::Percent, 10, ApplyScope::Subtotal);
        assert!(!t.zeroes_shipping());
        t.shipping_free = true;
        assert!(t.zeroes_shipping());
    }

    #[test]
    fn test_discount_never_exceeds_scope() {
        for kind in [TicketKind::Percent, TicketKind::Fixed, TicketKind::Free] {
            for value in [0, 50, 100, 5000, MAX_FIXED_DISCOUNT_YEN] {
                for scope in [ApplyScope::Subtotal, ApplyScope::Total] {
                    let t = ticket(kind, value, scope);
                    let d = t.discount_yen(1400, 700);
                    let scope_amount = match scope {
                        ApplyScope::Subtotal => 1400,
                        ApplyScope::Total => 2100,
                    };
                    assert!(d <= scope_amount, "{:?} {} {:?}", kind, value, scope);
                    assert!(d >= 0);
                }
            }
        }
    }

    #[test]
    fn test_hash_is_stable_and_salted() {
        let a = hash_ticket_code("QBU2026", "salt-a");
        let b = hash_ticket_code("QBU2026", "salt-a");
        let c = hash_ticket_code("QBU2026", "salt-b");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_normalizes_whitespace() {
        assert_eq!(
            hash_ticket_code(" QBU2026 ", "s"),
            hash_ticket_code("QBU2026", "s")
        );
    }

    #[test]
    fn test_code_prefix() {
        assert_eq!(code_prefix("QBU2026-LAUNCH"), "QBU2");
        assert_eq!(code_prefix("AB"), "AB");
    }
}
