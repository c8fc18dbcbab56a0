//! # Validation Module
//!
//! Submission input validation for the order boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field-level rules, before any pricing runs           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / UNIQUE / foreign key constraints                       │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{CustomerInfo, OrderDraft};
use crate::MAX_BLOCKS_PER_ORDER;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Draft Validation
// =============================================================================

/// Validates the draft's block lists before any geometry work.
///
/// ## Rules
/// - At least one base block
/// - Base + support together within [`MAX_BLOCKS_PER_ORDER`]
pub fn validate_draft(draft: &OrderDraft) -> ValidationResult<()> {
    if draft.blocks.is_empty() {
        return Err(ValidationError::NoBlocks);
    }

    if draft.blocks.len() + draft.support_blocks.len() > MAX_BLOCKS_PER_ORDER {
        return Err(ValidationError::TooMany {
            field: "blocks".to_string(),
            max: MAX_BLOCKS_PER_ORDER,
        });
    }

    Ok(())
}

// =============================================================================
// Customer Validation
// =============================================================================

/// Validates the checkout customer fields.
///
/// ## Rules
/// - Name and email are required; email must look like an address
/// - A destination is required: either the free-text address line or the
///   structured prefecture + city + town triple
/// - The postal code, when present, must be a 7-digit Japanese code
///   (hyphen optional)
pub fn validate_customer(customer: &CustomerInfo) -> ValidationResult<()> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    let email = customer.email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "not an email address".to_string(),
        });
    }

    let has_free_text = customer
        .address
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty());
    let has_structured = [&customer.prefecture, &customer.city, &customer.town]
        .iter()
        .all(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()));

    if !has_free_text && !has_structured {
        return Err(ValidationError::IncompleteAddress {
            reason: "either address or prefecture/city/town is required".to_string(),
        });
    }

    if let Some(postal) = customer.postal_code.as_deref() {
        validate_postal_code(postal)?;
    }

    Ok(())
}

/// Validates a Japanese postal code: `NNN-NNNN` or `NNNNNNN`.
pub fn validate_postal_code(postal_code: &str) -> ValidationResult<()> {
    let code = postal_code.trim();
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();

    let shape_ok = match code.len() {
        7 => code.chars().all(|c| c.is_ascii_digit()),
        8 => code.as_bytes()[3] == b'-' && digits.len() == 7,
        _ => false,
    };

    if !shape_ok {
        return Err(ValidationError::InvalidFormat {
            field: "postalCode".to_string(),
            reason: "expected NNN-NNNN or NNNNNNN".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScaleMode, ScaleSetting};

    fn draft(blocks: usize, support: usize) -> OrderDraft {
        OrderDraft {
            blocks: (0..blocks).map(|i| format!("{},0,0", i)).collect(),
            support_blocks: (0..support).map(|i| format!("{},1,0", i)).collect(),
            scale_setting: ScaleSetting {
                mode: ScaleMode::BlockEdge,
                max_side_mm: None,
                block_edge_mm: Some(10.0),
            },
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "山田太郎".to_string(),
            email: "taro@example.com".to_string(),
            address: None,
            prefecture: Some("神奈川県".to_string()),
            city: Some("横浜市西区".to_string()),
            town: Some("みなとみらい".to_string()),
            address_line2: None,
            postal_code: Some("220-0012".to_string()),
            ticket_code: None,
            anon_id: None,
        }
    }

    #[test]
    fn test_validate_draft() {
        assert!(validate_draft(&draft(10, 5)).is_ok());
        assert!(matches!(
            validate_draft(&draft(0, 5)),
            Err(ValidationError::NoBlocks)
        ));
        assert!(matches!(
            validate_draft(&draft(MAX_BLOCKS_PER_ORDER, 1)),
            Err(ValidationError::TooMany { .. })
        ));
    }

    #[test]
    fn test_validate_customer_structured_address() {
        assert!(validate_customer(&customer()).is_ok());
    }

    #[test]
    fn test_validate_customer_free_text_address() {
        let mut c = customer();
        c.prefecture = None;
        c.city = None;
        c.town = None;
        c.address = Some("神奈川県横浜市西区みなとみらい1-2-3".to_string());
        assert!(validate_customer(&c).is_ok());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut c = customer();
        c.name = "  ".to_string();
        assert!(matches!(
            validate_customer(&c),
            Err(ValidationError::Required { .. })
        ));

        let mut c = customer();
        c.email = String::new();
        assert!(matches!(
            validate_customer(&c),
            Err(ValidationError::Required { .. })
        ));

        let mut c = customer();
        c.town = None;
        assert!(matches!(
            validate_customer(&c),
            Err(ValidationError::IncompleteAddress { .. })
        ));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut c = customer();
        c.email = "not-an-email".to_string();
        assert!(matches!(
            validate_customer(&c),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_postal_code_shapes() {
        assert!(validate_postal_code("220-0012").is_ok());
        assert!(validate_postal_code("2200012").is_ok());
        assert!(validate_postal_code(" 220-0012 ").is_ok());

        assert!(validate_postal_code("220-001").is_err());
        assert!(validate_postal_code("22-00123").is_err());
        assert!(validate_postal_code("abc-defg").is_err());
        assert!(validate_postal_code("").is_err());
    }

    #[test]
    fn test_postal_code_optional() {
        let mut c = customer();
        c.postal_code = None;
        assert!(validate_customer(&c).is_ok());

        c.postal_code = Some("bogus".to_string());
        assert!(validate_customer(&c).is_err());
    }
}
