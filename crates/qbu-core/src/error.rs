//! # Error Types
//!
//! Domain-specific error types for qbu-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  qbu-core errors (this file)                                           │
//! │  ├── CoreError        - Pipeline-level failures (model, ticket)        │
//! │  ├── ValidationError  - Submission input failures                      │
//! │  └── TicketRejection  - Ticket validation outcomes (ticket module)     │
//! │                                                                         │
//! │  qbu-db errors (separate crate)                                        │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in apps/api)                                              │
//! │  └── ApiError         - What the storefront sees (status + code)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, limit, etc.)
//! 3. Errors are enum variants, never String
//! 4. Nothing numeric errors: out-of-range numbers clamp instead

use thiserror::Error;

use crate::ticket::TicketRejection;

// =============================================================================
// Core Error
// =============================================================================

/// Pipeline-level errors.
///
/// These are the failures that reject an order submission before anything
/// is persisted. Pricing math itself never fails - inputs are clamped.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The submitted model is not print-ready.
    ///
    /// ## When This Occurs
    /// - The voxel model is not a single connected component
    ///   (floating blocks would detach during printing)
    #[error("model is not print-ready: not a single connected component")]
    ModelNotReady,

    /// Ticket validation failed (wraps TicketRejection).
    ///
    /// The order is rejected rather than silently dropping the discount;
    /// the customer must be told, not overcharged.
    #[error("invalid ticket: {0}")]
    Ticket(#[from] TicketRejection),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Submission input validation errors.
///
/// These occur when the order payload doesn't meet requirements.
/// Used for early validation before any pricing computation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The draft contains no printable blocks.
    #[error("the model contains no blocks")]
    NoBlocks,

    /// Too many entries in a collection field.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Invalid format (e.g. malformed block key, bad postal code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The customer address is incomplete.
    #[error("customer address is incomplete: {reason}")]
    IncompleteAddress { reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::InvalidFormat {
            field: "postalCode".to_string(),
            reason: "expected 7 digits".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "postalCode has invalid format: expected 7 digits"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NoBlocks;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
