//! # Error Types
//!
//! Domain-specific error types for polpa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  polpa-core errors (this file)                                         │
//! │  ├── CoreError        - Cart/pricing failures (add rejected)           │
//! │  ├── CheckoutError    - Finalize failures (sale rejected/failed)       │
//! │  ├── ProviderError    - What collaborator traits report                │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  polpa-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  polpa-terminal errors (session layer)                                 │
//! │  └── TerminalError    - What an embedding UI sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │        DbError → ProviderError → CheckoutError ─┴─► TerminalError      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, amounts, field names)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to an operator-facing message

use rust_decimal::Decimal;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and pricing errors.
///
/// These reject a single cart operation; the cart itself is left unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product data cannot be priced.
    ///
    /// ## When This Occurs
    /// - Product is inactive (soft deleted)
    /// - A unit-priced product has no unit price
    /// - A weighable product has no price per gram
    #[error("Invalid product {id}: {reason}")]
    InvalidProduct { id: String, reason: String },

    /// Cart has exceeded the maximum allowed line items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// No cart line matches the given product.
    ///
    /// ## When This Occurs
    /// - Quantity update or line-discount update for a product that was
    ///   never added (or was already removed)
    #[error("Product {product_id} not in cart")]
    LineNotFound { product_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Sale-finalization errors.
///
/// The first four reject the attempt before anything is submitted; the cart
/// stays untouched and the operator corrects and retries. `Persistence`
/// means the submission itself failed - the cart is deliberately preserved
/// so the operator can retry without re-entering the sale.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Finalize called on a cart with no line items.
    #[error("Cannot finalize an empty cart")]
    EmptyCart,

    /// No open cash-register session to attach the sale to.
    ///
    /// ## When This Occurs
    /// - No session was ever opened for this store
    /// - The most recent session has been closed
    #[error("No open cash register session")]
    RegisterClosed,

    /// Cash payment where the tendered amount is below the total.
    #[error("Change for {change_for} is less than total {total}")]
    InsufficientChangeAmount { change_for: Decimal, total: Decimal },

    /// A finalize attempt is already in flight for this terminal.
    #[error("A sale is already being processed")]
    AlreadyProcessing,

    /// The sale store (or register provider) reported a fault.
    #[error("Sale could not be persisted: {0}")]
    Persistence(#[from] ProviderError),
}

// =============================================================================
// Provider Error
// =============================================================================

/// Errors reported by collaborator implementations (catalog, register
/// provider, sale store). Implementations map their native errors into
/// these two shapes; the core only needs to know whether anything was
/// persisted (it never is - providers fail atomically).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The collaborator could not be reached at all.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The collaborator was reached but the operation failed.
    #[error("storage fault: {0}")]
    Storage(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (zero is fine).
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Field is not applicable in this context.
    #[error("{field} is not allowed: {reason}")]
    NotAllowed { field: String, reason: String },

    /// Invalid format (e.g., bad characters in a product code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidProduct {
            id: "acai-1kg".to_string(),
            reason: "product is inactive".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid product acai-1kg: product is inactive");

        let err = CheckoutError::InsufficientChangeAmount {
            change_for: dec!(30.00),
            total: dec!(35.37),
        };
        assert_eq!(err.to_string(), "Change for 30.00 is less than total 35.37");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::Negative {
            field: "line discount".to_string(),
        };
        assert_eq!(err.to_string(), "line discount must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "weight".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_provider_error_converts_to_checkout_error() {
        let provider_err = ProviderError::Storage("disk full".to_string());
        let checkout_err: CheckoutError = provider_err.into();
        assert!(matches!(checkout_err, CheckoutError::Persistence(_)));
    }
}
