//! # Terminal Error Type
//!
//! Unified, serializable error type for the terminal session API.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Polpa POS                              │
//! │                                                                         │
//! │  Embedding UI                 Terminal Session                          │
//! │  ────────────                 ────────────────                          │
//! │                                                                         │
//! │  terminal.finalize_sale()                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Session Method                                                  │  │
//! │  │  Result<T, TerminalError>                                        │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Cart rejected? ──── CoreError::QuantityTooLarge ───┐            │  │
//! │  │         │                                           │            │  │
//! │  │         ▼                                           ▼            │  │
//! │  │  Finalize rejected? ─ CheckoutError::EmptyCart ── TerminalError ►│  │
//! │  │         │                                           ▲            │  │
//! │  │         ▼                                           │            │  │
//! │  │  Store fault? ─────── ProviderError::Storage ───────┘            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  { "code": "REGISTER_CLOSED",                                           │
//! │    "message": "No open cash register session" }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors serialize with a machine-readable `code` and a human-readable
//! `message`, so an embedding UI can branch on the code and display the
//! message as-is.

use serde::Serialize;

use polpa_core::{CheckoutError, CoreError, ProviderError, ValidationError};
use polpa_db::DbError;

/// Error returned from terminal session methods.
///
/// ## Serialization
/// This is what the embedding UI receives when a call fails:
/// ```json
/// {
///   "code": "INSUFFICIENT_CHANGE",
///   "message": "Change for 30.00 is less than total 35.37"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for terminal responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (product, cart line, register)
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Product data cannot be priced (inactive, missing price field)
    InvalidProduct,

    /// Cart cap exceeded (line count or per-line quantity)
    CartError,

    /// Finalize called with no line items
    EmptyCart,

    /// No open cash-register session
    RegisterClosed,

    /// Cash tendered below the sale total
    InsufficientChange,

    /// A finalize attempt is already in flight on this terminal
    AlreadyProcessing,

    /// The sale store (or a provider consulted during finalize) faulted;
    /// the cart was preserved for retry
    PersistenceFailure,

    /// State conflict (register already open, already closed)
    Conflict,

    /// Database/provider operation failed outside of finalize
    DatabaseError,

    /// Internal error
    Internal,
}

impl TerminalError {
    /// Creates a new terminal error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        TerminalError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        TerminalError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        TerminalError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TerminalError::new(ErrorCode::Internal, message)
    }
}

/// Converts field-validation errors (query too long, negative amount).
impl From<ValidationError> for TerminalError {
    fn from(err: ValidationError) -> Self {
        TerminalError::validation(err.to_string())
    }
}

/// Converts cart/pricing errors.
impl From<CoreError> for TerminalError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidProduct { .. } => ErrorCode::InvalidProduct,
            CoreError::CartTooLarge { .. } | CoreError::QuantityTooLarge { .. } => {
                ErrorCode::CartError
            }
            CoreError::LineNotFound { .. } => ErrorCode::NotFound,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        TerminalError::new(code, err.to_string())
    }
}

/// Converts finalize errors. `Persistence` means the cart survived the
/// failure; the code tells the UI a retry is worth offering.
impl From<CheckoutError> for TerminalError {
    fn from(err: CheckoutError) -> Self {
        let code = match &err {
            CheckoutError::EmptyCart => ErrorCode::EmptyCart,
            CheckoutError::RegisterClosed => ErrorCode::RegisterClosed,
            CheckoutError::InsufficientChangeAmount { .. } => ErrorCode::InsufficientChange,
            CheckoutError::AlreadyProcessing => ErrorCode::AlreadyProcessing,
            CheckoutError::Persistence(inner) => {
                tracing::error!("Sale submission failed: {}", inner);
                ErrorCode::PersistenceFailure
            }
        };
        TerminalError::new(code, err.to_string())
    }
}

/// Converts provider errors reaching the terminal outside of finalize
/// (catalog listing/search, register lookup).
impl From<ProviderError> for TerminalError {
    fn from(err: ProviderError) -> Self {
        tracing::error!("Provider error: {}", err);
        match err {
            ProviderError::Unavailable(_) => {
                TerminalError::new(ErrorCode::DatabaseError, "Storage unavailable")
            }
            ProviderError::Storage(_) => {
                TerminalError::new(ErrorCode::DatabaseError, "Storage operation failed")
            }
        }
    }
}

/// Converts database errors for embedders that wire repositories directly
/// (catalog management screens, register open/close, reports).
impl From<DbError> for TerminalError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TerminalError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => TerminalError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                TerminalError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::Conflict { reason } => TerminalError::new(ErrorCode::Conflict, reason),
            DbError::Validation(e) => TerminalError::validation(e.to_string()),
            DbError::ConnectionFailed(_) => {
                TerminalError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                TerminalError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                TerminalError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                TerminalError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for TerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for TerminalError {}

/// Convenience type alias for Results with TerminalError.
pub type TerminalResult<T> = Result<T, TerminalError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checkout_errors_map_to_codes() {
        let err: TerminalError = CheckoutError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::EmptyCart);

        let err: TerminalError = CheckoutError::RegisterClosed.into();
        assert_eq!(err.code, ErrorCode::RegisterClosed);
        assert_eq!(err.message, "No open cash register session");

        let err: TerminalError = CheckoutError::InsufficientChangeAmount {
            change_for: dec!(30.00),
            total: dec!(35.37),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientChange);

        let err: TerminalError =
            CheckoutError::Persistence(ProviderError::Storage("disk full".to_string())).into();
        assert_eq!(err.code, ErrorCode::PersistenceFailure);
    }

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: TerminalError = CoreError::CartTooLarge { max: 100 }.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: TerminalError = CoreError::LineNotFound {
            product_id: "p-1".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serialized_shape() {
        let err = TerminalError::new(ErrorCode::AlreadyProcessing, "A sale is already being processed");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ALREADY_PROCESSING");
        assert_eq!(json["message"], "A sale is already being processed");
    }
}
