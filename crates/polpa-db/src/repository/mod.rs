//! # Repository Module
//!
//! Database repository implementations for Polpa POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store-Scoped Repositories                            │
//! │                                                                         │
//! │  Each repository is constructed with the pool AND a store id, and       │
//! │  bakes the store into every query it runs.                              │
//! │                                                                         │
//! │  Terminal / embedding UI                                                │
//! │       │                                                                 │
//! │       │  db.products("loja1").search("açaí")                            │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository { pool, store_id: "loja1" }                          │
//! │  ├── search(&self, query)        WHERE store_id = 'loja1' AND ...       │
//! │  ├── get_by_id(&self, id)                                               │
//! │  ├── insert(&self, new_product)                                         │
//! │  └── update(&self, product)                                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD and search
//! - [`register::RegisterRepository`] - Register sessions, movements, reports
//! - [`sale::SaleRepository`] - Sale persistence and receipt history

pub mod product;
pub mod register;
pub mod sale;

use rust_decimal::Decimal;

use crate::error::{DbError, DbResult};

/// Parses a money/weight TEXT column into a Decimal.
///
/// SQLite has no decimal affinity, so exact amounts are stored as decimal
/// strings. A value that no longer parses means the row was written by
/// something other than this crate; surface it instead of guessing.
pub(crate) fn parse_decimal(text: &str, column: &str) -> DbResult<Decimal> {
    text.parse::<Decimal>().map_err(|e| {
        DbError::Internal(format!("column {column} holds non-decimal text {text:?}: {e}"))
    })
}

/// Parses a nullable money/weight TEXT column.
pub(crate) fn parse_decimal_opt(text: Option<&str>, column: &str) -> DbResult<Option<Decimal>> {
    text.map(|t| parse_decimal(t, column)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("12.90", "unit_price").unwrap(), dec!(12.90));
        assert_eq!(
            parse_decimal("0.04499", "price_per_gram").unwrap(),
            dec!(0.04499)
        );

        let err = parse_decimal("not-a-number", "unit_price").unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
        assert!(err.to_string().contains("unit_price"));
    }

    #[test]
    fn test_parse_decimal_opt() {
        assert_eq!(parse_decimal_opt(None, "weight_kg").unwrap(), None);
        assert_eq!(
            parse_decimal_opt(Some("0.300"), "weight_kg").unwrap(),
            Some(dec!(0.300))
        );
    }
}
