//! # Validation Module
//!
//! Input validation utilities for Polpa POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal session                                             │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field-shape checks before any cart mutation          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart / checkout (polpa-core)                                 │
//! │  ├── Structural limits (line count, merged quantity ceiling)           │
//! │  └── Finalization rules (empty cart, register, change)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use polpa_core::validation::{validate_product_code, validate_quantity};
//!
//! // Validate a code before a catalog insert
//! validate_product_code("ACAI-500").unwrap();
//!
//! // Validate a quantity before a cart operation
//! validate_quantity(5).unwrap();
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::NewProduct;
use crate::MAX_LINE_WEIGHT_KG;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use polpa_core::validation::validate_product_code;
///
/// assert!(validate_product_code("ACAI-500").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    // Check for valid characters (alphanumeric, hyphen, underscore)
    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use polpa_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Açaí 500ml").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a catalog search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// The per-line ceiling is not checked here: merging a new quantity into an
/// existing line can push it over the cap even when both inputs pass, so the
/// cart enforces the ceiling on the merged value.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a scale reading in kilograms.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_WEIGHT_KG (50 kg)
///
/// ## Example
/// ```rust
/// use polpa_core::validation::validate_weight_kg;
/// use rust_decimal::Decimal;
///
/// assert!(validate_weight_kg("0.300".parse::<Decimal>().unwrap()).is_ok());
/// assert!(validate_weight_kg(Decimal::ZERO).is_err());
/// ```
pub fn validate_weight_kg(weight_kg: Decimal) -> ValidationResult<()> {
    if weight_kg <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "weight".to_string(),
        });
    }

    if weight_kg > Decimal::from(MAX_LINE_WEIGHT_KG) {
        return Err(ValidationError::OutOfRange {
            field: "weight".to_string(),
            min: 0,
            max: MAX_LINE_WEIGHT_KG,
        });
    }

    Ok(())
}

/// Validates a currency amount that may be zero.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, zero opening balances)
pub fn validate_non_negative(amount: Decimal, field: &str) -> ValidationResult<()> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a currency amount that must carry value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Used for tendered cash and register movements, where zero is meaningless
pub fn validate_positive_amount(amount: Decimal, field: &str) -> ValidationResult<()> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a product draft before it reaches the catalog store.
///
/// ## Rules
/// - Code and name pass their field validators
/// - The price field matching `is_weighable` is present and positive
/// - The price field for the other mode is absent
/// - Stock counters are non-negative
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_code(&product.code)?;
    validate_product_name(&product.name)?;

    if let Some(barcode) = &product.barcode {
        if barcode.len() > 64 {
            return Err(ValidationError::TooLong {
                field: "barcode".to_string(),
                max: 64,
            });
        }
    }

    if product.is_weighable {
        match product.price_per_gram {
            Some(price_per_gram) => validate_positive_amount(price_per_gram, "price_per_gram")?,
            None => {
                return Err(ValidationError::Required {
                    field: "price_per_gram".to_string(),
                })
            }
        }
        if product.unit_price.is_some() {
            return Err(ValidationError::NotAllowed {
                field: "unit_price".to_string(),
                reason: "does not apply to weighable products".to_string(),
            });
        }
    } else {
        match product.unit_price {
            Some(unit_price) => validate_positive_amount(unit_price, "unit_price")?,
            None => {
                return Err(ValidationError::Required {
                    field: "unit_price".to_string(),
                })
            }
        }
        if product.price_per_gram.is_some() {
            return Err(ValidationError::NotAllowed {
                field: "price_per_gram".to_string(),
                reason: "only applies to weighable products".to_string(),
            });
        }
    }

    if product.stock_quantity < 0 {
        return Err(ValidationError::Negative {
            field: "stock_quantity".to_string(),
        });
    }

    if product.min_stock < 0 {
        return Err(ValidationError::Negative {
            field: "min_stock".to_string(),
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
    use crate::types::ProductCategory;
    use rust_decimal_macros::dec;

    fn unit_draft() -> NewProduct {
        NewProduct {
            code: "COMBO1".to_string(),
            name: "Combo Açaí + Suco".to_string(),
            category: ProductCategory::Combo,
            is_weighable: false,
            unit_price: Some(dec!(19.90)),
            price_per_gram: None,
            image_url: None,
            stock_quantity: 10,
            min_stock: 2,
            is_active: true,
            barcode: None,
            description: None,
        }
    }

    #[test]
    fn test_validate_product_code() {
        // Valid codes
        assert!(validate_product_code("ACAI-500").is_ok());
        assert!(validate_product_code("ABC123").is_ok());
        assert!(validate_product_code("produto_1").is_ok());

        // Invalid codes
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("   ").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Açaí 500ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  açaí  ").unwrap(), "açaí");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(150)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_weight_kg() {
        assert!(validate_weight_kg(dec!(0.300)).is_ok());
        assert!(validate_weight_kg(dec!(50)).is_ok());

        assert!(validate_weight_kg(Decimal::ZERO).is_err());
        assert!(validate_weight_kg(dec!(-0.5)).is_err());
        assert!(validate_weight_kg(dec!(300)).is_err()); // grams typed as kg
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_non_negative(Decimal::ZERO, "price").is_ok());
        assert!(validate_non_negative(dec!(10.99), "price").is_ok());
        assert!(validate_non_negative(dec!(-1), "price").is_err());

        assert!(validate_positive_amount(dec!(50), "amount").is_ok());
        assert!(validate_positive_amount(Decimal::ZERO, "amount").is_err());
        assert!(validate_positive_amount(dec!(-50), "amount").is_err());
    }

    #[test]
    fn test_validate_new_product_pricing_modes() {
        assert!(validate_new_product(&unit_draft()).is_ok());

        // Weighable draft must carry a per-gram rate and nothing else
        let mut weighed = unit_draft();
        weighed.is_weighable = true;
        weighed.price_per_gram = Some(dec!(0.04499));
        weighed.unit_price = None;
        assert!(validate_new_product(&weighed).is_ok());

        weighed.price_per_gram = None;
        assert!(matches!(
            validate_new_product(&weighed),
            Err(ValidationError::Required { .. })
        ));

        weighed.price_per_gram = Some(Decimal::ZERO);
        assert!(matches!(
            validate_new_product(&weighed),
            Err(ValidationError::MustBePositive { .. })
        ));

        weighed.price_per_gram = Some(dec!(0.04499));
        weighed.unit_price = Some(dec!(44.99));
        assert!(matches!(
            validate_new_product(&weighed),
            Err(ValidationError::NotAllowed { .. })
        ));

        // Unit draft must not carry a per-gram rate
        let mut unit = unit_draft();
        unit.price_per_gram = Some(dec!(0.01));
        assert!(matches!(
            validate_new_product(&unit),
            Err(ValidationError::NotAllowed { .. })
        ));

        let mut negative_stock = unit_draft();
        negative_stock.stock_quantity = -1;
        assert!(matches!(
            validate_new_product(&negative_stock),
            Err(ValidationError::Negative { .. })
        ));
    }
}
