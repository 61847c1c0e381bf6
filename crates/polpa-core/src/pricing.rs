//! # Pricing Resolver
//!
//! Computes what a cart line costs, for both pricing modes.
//!
//! ## Pricing Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Fixed-unit product            │  Weighable product                     │
//! │  ──────────────────            │  ──────────────────                    │
//! │  priced by count               │  priced by mass                        │
//! │                                │                                        │
//! │  unit_price      12.90         │  price_per_gram  0.04499               │
//! │  quantity        2             │  weight_kg       0.300                 │
//! │                                │  quantity        1 (parcels)           │
//! │  subtotal = 12.90 × 2          │  subtotal = 0.04499 × 300              │
//! │           = 25.80              │           = 13.497 → 13.50             │
//! │                                │                                        │
//! │  line shows unit price         │  line shows 44.99 (rate per kg)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The displayed rate for a weighable product is per kilogram, but the
//! charged amount is computed from the raw per-gram rate and the weight in
//! grams, so display rounding never leaks into what the customer pays.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money;
use crate::types::Product;
use crate::validation::validate_weight_kg;

// =============================================================================
// Resolved Line Price
// =============================================================================

/// What the resolver hands back for one line: the price to show on the line
/// and the amount it charges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LinePrice {
    /// Price per unit, or the per-kilogram rate for weighable products.
    #[ts(as = "String")]
    pub unit_price: Decimal,

    /// The raw per-gram rate, kept for weighable lines so recomputation
    /// never rounds twice.
    #[ts(as = "Option<String>")]
    pub price_per_gram: Option<Decimal>,

    /// Charged amount, rounded to 2 decimals and clamped at zero.
    #[ts(as = "String")]
    pub subtotal: Decimal,
}

// =============================================================================
// Subtotal Formulas
// =============================================================================

/// Subtotal of a fixed-unit line: `unit_price × quantity − line_discount`,
/// rounded to 2 decimals, clamped at zero.
pub fn unit_subtotal(unit_price: Decimal, quantity: i64, line_discount: Decimal) -> Decimal {
    let raw = unit_price * Decimal::from(quantity) - line_discount;
    money::clamp_non_negative(money::round_money(raw))
}

/// Subtotal of a weighed line: `price_per_gram × grams × quantity −
/// line_discount`, rounded to 2 decimals, clamped at zero.
///
/// `quantity` counts identical parcels; a normal weighing has quantity 1.
pub fn weighed_subtotal(
    price_per_gram: Decimal,
    weight_kg: Decimal,
    quantity: i64,
    line_discount: Decimal,
) -> Decimal {
    let grams = money::weight_to_grams(weight_kg);
    let raw = price_per_gram * grams * Decimal::from(quantity) - line_discount;
    money::clamp_non_negative(money::round_money(raw))
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves the price of one cart line from a catalog product.
///
/// ## Behavior
/// - Rejects inactive products and products whose mode-selected price field
///   is absent or non-positive (`InvalidProduct`)
/// - Weighable products require a positive `weight_kg`; fixed-unit products
///   must not carry one (a `Validation` error naming the field)
/// - The returned `unit_price` is what the line displays: the unit price, or
///   the per-kilogram rate for weighable products
///
/// ## Example
/// ```rust,no_run
/// use polpa_core::pricing::resolve_line_price;
/// use rust_decimal::Decimal;
/// # use polpa_core::types::Product;
/// # fn catalog_product() -> Product { unimplemented!() }
///
/// let product = catalog_product();
/// let price = resolve_line_price(&product, 2, None, Decimal::ZERO).unwrap();
/// println!("line total: {}", price.subtotal);
/// ```
pub fn resolve_line_price(
    product: &Product,
    quantity: i64,
    weight_kg: Option<Decimal>,
    line_discount: Decimal,
) -> CoreResult<LinePrice> {
    if !product.is_active {
        return Err(CoreError::InvalidProduct {
            id: product.id.clone(),
            reason: "product is inactive".to_string(),
        });
    }

    if product.is_weighable {
        let price_per_gram = match product.price_per_gram {
            Some(price_per_gram) if price_per_gram > Decimal::ZERO => price_per_gram,
            Some(_) => {
                return Err(CoreError::InvalidProduct {
                    id: product.id.clone(),
                    reason: "price per gram must be positive".to_string(),
                })
            }
            None => {
                return Err(CoreError::InvalidProduct {
                    id: product.id.clone(),
                    reason: "weighable product has no price per gram".to_string(),
                })
            }
        };

        let weight_kg = weight_kg.ok_or(ValidationError::Required {
            field: "weight".to_string(),
        })?;
        validate_weight_kg(weight_kg)?;

        Ok(LinePrice {
            unit_price: money::display_rate_per_kg(price_per_gram),
            price_per_gram: Some(price_per_gram),
            subtotal: weighed_subtotal(price_per_gram, weight_kg, quantity, line_discount),
        })
    } else {
        let unit_price = match product.unit_price {
            Some(unit_price) if unit_price > Decimal::ZERO => unit_price,
            Some(_) => {
                return Err(CoreError::InvalidProduct {
                    id: product.id.clone(),
                    reason: "unit price must be positive".to_string(),
                })
            }
            None => {
                return Err(CoreError::InvalidProduct {
                    id: product.id.clone(),
                    reason: "product has no unit price".to_string(),
                })
            }
        };

        if weight_kg.is_some() {
            return Err(ValidationError::NotAllowed {
                field: "weight".to_string(),
                reason: "only applies to weighable products".to_string(),
            }
            .into());
        }

        Ok(LinePrice {
            unit_price,
            price_per_gram: None,
            subtotal: unit_subtotal(unit_price, quantity, line_discount),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
