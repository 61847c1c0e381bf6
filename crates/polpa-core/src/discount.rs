//! # Discount Calculator
//!
//! Resolves a [`DiscountSpec`] against the cart subtotal. Discounts clamp
//! rather than error: a flat discount larger than the subtotal takes the
//! whole subtotal, a percentage outside 0-100 is pulled back into range.

use rust_decimal::Decimal;

use crate::money;
use crate::types::{DiscountKind, DiscountSpec};

/// Computes the discount amount for a subtotal.
///
/// ## Behavior
/// - `none` → 0
/// - `flat` → `min(value, subtotal)`, never driving the total negative
/// - `percentage` → `subtotal × clamp(value, 0, 100) / 100`
///
/// The result is rounded to 2 decimals with the same banker's rounding the
/// pricing resolver uses.
pub fn compute_discount(subtotal: Decimal, spec: &DiscountSpec) -> Decimal {
    let amount = match spec.kind {
        DiscountKind::None => Decimal::ZERO,
        DiscountKind::Flat => spec.value.clamp(Decimal::ZERO, subtotal),
        DiscountKind::Percentage => {
            let percentage = spec.value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
            subtotal * percentage / Decimal::ONE_HUNDRED
        }
    };

    money::round_money(amount)
}

/// The percentage a spec applies, for the sale record: the clamped value for
/// percentage discounts, zero for everything else.
pub fn applied_percentage(spec: &DiscountSpec) -> Decimal {
    match spec.kind {
        DiscountKind::Percentage => spec.value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
        _ => Decimal::ZERO,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_discount() {
        assert_eq!(compute_discount(dec!(50.00), &DiscountSpec::none()), Decimal::ZERO);
        assert_eq!(compute_discount(dec!(50.00), &DiscountSpec::default()), Decimal::ZERO);
    }

    #[test]
    fn test_flat_discount_clamps_at_subtotal() {
        let spec = DiscountSpec::flat(dec!(15.00));
        assert_eq!(compute_discount(dec!(10.00), &spec), dec!(10.00));
        assert_eq!(compute_discount(dec!(20.00), &spec), dec!(15.00));

        // A negative flat value must not inflate the total
        assert_eq!(
            compute_discount(dec!(10.00), &DiscountSpec::flat(dec!(-5.00))),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_percentage_discount() {
        let spec = DiscountSpec::percentage(dec!(10));
        assert_eq!(compute_discount(dec!(39.30), &spec), dec!(3.93));

        // 150% clamps to 100%
        let spec = DiscountSpec::percentage(dec!(150));
        assert_eq!(compute_discount(dec!(50.00), &spec), dec!(50.00));
    }

    #[test]
    fn test_percentage_rounds_half_to_even() {
        // 10% of 0.05 = 0.005, which banker's rounding takes down to 0.00
        let spec = DiscountSpec::percentage(dec!(10));
        assert_eq!(compute_discount(dec!(0.05), &spec), dec!(0.00));
    }

    #[test]
    fn test_applied_percentage() {
        assert_eq!(applied_percentage(&DiscountSpec::percentage(dec!(10))), dec!(10));
        assert_eq!(applied_percentage(&DiscountSpec::percentage(dec!(150))), dec!(100));
        assert_eq!(applied_percentage(&DiscountSpec::flat(dec!(10))), Decimal::ZERO);
        assert_eq!(applied_percentage(&DiscountSpec::none()), Decimal::ZERO);
    }
}
