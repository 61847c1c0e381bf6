//! # Money Module
//!
//! Decimal helpers for monetary values and weight-to-price conversion.
//!
//! ## Why Decimal, Not Float?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  And integer cents cannot hold a per-gram rate:                         │
//! │    R$ 0.04499/g  →  4.499 cents  →  truncated to 4  →  10% error!      │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Exact base-10 arithmetic, rounded half-to-even ONLY at the point     │
//! │    a result is stored (line subtotal, discount amount, change)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Policy
//! Every stored monetary value has exactly two decimal places, produced by
//! [`round_money`] (banker's rounding). Intermediate arithmetic keeps full
//! precision so repeated recomputation never compounds rounding error.

use rust_decimal::{Decimal, RoundingStrategy};

// =============================================================================
// Constants
// =============================================================================

/// Grams in one kilogram; weighable products are priced per gram but
/// weighed (and displayed) in kilograms.
pub const GRAMS_PER_KILOGRAM: Decimal = Decimal::ONE_THOUSAND;

// =============================================================================
// Rounding
// =============================================================================

/// Rounds a monetary amount to 2 decimal places using Bankers Rounding.
///
/// ## Bankers Rounding Explained
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  BANKERS ROUNDING (Round Half to Even)                              │
/// │                                                                     │
/// │  Standard rounding always rounds 0.5 UP, causing systematic bias:  │
/// │    0.125 → 0.13, 0.135 → 0.14, 0.145 → 0.15 (always up = +bias)   │
/// │                                                                     │
/// │  Bankers Rounding rounds 0.5 to the nearest EVEN digit:            │
/// │    0.125 → 0.12, 0.135 → 0.14, 0.145 → 0.14 (alternates, no bias) │
/// │                                                                     │
/// │  Over millions of weighed sales this prevents systematic loss/gain │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
///
/// ## Example
/// ```rust
/// use polpa_core::money::round_money;
/// use rust_decimal::Decimal;
///
/// let raw: Decimal = "13.497".parse().unwrap();
/// assert_eq!(round_money(raw).to_string(), "13.50");
/// ```
#[inline]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Clamps an amount at zero (discounts can never drive a value negative).
#[inline]
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

// =============================================================================
// Weight Conversion
// =============================================================================

/// Converts a weight in kilograms (what the scale reports) to grams
/// (what the catalog prices by).
#[inline]
pub fn weight_to_grams(weight_kg: Decimal) -> Decimal {
    weight_kg * GRAMS_PER_KILOGRAM
}

/// The rate shown to the operator for a weighable product: price per
/// kilogram, derived from the stored per-gram rate.
///
/// ## Example
/// A per-gram rate of 0.04499 displays as 44.99 per kg.
#[inline]
pub fn display_rate_per_kg(price_per_gram: Decimal) -> Decimal {
    round_money(price_per_gram * GRAMS_PER_KILOGRAM)
}

// =============================================================================
// Display Formatting
// =============================================================================

/// Formats an amount in pt-BR convention: `.` groups thousands, `,` is the
/// decimal separator. The currency symbol is the terminal's concern.
///
/// ## Example
/// ```rust
/// use polpa_core::money::format_amount;
/// use rust_decimal::Decimal;
///
/// let amount: Decimal = "1234.5".parse().unwrap();
/// assert_eq!(format_amount(amount), "1.234,50");
/// ```
pub fn format_amount(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    // Group the integer part in threes from the right
    let digits: Vec<char> = whole.chars().rev().collect();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*ch);
    }
    let whole_grouped: String = grouped.chars().rev().collect();

    format!("{}{},{}", sign, whole_grouped, cents)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_plain() {
        assert_eq!(round_money(dec!(13.497)), dec!(13.50));
        assert_eq!(round_money(dec!(13.492)), dec!(13.49));
        assert_eq!(round_money(dec!(25.80)), dec!(25.80));
    }

    #[test]
    fn test_round_money_midpoint_goes_to_even() {
        assert_eq!(round_money(dec!(0.125)), dec!(0.12));
        assert_eq!(round_money(dec!(0.135)), dec!(0.14));
        assert_eq!(round_money(dec!(0.145)), dec!(0.14));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
        // 0.005 sits exactly between 0.00 and 0.01; even wins
        assert_eq!(round_money(dec!(0.005)), dec!(0.00));
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(clamp_non_negative(dec!(-3.10)), Decimal::ZERO);
        assert_eq!(clamp_non_negative(dec!(0)), Decimal::ZERO);
        assert_eq!(clamp_non_negative(dec!(3.10)), dec!(3.10));
    }

    #[test]
    fn test_weight_to_grams() {
        assert_eq!(weight_to_grams(dec!(0.300)), dec!(300.000));
        assert_eq!(weight_to_grams(dec!(1)), dec!(1000));
        assert_eq!(weight_to_grams(dec!(0.0125)), dec!(12.5000));
    }

    #[test]
    fn test_display_rate_per_kg() {
        assert_eq!(display_rate_per_kg(dec!(0.04499)), dec!(44.99));
        assert_eq!(display_rate_per_kg(dec!(0.035)), dec!(35.00));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(12.9)), "12,90");
        assert_eq!(format_amount(dec!(1234.5)), "1.234,50");
        assert_eq!(format_amount(dec!(1234567.89)), "1.234.567,89");
        assert_eq!(format_amount(dec!(0)), "0,00");
        assert_eq!(format_amount(dec!(-35.37)), "-35,37");
    }

    /// The weighed-sale flow in one place: a 300 g parcel at 0.04499/g
    /// charges 13.497, stored as 13.50.
    #[test]
    fn test_weighed_parcel_rounding() {
        let raw = dec!(0.04499) * weight_to_grams(dec!(0.300));
        assert_eq!(raw, dec!(13.49700000));
        assert_eq!(round_money(raw), dec!(13.50));
    }
}
