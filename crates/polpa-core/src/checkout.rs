//! # Sale Finalization
//!
//! The validating half of the finalize state machine: precondition checks
//! and assembly of the immutable sale draft.
//!
//! ## Finalize State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Idle ──► Validating ──┬──► Rejected(reason)                            │
//! │                        │    EmptyCart / RegisterClosed /                │
//! │                        │    InsufficientChangeAmount                    │
//! │                        │                                                │
//! │                        └──► Submitting ──┬──► Committed(sale)           │
//! │                                          │    cart cleared              │
//! │                                          │                              │
//! │                                          └──► Failed(reason)            │
//! │                                               cart preserved, operator  │
//! │                                               may retry                 │
//! │                                                                         │
//! │  THIS MODULE: Idle → Validating → { Rejected | draft ready }            │
//! │  polpa-terminal: Submitting and the single-flight guard                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `build_sale_draft` is a pure function of the cart, the register session,
//! and the operator. It never mutates the cart; clearing on commit is the
//! terminal's job, so a persistence fault can never lose the operator's
//! work.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::discount::applied_percentage;
use crate::error::CheckoutError;
use crate::money;
use crate::types::{Operator, PaymentMethod, RegisterSession, SaleItem};

// =============================================================================
// Sale Draft
// =============================================================================

/// Everything the sale store needs to persist a finalized sale. The store
/// assigns what the draft cannot know: id, per-store sequence number, and
/// creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    /// The open register session the sale attaches to.
    pub register_id: String,

    pub operator_id: String,
    pub operator_name: String,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,

    #[ts(as = "String")]
    pub subtotal: Decimal,
    #[ts(as = "String")]
    pub discount_amount: Decimal,
    #[ts(as = "String")]
    pub discount_percentage: Decimal,
    #[ts(as = "String")]
    pub total_amount: Decimal,

    pub payment_type: PaymentMethod,
    #[ts(as = "String")]
    pub change_amount: Decimal,

    pub notes: Option<String>,

    /// Line snapshots in cart order.
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Validation + Assembly
// =============================================================================

/// Validates finalize preconditions and assembles the sale draft.
///
/// ## Behavior
/// Rejects, in this order, when:
/// - the cart has no lines (`EmptyCart`)
/// - there is no session, or the session is closed (`RegisterClosed`)
/// - paying cash with a tendered amount below the total
///   (`InsufficientChangeAmount`)
///
/// On success the draft carries `change_amount = max(0, change_for − total)`
/// for cash payments with a tendered amount, else 0. The cart is borrowed,
/// never touched: callers clear it only after the store commits.
pub fn build_sale_draft(
    cart: &Cart,
    session: Option<&RegisterSession>,
    operator: &Operator,
) -> Result<SaleDraft, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let session = match session {
        Some(session) if session.is_open => session,
        _ => return Err(CheckoutError::RegisterClosed),
    };

    let total = cart.total();
    let change_amount = match (cart.payment.method, cart.payment.change_for) {
        (PaymentMethod::Cash, Some(change_for)) => {
            if change_for < total {
                return Err(CheckoutError::InsufficientChangeAmount { change_for, total });
            }
            money::clamp_non_negative(change_for - total)
        }
        _ => Decimal::ZERO,
    };

    let items = cart
        .lines
        .iter()
        .map(|line| SaleItem {
            product_id: line.product_id.clone(),
            product_code: line.product_code.clone(),
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            weight_kg: line.weight_kg,
            unit_price: line.unit_price,
            price_per_gram: line.price_per_gram,
            discount_amount: line.line_discount,
            subtotal: line.subtotal,
        })
        .collect();

    Ok(SaleDraft {
        register_id: session.id.clone(),
        operator_id: operator.id.clone(),
        operator_name: operator.name.clone(),
        customer_name: cart.payment.customer_name.clone(),
        customer_phone: cart.payment.customer_phone.clone(),
        subtotal: cart.subtotal(),
        discount_amount: cart.discount_amount(),
        discount_percentage: applied_percentage(&cart.discount),
        total_amount: total,
        payment_type: cart.payment.method,
        change_amount,
        notes: cart.payment.notes.clone(),
        items,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscountSpec, Product, ProductCategory};
    use crate::DEFAULT_STORE_ID;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn operator() -> Operator {
        Operator {
            id: "op-1".to_string(),
            name: "Maria".to_string(),
        }
    }

    fn open_session() -> RegisterSession {
        RegisterSession {
            id: "reg-1".to_string(),
            is_open: true,
        }
    }

    fn test_product(id: &str, unit_price: Decimal) -> Product {
        Product {
            id: id.to_string(),
            store_id: DEFAULT_STORE_ID.to_string(),
            code: format!("COD-{}", id),
            name: format!("Produto {}", id),
            category: ProductCategory::Outros,
            is_weighable: false,
            unit_price: Some(unit_price),
            price_per_gram: None,
            image_url: None,
            stock_quantity: 100,
            min_stock: 10,
            is_active: true,
            barcode: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_weighed_product(id: &str, price_per_gram: Decimal) -> Product {
        Product {
            is_weighable: true,
            unit_price: None,
            price_per_gram: Some(price_per_gram),
            ..test_product(id, Decimal::ZERO)
        }
    }

    /// Two units at 12.90 plus one 0.300 kg parcel at 0.04499/g, 10% off.
    fn scenario_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&test_product("copo", dec!(12.90)), 2, None).unwrap();
        cart.add_weighed_item(&test_weighed_product("kg", dec!(0.04499)), dec!(0.300))
            .unwrap();
        cart.set_discount(DiscountSpec::percentage(dec!(10))).unwrap();
        cart
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let cart = Cart::new();
        let err = build_sale_draft(&cart, Some(&open_session()), &operator()).unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[test]
    fn test_closed_register_is_rejected() {
        let cart = scenario_cart();

        let err = build_sale_draft(&cart, None, &operator()).unwrap_err();
        assert!(matches!(err, CheckoutError::RegisterClosed));

        let closed = RegisterSession {
            id: "reg-1".to_string(),
            is_open: false,
        };
        let err = build_sale_draft(&cart, Some(&closed), &operator()).unwrap_err();
        assert!(matches!(err, CheckoutError::RegisterClosed));

        // The cart is untouched either way
        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_insufficient_change_is_rejected() {
        let mut cart = scenario_cart();
        cart.set_change_for(Some(dec!(30.00))).unwrap();

        let err = build_sale_draft(&cart, Some(&open_session()), &operator()).unwrap_err();
        match err {
            CheckoutError::InsufficientChangeAmount { change_for, total } => {
                assert_eq!(change_for, dec!(30.00));
                assert_eq!(total, dec!(35.37));
            }
            other => panic!("expected InsufficientChangeAmount, got {other:?}"),
        }
    }

    #[test]
    fn test_cash_change_is_tendered_minus_total() {
        let mut cart = scenario_cart();
        cart.set_change_for(Some(dec!(50.00))).unwrap();

        let draft = build_sale_draft(&cart, Some(&open_session()), &operator()).unwrap();
        assert_eq!(draft.subtotal, dec!(39.30));
        assert_eq!(draft.discount_amount, dec!(3.93));
        assert_eq!(draft.discount_percentage, dec!(10));
        assert_eq!(draft.total_amount, dec!(35.37));
        assert_eq!(draft.change_amount, dec!(14.63));
        assert_eq!(draft.register_id, "reg-1");
        assert_eq!(draft.operator_name, "Maria");
    }

    #[test]
    fn test_cash_without_tendered_amount_has_no_change() {
        let cart = scenario_cart();
        let draft = build_sale_draft(&cart, Some(&open_session()), &operator()).unwrap();
        assert_eq!(draft.payment_type, PaymentMethod::Cash);
        assert_eq!(draft.change_amount, Decimal::ZERO);
    }

    #[test]
    fn test_non_cash_ignores_change_for() {
        let mut cart = scenario_cart();
        cart.set_payment_method(PaymentMethod::Pix);
        // A stale tendered amount below the total must not reject a pix sale
        cart.set_change_for(Some(dec!(10.00))).unwrap();

        let draft = build_sale_draft(&cart, Some(&open_session()), &operator()).unwrap();
        assert_eq!(draft.change_amount, Decimal::ZERO);
    }

    #[test]
    fn test_items_snapshot_cart_lines_in_order() {
        let mut cart = scenario_cart();
        cart.set_line_discount("copo", dec!(1.00)).unwrap();
        cart.set_customer(Some("Ana".to_string()), Some("11 91234-5678".to_string()));
        cart.set_notes(Some("sem granola".to_string()));

        let draft = build_sale_draft(&cart, Some(&open_session()), &operator()).unwrap();

        assert_eq!(draft.items.len(), 2);
        let first = &draft.items[0];
        assert_eq!(first.product_id, "copo");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.discount_amount, dec!(1.00));
        assert_eq!(first.subtotal, dec!(24.80));

        let second = &draft.items[1];
        assert_eq!(second.product_id, "kg");
        assert_eq!(second.weight_kg, Some(dec!(0.300)));
        assert_eq!(second.unit_price, dec!(44.99));
        assert_eq!(second.price_per_gram, Some(dec!(0.04499)));
        assert_eq!(second.subtotal, dec!(13.50));

        assert_eq!(draft.customer_name.as_deref(), Some("Ana"));
        assert_eq!(draft.notes.as_deref(), Some("sem granola"));

        // Building the draft never mutates the cart
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.payment.notes.as_deref(), Some("sem granola"));
    }
}
