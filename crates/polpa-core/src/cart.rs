//! # Cart Store
//!
//! The mutable state of one in-progress sale: line items, the cart-level
//! discount draft, and the payment draft.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Operator Action           Cart Operation          State Change         │
//! │  ───────────────           ──────────────          ────────────         │
//! │                                                                         │
//! │  Tap product ─────────────► add_item() ───────────► merge or push line  │
//! │                                                                         │
//! │  Weigh parcel ────────────► add_weighed_item() ───► push line (always)  │
//! │                                                                         │
//! │  Change quantity ─────────► update_quantity() ────► set qty, recompute  │
//! │                                                                         │
//! │  Remove line ─────────────► remove_item() ────────► drop matching lines │
//! │                                                                         │
//! │  Apply discount ──────────► set_discount() ───────► replace draft       │
//! │                                                                         │
//! │  Payment details ─────────► set_payment_method()   replace draft fields │
//! │                             set_customer()                              │
//! │                             set_change_for()                            │
//! │                                                                         │
//! │  Cancel / committed ──────► clear() ──────────────► reset everything    │
//! │                                                                         │
//! │  Every mutation returns the recomputed CartTotals.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Freezing
//! A line snapshots the product's identity and price at add time. Catalog
//! edits after that point never re-price lines already in the cart; merging
//! more units into an existing line keeps the frozen price.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::compute_discount;
use crate::error::{CoreError, CoreResult};
use crate::money;
use crate::pricing::{resolve_line_price, unit_subtotal, weighed_subtotal, LinePrice};
use crate::types::{DiscountSpec, PaymentDraft, PaymentMethod, Product};
use crate::validation::{validate_non_negative, validate_quantity};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart: a single product addition event (unit purchase or
/// one weighed parcel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product ID (UUID), the removal/update key.
    pub product_id: String,

    /// Code at time of adding (frozen)
    pub product_code: String,

    /// Name at time of adding (frozen)
    pub product_name: String,

    /// Pricing mode at time of adding (frozen)
    pub is_weighable: bool,

    /// Unit count, or the number of identical weighed parcels.
    pub quantity: i64,

    /// Scale reading, present iff the product is weighable.
    #[ts(as = "Option<String>")]
    pub weight_kg: Option<Decimal>,

    /// Price at time of adding (frozen): per unit, or the per-kilogram rate
    /// for weighed lines.
    #[ts(as = "String")]
    pub unit_price: Decimal,

    /// Raw per-gram rate (frozen), kept so recomputation never rounds twice.
    #[ts(as = "Option<String>")]
    pub price_per_gram: Option<Decimal>,

    /// Line-level discount amount, default 0.
    #[ts(as = "String")]
    pub line_discount: Decimal,

    /// Charged amount for this line, rounded and clamped at zero.
    #[ts(as = "String")]
    pub subtotal: Decimal,

    /// When this line was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(
        product: &Product,
        quantity: i64,
        weight_kg: Option<Decimal>,
        price: LinePrice,
    ) -> Self {
        CartLine {
            product_id: product.id.clone(),
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            is_weighable: product.is_weighable,
            quantity,
            weight_kg,
            unit_price: price.unit_price,
            price_per_gram: price.price_per_gram,
            line_discount: Decimal::ZERO,
            subtotal: price.subtotal,
            added_at: Utc::now(),
        }
    }

    /// Recomputes the stored subtotal after a quantity or discount change,
    /// using the mode-appropriate formula and the frozen price.
    pub fn recompute_subtotal(&mut self) {
        self.subtotal = match (self.price_per_gram, self.weight_kg) {
            (Some(price_per_gram), Some(weight_kg)) => {
                weighed_subtotal(price_per_gram, weight_kg, self.quantity, self.line_discount)
            }
            _ => unit_subtotal(self.unit_price, self.quantity, self.line_discount),
        };
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress sale.
///
/// ## Invariants
/// - Fixed-unit lines are unique by `product_id` (adding the same product
///   again merges into the existing line)
/// - Weighable products get one line per weighing event; several lines may
///   share a `product_id`
/// - `quantity ≥ 1` on every line; `subtotal ≥ 0` on every line
/// - Maximum lines: `MAX_CART_LINES`; maximum quantity per line:
///   `MAX_LINE_QUANTITY`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Line items, in the order they were added.
    pub lines: Vec<CartLine>,

    /// Cart-level discount draft.
    pub discount: DiscountSpec,

    /// Payment draft, mutable until finalize.
    pub payment: PaymentDraft,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            discount: DiscountSpec::none(),
            payment: PaymentDraft::default(),
            created_at: Utc::now(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - Fixed-unit product already in cart: merges into the existing line,
    ///   keeping the frozen price
    /// - Otherwise: appends a new line priced by the resolver
    /// - Weighable products always get a new line per weighing, so
    ///   `weight_kg` is required for them and rejected for fixed-unit ones
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        weight_kg: Option<Decimal>,
    ) -> CoreResult<CartTotals> {
        validate_quantity(quantity)?;
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        // Validates the product and the weight arguments even when merging.
        let price = resolve_line_price(product, quantity, weight_kg, Decimal::ZERO)?;

        if !product.is_weighable {
            if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
                let merged = line.quantity + quantity;
                if merged > MAX_LINE_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: merged,
                        max: MAX_LINE_QUANTITY,
                    });
                }
                line.quantity = merged;
                line.recompute_subtotal();
                return Ok(self.totals());
            }
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines
            .push(CartLine::from_product(product, quantity, weight_kg, price));
        Ok(self.totals())
    }

    /// Adds one weighed parcel of a weighable product. The scale flow's
    /// entry point.
    pub fn add_weighed_item(
        &mut self,
        product: &Product,
        weight_kg: Decimal,
    ) -> CoreResult<CartTotals> {
        self.add_item(product, 1, Some(weight_kg))
    }

    /// Removes all lines referencing a product id (weighed parcels
    /// included). Removing an absent product id is a no-op.
    pub fn remove_item(&mut self, product_id: &str) -> CartTotals {
        self.lines.retain(|l| l.product_id != product_id);
        self.totals()
    }

    /// Updates the quantity on every line for a product id.
    ///
    /// ## Behavior
    /// - `new_quantity ≤ 0`: removes the line(s)
    /// - Otherwise: sets the quantity and recomputes each line's subtotal
    /// - Fails with `LineNotFound` if no line matches
    pub fn update_quantity(&mut self, product_id: &str, new_quantity: i64) -> CoreResult<CartTotals> {
        if new_quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }

        if new_quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        let mut found = false;
        for line in self.lines.iter_mut().filter(|l| l.product_id == product_id) {
            line.quantity = new_quantity;
            line.recompute_subtotal();
            found = true;
        }

        if !found {
            return Err(CoreError::LineNotFound {
                product_id: product_id.to_string(),
            });
        }

        Ok(self.totals())
    }

    /// Sets the line-level discount on every line for a product id and
    /// recomputes their subtotals. Fails with `LineNotFound` if no line
    /// matches, or a validation error for a negative amount.
    pub fn set_line_discount(
        &mut self,
        product_id: &str,
        amount: Decimal,
    ) -> CoreResult<CartTotals> {
        validate_non_negative(amount, "line discount")?;

        let mut found = false;
        for line in self.lines.iter_mut().filter(|l| l.product_id == product_id) {
            line.line_discount = amount;
            line.recompute_subtotal();
            found = true;
        }

        if !found {
            return Err(CoreError::LineNotFound {
                product_id: product_id.to_string(),
            });
        }

        Ok(self.totals())
    }

    /// Replaces the cart-level discount draft. Rejects a negative value;
    /// out-of-range percentages are clamped by the calculator instead.
    pub fn set_discount(&mut self, spec: DiscountSpec) -> CoreResult<CartTotals> {
        validate_non_negative(spec.value, "discount")?;
        self.discount = spec;
        Ok(self.totals())
    }

    /// Replaces the payment method on the draft.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> CartTotals {
        self.payment.method = method;
        self.totals()
    }

    /// Replaces the customer fields on the payment draft.
    pub fn set_customer(&mut self, name: Option<String>, phone: Option<String>) -> CartTotals {
        self.payment.customer_name = name;
        self.payment.customer_phone = phone;
        self.totals()
    }

    /// Replaces the tendered-cash amount on the payment draft. `None`
    /// clears it; a negative amount is rejected. Whether it covers the
    /// total is checked at finalize, not here.
    pub fn set_change_for(&mut self, change_for: Option<Decimal>) -> CoreResult<CartTotals> {
        if let Some(amount) = change_for {
            validate_non_negative(amount, "change_for")?;
        }
        self.payment.change_for = change_for;
        Ok(self.totals())
    }

    /// Replaces the free-text note carried onto the sale record.
    pub fn set_notes(&mut self, notes: Option<String>) -> CartTotals {
        self.payment.notes = notes;
        self.totals()
    }

    /// Empties the cart and resets discount and payment drafts to defaults.
    pub fn clear(&mut self) -> CartTotals {
        self.lines.clear();
        self.discount = DiscountSpec::none();
        self.payment = PaymentDraft::default();
        self.created_at = Utc::now();
        self.totals()
    }

    // =========================================================================
    // Derived Getters
    // =========================================================================

    /// Sum of line subtotals. Recomputed on every call; lines already carry
    /// rounded values, so no further rounding is applied.
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    /// The cart-level discount resolved against the current subtotal.
    pub fn discount_amount(&self) -> Decimal {
        compute_discount(self.subtotal(), &self.discount)
    }

    /// Grand total, never negative.
    pub fn total(&self) -> Decimal {
        money::clamp_non_negative(self.subtotal() - self.discount_amount())
    }

    /// Number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Bundles the derived amounts for display.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Derived totals summary, returned by every cart mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    #[ts(as = "String")]
    pub subtotal: Decimal,
    #[ts(as = "String")]
    pub discount_amount: Decimal,
    #[ts(as = "String")]
    pub total: Decimal,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount_amount: cart.discount_amount(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
