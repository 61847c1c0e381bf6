//! # Terminal Session
//!
//! One logged-in operator at one store: the cart, the provider handles, and
//! the asynchronous sale finalizer with its single-flight guard.
//!
//! ## Finalize Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     finalize_sale()                                     │
//! │                                                                         │
//! │  1. busy flag ── compare_exchange(false → true)                         │
//! │        │              │                                                 │
//! │        │              └─ already true ──► Err(ALREADY_PROCESSING)       │
//! │        ▼                                                                │
//! │  2. snapshot cart under the lock, release the lock                      │
//! │        ▼                                                                │
//! │  3. registers.current_session()          (await, lock not held)         │
//! │        ▼                                                                │
//! │  4. build_sale_draft(cart, session, operator)                           │
//! │        │  EmptyCart / RegisterClosed / InsufficientChangeAmount         │
//! │        │  reject here - cart untouched                                  │
//! │        ▼                                                                │
//! │  5. sales.create_sale(draft)             (await, lock not held)         │
//! │        │  storage fault ──► Err(PERSISTENCE_FAILURE), cart KEPT         │
//! │        ▼                                                                │
//! │  6. clear cart, return the persisted Sale                               │
//! │                                                                         │
//! │  The busy flag resets on every exit path (RAII guard).                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations are synchronous and atomic from the caller's perspective;
//! each runs entirely within one lock acquisition and returns the updated
//! `CartView`. Disabling cart mutation while a finalize is in flight is a
//! caller policy, not enforced here.

use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TerminalConfig;
use crate::context::StoreContext;
use crate::error::TerminalResult;
use crate::state::CartState;
use polpa_core::checkout::build_sale_draft;
use polpa_core::validation::validate_search_query;
use polpa_core::{
    Cart, CartLine, CartTotals, CheckoutError, DiscountSpec, Operator, PaymentDraft,
    PaymentMethod, Product, RegisterSession, Sale,
};

// =============================================================================
// Cart View
// =============================================================================

/// Serializable snapshot of the cart, returned by every cart operation so an
/// embedding UI can re-render from a single payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Line items, in the order they were added.
    pub lines: Vec<CartLine>,

    /// Cart-level discount draft.
    pub discount: DiscountSpec,

    /// Payment draft, mutable until finalize.
    pub payment: PaymentDraft,

    /// Derived amounts.
    pub totals: CartTotals,
}

impl CartView {
    /// Taken inside the cart lock, so lines and totals always agree.
    fn snapshot(cart: &Cart) -> Self {
        CartView {
            lines: cart.lines.clone(),
            discount: cart.discount,
            payment: cart.payment.clone(),
            totals: cart.totals(),
        }
    }
}

// =============================================================================
// Terminal
// =============================================================================

/// A terminal session: one operator, one store, one cart.
///
/// All methods take `&self`; the terminal is safe to share behind an `Arc`
/// across the embedding runtime's tasks.
#[derive(Debug)]
pub struct Terminal {
    config: TerminalConfig,
    store: StoreContext,
    operator: Operator,
    cart: CartState,

    /// Single-flight guard for finalize. Set for the whole duration of a
    /// submission attempt; a second finalize while set is rejected.
    finalizing: AtomicBool,
}

/// Clears the busy flag when the finalize attempt ends, success or not.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Terminal {
    /// Creates a terminal session for an operator at a store.
    pub fn new(config: TerminalConfig, store: StoreContext, operator: Operator) -> Self {
        info!(
            store = %store.store_id,
            operator = %operator.id,
            "Terminal session created"
        );
        Terminal {
            config,
            store,
            operator,
            cart: CartState::new(),
            finalizing: AtomicBool::new(false),
        }
    }

    /// The terminal's configuration (store name, currency formatting).
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    /// The operator this session was opened for.
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// The store this terminal is bound to.
    pub fn store_id(&self) -> &str {
        &self.store.store_id
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Current cart snapshot.
    pub fn cart_view(&self) -> CartView {
        self.cart.with_cart(CartView::snapshot)
    }

    /// Current derived totals only.
    pub fn totals(&self) -> CartTotals {
        self.cart.with_cart(|cart| cart.totals())
    }

    /// Adds units of a fixed-price product (merges into an existing line).
    pub fn add_product(&self, product: &Product, quantity: i64) -> TerminalResult<CartView> {
        debug!(product_id = %product.id, quantity, "add_product");
        self.cart.with_cart_mut(|cart| {
            cart.add_item(product, quantity, None)?;
            Ok(CartView::snapshot(cart))
        })
    }

    /// Adds one weighed parcel of a weighable product (always a new line).
    pub fn add_weighed_product(
        &self,
        product: &Product,
        weight_kg: Decimal,
    ) -> TerminalResult<CartView> {
        debug!(product_id = %product.id, weight_kg = %weight_kg, "add_weighed_product");
        self.cart.with_cart_mut(|cart| {
            cart.add_weighed_item(product, weight_kg)?;
            Ok(CartView::snapshot(cart))
        })
    }

    /// Sets the quantity on every line of a product; `0` removes them.
    pub fn update_quantity(&self, product_id: &str, quantity: i64) -> TerminalResult<CartView> {
        debug!(product_id = %product_id, quantity, "update_quantity");
        self.cart.with_cart_mut(|cart| {
            cart.update_quantity(product_id, quantity)?;
            Ok(CartView::snapshot(cart))
        })
    }

    /// Removes all lines of a product. Removing an absent product is a no-op.
    pub fn remove_product(&self, product_id: &str) -> CartView {
        debug!(product_id = %product_id, "remove_product");
        self.cart.with_cart_mut(|cart| {
            cart.remove_item(product_id);
            CartView::snapshot(cart)
        })
    }

    /// Sets the line-level discount on every line of a product.
    pub fn set_line_discount(&self, product_id: &str, amount: Decimal) -> TerminalResult<CartView> {
        debug!(product_id = %product_id, amount = %amount, "set_line_discount");
        self.cart.with_cart_mut(|cart| {
            cart.set_line_discount(product_id, amount)?;
            Ok(CartView::snapshot(cart))
        })
    }

    /// Replaces the cart-level discount draft.
    pub fn set_discount(&self, spec: DiscountSpec) -> TerminalResult<CartView> {
        debug!(kind = ?spec.kind, value = %spec.value, "set_discount");
        self.cart.with_cart_mut(|cart| {
            cart.set_discount(spec)?;
            Ok(CartView::snapshot(cart))
        })
    }

    /// Replaces the payment method on the draft.
    pub fn set_payment_method(&self, method: PaymentMethod) -> CartView {
        debug!(method = ?method, "set_payment_method");
        self.cart.with_cart_mut(|cart| {
            cart.set_payment_method(method);
            CartView::snapshot(cart)
        })
    }

    /// Replaces the customer fields on the payment draft.
    pub fn set_customer(&self, name: Option<String>, phone: Option<String>) -> CartView {
        self.cart.with_cart_mut(|cart| {
            cart.set_customer(name, phone);
            CartView::snapshot(cart)
        })
    }

    /// Replaces the tendered-cash amount; `None` clears it.
    pub fn set_change_for(&self, amount: Option<Decimal>) -> TerminalResult<CartView> {
        self.cart.with_cart_mut(|cart| {
            cart.set_change_for(amount)?;
            Ok(CartView::snapshot(cart))
        })
    }

    /// Replaces the free-text note carried onto the sale record.
    pub fn set_notes(&self, notes: Option<String>) -> CartView {
        self.cart.with_cart_mut(|cart| {
            cart.set_notes(notes);
            CartView::snapshot(cart)
        })
    }

    /// Empties the cart and resets discount and payment drafts. The cancel
    /// path: an operator may only cancel before finalize submits.
    pub fn clear_cart(&self) -> CartView {
        debug!("clear_cart");
        self.cart.with_cart_mut(|cart| {
            cart.clear();
            CartView::snapshot(cart)
        })
    }

    // =========================================================================
    // Catalog & Register
    // =========================================================================

    /// Active products for the store, name order.
    pub async fn list_products(&self) -> TerminalResult<Vec<Product>> {
        debug!("list_products");
        Ok(self.store.catalog.list_active_products().await?)
    }

    /// Case-insensitive substring search over name/code/barcode/category.
    /// The query is trimmed; an over-long query is rejected before it
    /// reaches the catalog.
    pub async fn search_products(&self, query: &str) -> TerminalResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        debug!(query = %query, "search_products");
        Ok(self.store.catalog.search_products(&query).await?)
    }

    /// The store's most recent register session, if any.
    pub async fn register_session(&self) -> TerminalResult<Option<RegisterSession>> {
        Ok(self.store.registers.current_session().await?)
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    /// Converts the cart into a persisted, immutable sale.
    ///
    /// ## Behavior
    /// - Rejects while another finalize is in flight (`ALREADY_PROCESSING`)
    /// - Validates against the current register session and the payment
    ///   draft; a rejection leaves the cart untouched
    /// - On a storage fault the cart is preserved so the operator can retry
    ///   without re-entering the sale
    /// - On commit the cart is cleared and the sale (with its assigned
    ///   number) is returned for receipt display
    pub async fn finalize_sale(&self) -> TerminalResult<Sale> {
        if self
            .finalizing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("finalize_sale rejected: an attempt is already in flight");
            return Err(CheckoutError::AlreadyProcessing.into());
        }
        let _flight = FlightGuard(&self.finalizing);

        self.submit_sale().await
    }

    async fn submit_sale(&self) -> TerminalResult<Sale> {
        // Snapshot under the lock; the lock is never held across an await
        let cart = self.cart.with_cart(|cart| cart.clone());

        let session = self
            .store
            .registers
            .current_session()
            .await
            .map_err(CheckoutError::Persistence)?;

        let draft = build_sale_draft(&cart, session.as_ref(), &self.operator)?;

        info!(
            store = %self.store.store_id,
            operator = %self.operator.id,
            items = draft.items.len(),
            total = %draft.total_amount,
            "Submitting sale"
        );

        let sale = self
            .store
            .sales
            .create_sale(draft)
            .await
            .map_err(CheckoutError::Persistence)?;

        // Clear only after the store has committed; any failure above leaves
        // the operator's work intact
        self.cart.with_cart_mut(|cart| cart.clear());

        info!(
            sale_id = %sale.id,
            number = sale.sale_number,
            total = %sale.total_amount,
            "Sale committed"
        );

        Ok(sale)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
