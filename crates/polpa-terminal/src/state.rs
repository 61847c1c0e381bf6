//! # Cart State
//!
//! Thread-safe ownership of the terminal's in-progress cart.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Session methods may be called from any task of the embedding runtime
//! 2. Only one caller should modify the cart at a time
//! 3. Every operation runs entirely within one lock acquisition, so no
//!    derived total can be read mid-update
//!
//! ## Why Not RwLock?
//! Cart operations are quick, and most operations modify state.
//! A RwLock would add complexity with minimal benefit.
//!
//! The lock is never held across an await: the finalize path snapshots the
//! cart under the lock, releases it, and re-acquires it only to clear after
//! the sale store commits.

use std::sync::{Arc, Mutex};

use polpa_core::Cart;

/// The terminal-owned cart, one per terminal.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|cart| cart.totals());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(&product, 1, None))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}
