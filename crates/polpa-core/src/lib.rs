//! # polpa-core: Pure Business Logic for Polpa POS
//!
//! This crate is the **heart** of Polpa POS. It contains the cart and
//! sale-finalization rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Polpa POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     UI Shell (out of tree)                      │   │
//! │  │    Catalog UI ──► Cart UI ──► Payment UI ──► Receipt UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   polpa-terminal (session layer)                │   │
//! │  │    add_item, set_discount, finalize_sale, search_products      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ polpa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │   cart    │  │ checkout  │  │   │
//! │  │   │  Product  │  │ unit/kg   │  │   Cart    │  │ SaleDraft │  │   │
//! │  │   │   Sale    │  │  rules    │  │ CartLine  │  │  builder  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    polpa-db (Database Layer)                    │   │
//! │  │         SQLite queries, migrations, trait implementations       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, CashRegister, etc.)
//! - [`money`] - Decimal money helpers (banker's rounding, weight math)
//! - [`pricing`] - Line pricing: fixed-unit vs. weighable-by-gram
//! - [`discount`] - Cart-level discount resolution
//! - [`cart`] - The mutable cart and its derived totals
//! - [`checkout`] - Validation and assembly of the immutable sale draft
//! - [`provider`] - Collaborator traits (catalog, register, sale store)
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Exact Decimals**: All monetary values are `rust_decimal::Decimal`,
//!    rounded half-to-even only where a result is stored
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use polpa_core::{Cart, DiscountSpec};
//!
//! let mut cart = Cart::new();
//! cart.add_item(&acai_500ml, 2, None)?;
//! cart.add_weighed_item(&acai_per_kg, weight_from_scale)?;
//! cart.set_discount(DiscountSpec::percentage(dec!(10)))?;
//!
//! let totals = cart.totals(); // subtotal / discount / total
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod provider;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use polpa_core::Cart` instead of
// `use polpa_core::cart::Cart`

pub use cart::{Cart, CartLine, CartTotals};
pub use checkout::{build_sale_draft, SaleDraft};
pub use error::{CheckoutError, CoreError, CoreResult, ProviderError, ValidationError};
pub use provider::{CatalogProvider, RegisterProvider, SaleStore};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default store ID (channel tag) for single-store deployments.
///
/// ## Why a constant?
/// The schema and all repositories are keyed by store_id so one database
/// serves several locations; a deployment with a single location simply
/// runs everything under this tag.
pub const DEFAULT_STORE_ID: &str = "loja1";

/// Maximum line items allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum weight accepted for a single weighed line, in kilograms
///
/// Counter scales top out far below this; the bound catches mistyped
/// manual entries (e.g. grams typed into the kilogram field).
pub const MAX_LINE_WEIGHT_KG: i64 = 50;
