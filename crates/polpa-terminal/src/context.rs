//! # Store Context
//!
//! Binds one terminal to one store: the store's channel tag plus the three
//! collaborator providers, held as trait objects so tests and alternative
//! backends can inject their own.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StoreContext                                    │
//! │                                                                         │
//! │   store_id: "loja1"                                                     │
//! │                                                                         │
//! │   catalog ────► Arc<dyn CatalogProvider>  ──┐                           │
//! │   registers ──► Arc<dyn RegisterProvider> ──┼── sqlite(): the polpa-db  │
//! │   sales ──────► Arc<dyn SaleStore>        ──┘   repositories, scoped    │
//! │                                                 to the same store       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every terminal on the same store may share one `StoreContext` clone; the
//! providers are stateless handles over the connection pool.

use std::fmt;
use std::sync::Arc;

use polpa_core::{CatalogProvider, RegisterProvider, SaleStore};
use polpa_db::Database;

/// The store binding a terminal operates under.
#[derive(Clone)]
pub struct StoreContext {
    /// Store (channel tag) all provider calls are scoped to.
    pub store_id: String,

    /// Catalog reads (listing, search).
    pub catalog: Arc<dyn CatalogProvider>,

    /// Register-session lookups.
    pub registers: Arc<dyn RegisterProvider>,

    /// Sale persistence.
    pub sales: Arc<dyn SaleStore>,
}

impl StoreContext {
    /// Creates a context from explicitly injected providers.
    pub fn new(
        store_id: impl Into<String>,
        catalog: Arc<dyn CatalogProvider>,
        registers: Arc<dyn RegisterProvider>,
        sales: Arc<dyn SaleStore>,
    ) -> Self {
        StoreContext {
            store_id: store_id.into(),
            catalog,
            registers,
            sales,
        }
    }

    /// Wires the context to the SQLite repositories of `db`, all scoped to
    /// the given store.
    pub fn sqlite(db: &Database, store_id: impl Into<String>) -> Self {
        let store_id = store_id.into();
        StoreContext {
            catalog: Arc::new(db.products(store_id.as_str())),
            registers: Arc::new(db.registers(store_id.as_str())),
            sales: Arc::new(db.sales(store_id.as_str())),
            store_id,
        }
    }
}

impl fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreContext")
            .field("store_id", &self.store_id)
            .finish_non_exhaustive()
    }
}
