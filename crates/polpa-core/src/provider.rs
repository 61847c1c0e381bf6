//! # Collaborator Interfaces
//!
//! The external collaborators the engine depends on, as object-safe async
//! traits. polpa-db implements them against SQLite; tests substitute
//! in-memory fakes. The engine never sees a connection pool or a table.

use async_trait::async_trait;

use crate::checkout::SaleDraft;
use crate::error::ProviderError;
use crate::types::{Product, RegisterSession, Sale};

/// Result type for collaborator calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Read side of the product catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All active products of the store, in name order.
    async fn list_active_products(&self) -> ProviderResult<Vec<Product>>;

    /// Active products matching a case-insensitive substring of name, code,
    /// barcode, or category.
    async fn search_products(&self, query: &str) -> ProviderResult<Vec<Product>>;
}

/// Read side of the cash-register lifecycle. The engine only ever asks
/// whether a session is open and which id a sale should attach to.
#[async_trait]
pub trait RegisterProvider: Send + Sync {
    /// The store's most recent register session, if any.
    async fn current_session(&self) -> ProviderResult<Option<RegisterSession>>;
}

/// Write side of sale persistence.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Persists a finalized sale and its line items atomically, assigning
    /// the id, the per-store sequence number, and the creation timestamp.
    async fn create_sale(&self, draft: SaleDraft) -> ProviderResult<Sale>;
}
