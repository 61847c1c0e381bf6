//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Key Operations
//! - Substring search across code, name, barcode and category
//! - CRUD with soft delete (`deactivate`)
//! - Field validation before any write
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Catalog Search Works                             │
//! │                                                                         │
//! │  Operator types: "acai"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%acai%' across: name, code, barcode, category                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────┐                          │
//! │  │ ACAI-300 | Açaí 300ml       | acai        │ ← MATCH (code)           │
//! │  │ ACAI-KG  | Açaí no Peso     | acai        │ ← MATCH (code, category) │
//! │  │ MILK-400 | Milkshake 400ml  | milkshake   │                          │
//! │  └───────────────────────────────────────────┘                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Active products only, ordered by name                                  │
//! │                                                                         │
//! │  SQLite LIKE folds case for ASCII letters only: "MILKSHAKE" matches     │
//! │  "Milkshake", but accented characters must match exactly ("açaí"        │
//! │  matches "Açaí", "ACAI" does not).                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::parse_decimal_opt;
use polpa_core::provider::{CatalogProvider, ProviderResult};
use polpa_core::validation::validate_new_product;
use polpa_core::{NewProduct, Product, ProductCategory};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw products row. Money columns stay TEXT until parsed into Decimal.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    store_id: String,
    code: String,
    name: String,
    category: ProductCategory,
    is_weighable: bool,
    unit_price: Option<String>,
    price_per_gram: Option<String>,
    image_url: Option<String>,
    stock_quantity: i64,
    min_stock: i64,
    is_active: bool,
    barcode: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Product> {
        Ok(Product {
            unit_price: parse_decimal_opt(row.unit_price.as_deref(), "products.unit_price")?,
            price_per_gram: parse_decimal_opt(
                row.price_per_gram.as_deref(),
                "products.price_per_gram",
            )?,
            id: row.id,
            store_id: row.store_id,
            code: row.code,
            name: row.name,
            category: row.category,
            is_weighable: row.is_weighable,
            image_url: row.image_url,
            stock_quantity: row.stock_quantity,
            min_stock: row.min_stock,
            is_active: row.is_active,
            barcode: row.barcode,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Builds a `%...%` LIKE pattern with the wildcard characters escaped, so a
/// query containing `%` or `_` searches for those characters literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog operations, scoped to a single store.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products("loja1");
///
/// // Search the catalog
/// let hits = repo.search("açaí").await?;
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    store_id: String,
}

impl ProductRepository {
    /// Creates a new ProductRepository for the given store.
    pub fn new(pool: SqlitePool, store_id: String) -> Self {
        ProductRepository { pool, store_id }
    }

    /// Lists active products, ordered by name.
    ///
    /// This is what the catalog grid shows and what an empty search
    /// falls back to.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, store_id, code, name, category, is_weighable,
                   unit_price, price_per_gram, image_url, stock_quantity,
                   min_stock, is_active, barcode, description,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1 AND is_active = 1
            ORDER BY name
            "#,
        )
        .bind(&self.store_id)
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    /// Lists every product including deactivated ones, ordered by name.
    ///
    /// For the manager screen, where inactive products can be inspected
    /// and reactivated.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, store_id, code, name, category, is_weighable,
                   unit_price, price_per_gram, image_url, stock_quantity,
                   min_stock, is_active, barcode, description,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1
            ORDER BY name
            "#,
        )
        .bind(&self.store_id)
        .fetch_all(&self.pool)
        .await?;

        into_products(rows)
    }

    /// Searches active products by substring match.
    ///
    /// ## Behavior
    /// - Matches against name, code, barcode and category
    /// - ASCII case-insensitive (SQLite LIKE); accents match exactly
    /// - `%` / `_` in the query are treated literally
    /// - Empty or whitespace-only query returns the full active list
    ///
    /// ## Example
    /// ```rust,ignore
    /// let hits = repo.search("milkshake").await?;
    /// ```
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.list_active().await;
        }

        let pattern = like_pattern(query);

        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, store_id, code, name, category, is_weighable,
                   unit_price, price_per_gram, image_url, stock_quantity,
                   min_stock, is_active, barcode, description,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1
              AND is_active = 1
              AND (
                    name LIKE ?2 ESCAPE '\'
                 OR code LIKE ?2 ESCAPE '\'
                 OR barcode LIKE ?2 ESCAPE '\'
                 OR category LIKE ?2 ESCAPE '\'
              )
            ORDER BY name
            "#,
        )
        .bind(&self.store_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Search returned products");
        into_products(rows)
    }

    /// Gets a product by its ID.
    ///
    /// Returns inactive products too, so the manager screen can edit them.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, store_id, code, name, category, is_weighable,
                   unit_price, price_per_gram, image_url, stock_quantity,
                   min_stock, is_active, barcode, description,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1 AND id = ?2
            "#,
        )
        .bind(&self.store_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its operator-facing code (e.g., "ACAI-500").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, store_id, code, name, category, is_weighable,
                   unit_price, price_per_gram, image_url, stock_quantity,
                   min_stock, is_active, barcode, description,
                   created_at, updated_at
            FROM products
            WHERE store_id = ?1 AND code = ?2
            "#,
        )
        .bind(&self.store_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a new product.
    ///
    /// ## Behavior
    /// - Validates all fields first; nothing is written on rejection
    /// - Assigns the id (UUID v4) and both timestamps
    /// - Stores code and name trimmed
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product as persisted
    /// * `Err(DbError::Validation)` - A field was rejected
    /// * `Err(DbError::UniqueViolation)` - Code already exists in this store
    pub async fn insert(&self, new_product: &NewProduct) -> DbResult<Product> {
        validate_new_product(new_product)?;

        debug!(code = %new_product.code, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            store_id: self.store_id.clone(),
            code: new_product.code.trim().to_string(),
            name: new_product.name.trim().to_string(),
            category: new_product.category,
            is_weighable: new_product.is_weighable,
            unit_price: new_product.unit_price,
            price_per_gram: new_product.price_per_gram,
            image_url: new_product.image_url.clone(),
            stock_quantity: new_product.stock_quantity,
            min_stock: new_product.min_stock,
            is_active: new_product.is_active,
            barcode: new_product.barcode.clone(),
            description: new_product.description.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, code, name, category, is_weighable,
                unit_price, price_per_gram, image_url, stock_quantity,
                min_stock, is_active, barcode, description,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.category)
        .bind(product.is_weighable)
        .bind(product.unit_price.map(|d| d.to_string()))
        .bind(product.price_per_gram.map(|d| d.to_string()))
        .bind(&product.image_url)
        .bind(product.stock_quantity)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("product code", &product.code),
            other => other,
        })?;

        Ok(product)
    }

    /// Updates an existing product.
    ///
    /// Resubmits through the same field validation as creation, then
    /// replaces every editable column and bumps `updated_at`.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist in this store
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_new_product(&NewProduct::from(product))?;

        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?3,
                name = ?4,
                category = ?5,
                is_weighable = ?6,
                unit_price = ?7,
                price_per_gram = ?8,
                image_url = ?9,
                stock_quantity = ?10,
                min_stock = ?11,
                is_active = ?12,
                barcode = ?13,
                description = ?14,
                updated_at = ?15
            WHERE store_id = ?1 AND id = ?2
            "#,
        )
        .bind(&self.store_id)
        .bind(&product.id)
        .bind(product.code.trim())
        .bind(product.name.trim())
        .bind(product.category)
        .bind(product.is_weighable)
        .bind(product.unit_price.map(|d| d.to_string()))
        .bind(product.price_per_gram.map(|d| d.to_string()))
        .bind(&product.image_url)
        .bind(product.stock_quantity)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("product code", &product.code),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical sale items keep their frozen snapshot either way; the
    /// product just stops appearing in the catalog and in search.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?3
            WHERE store_id = ?1 AND id = ?2
            "#,
        )
        .bind(&self.store_id)
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products in this store (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE store_id = ?1 AND is_active = 1",
        )
        .bind(&self.store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Collaborator Trait
// =============================================================================

/// The terminal reaches the catalog through this trait; DbError details are
/// flattened into ProviderError at the boundary.
#[async_trait]
impl CatalogProvider for ProductRepository {
    async fn list_active_products(&self) -> ProviderResult<Vec<Product>> {
        Ok(self.list_active().await?)
    }

    async fn search_products(&self, query: &str) -> ProviderResult<Vec<Product>> {
        Ok(self.search(query).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal_macros::dec;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn acai_unit() -> NewProduct {
        NewProduct {
            code: "ACAI-500".to_string(),
            name: "Açaí 500ml".to_string(),
            category: ProductCategory::Acai,
            is_weighable: false,
            unit_price: Some(dec!(12.90)),
            price_per_gram: None,
            image_url: None,
            stock_quantity: 10,
            min_stock: 2,
            is_active: true,
            barcode: Some("7891234567890".to_string()),
            description: None,
        }
    }

    fn acai_by_weight() -> NewProduct {
        NewProduct {
            code: "ACAI-KG".to_string(),
            name: "Açaí no Peso".to_string(),
            category: ProductCategory::Acai,
            is_weighable: true,
            unit_price: None,
            price_per_gram: Some(dec!(0.04499)),
            image_url: None,
            stock_quantity: 0,
            min_stock: 0,
            is_active: true,
            barcode: None,
            description: None,
        }
    }

    fn milkshake() -> NewProduct {
        NewProduct {
            code: "MILK-400".to_string(),
            name: "Milkshake Morango".to_string(),
            category: ProductCategory::Milkshake,
            is_weighable: false,
            unit_price: Some(dec!(18.00)),
            price_per_gram: None,
            image_url: None,
            stock_quantity: 5,
            min_stock: 1,
            is_active: true,
            barcode: Some("7899990001112".to_string()),
            description: None,
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acai"), "%acai%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = test_db().await;
        let repo = db.products("loja1");

        let created = repo.insert(&acai_unit()).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.store_id, "loja1");

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.code, "ACAI-500");
        assert_eq!(fetched.name, "Açaí 500ml");
        assert_eq!(fetched.category, ProductCategory::Acai);
        assert_eq!(fetched.unit_price, Some(dec!(12.90)));
        assert_eq!(fetched.price_per_gram, None);

        let by_code = repo.get_by_code("ACAI-500").await.unwrap().unwrap();
        assert_eq!(by_code.id, created.id);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_weighed_price_round_trips_exactly() {
        let db = test_db().await;
        let repo = db.products("loja1");

        let created = repo.insert(&acai_by_weight()).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        // Sub-cent per-gram rate must survive storage without drift
        assert_eq!(fetched.price_per_gram, Some(dec!(0.04499)));
        assert!(fetched.is_weighable);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        let repo = db.products("loja1");

        repo.insert(&acai_unit()).await.unwrap();
        let err = repo.insert(&acai_unit()).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(err.to_string().contains("ACAI-500"));
    }

    #[tokio::test]
    async fn test_insert_validates_before_writing() {
        let db = test_db().await;
        let repo = db.products("loja1");

        // Unit-priced product without a unit price
        let mut broken = acai_unit();
        broken.unit_price = None;
        let err = repo.insert(&broken).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Nothing was written
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_matches_name_code_barcode() {
        let db = test_db().await;
        let repo = db.products("loja1");

        repo.insert(&acai_unit()).await.unwrap();
        repo.insert(&acai_by_weight()).await.unwrap();
        let shake = repo.insert(&milkshake()).await.unwrap();

        // ASCII letters fold case
        let hits = repo.search("MILKSHAKE").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "MILK-400");

        // Accented characters match exactly
        let hits = repo.search("açaí").await.unwrap();
        assert_eq!(hits.len(), 2);

        // Code match
        let hits = repo.search("acai-").await.unwrap();
        assert_eq!(hits.len(), 2);

        // Barcode match
        let hits = repo.search("789999").await.unwrap();
        assert_eq!(hits.len(), 1);

        // Literal wildcard finds nothing (no product contains '%')
        assert!(repo.search("%").await.unwrap().is_empty());

        // Empty query falls back to the active list, ordered by name
        let all = repo.search("   ").await.unwrap();
        let codes: Vec<&str> = all.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["ACAI-500", "ACAI-KG", "MILK-400"]);

        // Deactivated products disappear from search
        repo.deactivate(&shake.id).await.unwrap();
        assert!(repo.search("milkshake").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let repo = db.products("loja1");

        let mut product = repo.insert(&acai_unit()).await.unwrap();
        product.name = "Açaí 500ml com Granola".to_string();
        product.unit_price = Some(dec!(14.90));
        product.stock_quantity = 25;

        repo.update(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Açaí 500ml com Granola");
        assert_eq!(fetched.unit_price, Some(dec!(14.90)));
        assert_eq!(fetched.stock_quantity, 25);

        // Unknown id
        product.id = "missing".to_string();
        let err = repo.update(&product).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_fields() {
        let db = test_db().await;
        let repo = db.products("loja1");

        let mut product = repo.insert(&acai_unit()).await.unwrap();
        product.unit_price = Some(dec!(-1.00));

        let err = repo.update(&product).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Stored row untouched
        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.unit_price, Some(dec!(12.90)));
    }

    #[tokio::test]
    async fn test_deactivate_is_soft() {
        let db = test_db().await;
        let repo = db.products("loja1");

        let product = repo.insert(&acai_unit()).await.unwrap();
        repo.deactivate(&product.id).await.unwrap();

        assert!(repo.list_active().await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);

        // Still reachable by id for the manager screen
        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert!(!fetched.is_active);

        let err = repo.deactivate("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_store_scoping() {
        let db = test_db().await;
        let loja1 = db.products("loja1");
        let loja2 = db.products("loja2");

        // Same code in two stores is fine (unique per store)
        let p1 = loja1.insert(&acai_unit()).await.unwrap();
        loja2.insert(&acai_unit()).await.unwrap();

        assert_eq!(loja1.count().await.unwrap(), 1);
        assert_eq!(loja2.count().await.unwrap(), 1);

        // A loja1 product is invisible through the loja2 repository
        assert!(loja2.get_by_id(&p1.id).await.unwrap().is_none());
        let hits = loja2.search("açaí").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_ne!(hits[0].id, p1.id);
    }
}
