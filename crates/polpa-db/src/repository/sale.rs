//! # Sale Repository
//!
//! Persistence for finalized sales and their line snapshots.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       From Draft To Record                              │
//! │                                                                         │
//! │  build_sale_draft (polpa-core, pure)                                    │
//! │       │                                                                 │
//! │       │ SaleDraft (validated totals + frozen line snapshots)            │
//! │       ▼                                                                 │
//! │  create_sale (THIS MODULE) — one transaction:                           │
//! │    1. sale_number ← MAX(sale_number) + 1 for this store                 │
//! │    2. INSERT the sales row                                              │
//! │    3. INSERT sale_items rows with item_no 1..n (cart order)             │
//! │       │                                                                 │
//! │       │ commit (all-or-nothing: a failed item insert rolls              │
//! │       │         back the sale and releases the number)                  │
//! │       ▼                                                                 │
//! │  Sale { id, sale_number, items } — immutable from here on               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{parse_decimal, parse_decimal_opt};
use polpa_core::provider::{ProviderResult, SaleStore};
use polpa_core::{PaymentMethod, Sale, SaleDraft, SaleItem};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    store_id: String,
    sale_number: i64,
    register_id: String,
    operator_id: String,
    operator_name: String,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    subtotal: String,
    discount_amount: String,
    discount_percentage: String,
    total_amount: String,
    payment_type: PaymentMethod,
    change_amount: String,
    notes: Option<String>,
    is_cancelled: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    /// Items are loaded separately; this maps the header row only.
    fn try_from(row: SaleRow) -> DbResult<Sale> {
        Ok(Sale {
            subtotal: parse_decimal(&row.subtotal, "sales.subtotal")?,
            discount_amount: parse_decimal(&row.discount_amount, "sales.discount_amount")?,
            discount_percentage: parse_decimal(
                &row.discount_percentage,
                "sales.discount_percentage",
            )?,
            total_amount: parse_decimal(&row.total_amount, "sales.total_amount")?,
            change_amount: parse_decimal(&row.change_amount, "sales.change_amount")?,
            id: row.id,
            sale_number: row.sale_number,
            store_id: row.store_id,
            register_id: row.register_id,
            operator_id: row.operator_id,
            operator_name: row.operator_name,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            payment_type: row.payment_type,
            notes: row.notes,
            is_cancelled: row.is_cancelled,
            created_at: row.created_at,
            items: Vec::new(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    product_id: String,
    product_code: String,
    product_name: String,
    quantity: i64,
    weight_kg: Option<String>,
    unit_price: String,
    price_per_gram: Option<String>,
    discount_amount: String,
    subtotal: String,
}

impl TryFrom<SaleItemRow> for SaleItem {
    type Error = DbError;

    fn try_from(row: SaleItemRow) -> DbResult<SaleItem> {
        Ok(SaleItem {
            weight_kg: parse_decimal_opt(row.weight_kg.as_deref(), "sale_items.weight_kg")?,
            unit_price: parse_decimal(&row.unit_price, "sale_items.unit_price")?,
            price_per_gram: parse_decimal_opt(
                row.price_per_gram.as_deref(),
                "sale_items.price_per_gram",
            )?,
            discount_amount: parse_decimal(&row.discount_amount, "sale_items.discount_amount")?,
            subtotal: parse_decimal(&row.subtotal, "sale_items.subtotal")?,
            product_id: row.product_id,
            product_code: row.product_code,
            product_name: row.product_name,
            quantity: row.quantity,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale persistence, scoped to a single store.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    store_id: String,
}

impl SaleRepository {
    /// Creates a new SaleRepository for the given store.
    pub fn new(pool: SqlitePool, store_id: String) -> Self {
        SaleRepository { pool, store_id }
    }

    /// Persists a finalized sale draft in a single transaction.
    ///
    /// ## Behavior
    /// - Assigns the sale id (UUID v4) and this store's next `sale_number`
    ///   (receipts count 1, 2, 3… per store, independent across stores)
    /// - Inserts line snapshots in cart order with `item_no` 1..n
    /// - Atomic: if any insert fails, nothing is persisted and the sequence
    ///   number is released with the rollback
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The immutable sale record as persisted
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown register session
    pub async fn create_sale(&self, draft: &SaleDraft) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;

        // MAX+1 inside the transaction; UNIQUE(store_id, sale_number) turns
        // a lost race into an error instead of a duplicated receipt number
        let sale_number: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sale_number), 0) + 1 FROM sales WHERE store_id = ?1",
        )
        .bind(&self.store_id)
        .fetch_one(&mut *tx)
        .await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number,
            store_id: self.store_id.clone(),
            register_id: draft.register_id.clone(),
            operator_id: draft.operator_id.clone(),
            operator_name: draft.operator_name.clone(),
            customer_name: draft.customer_name.clone(),
            customer_phone: draft.customer_phone.clone(),
            subtotal: draft.subtotal,
            discount_amount: draft.discount_amount,
            discount_percentage: draft.discount_percentage,
            total_amount: draft.total_amount,
            payment_type: draft.payment_type,
            change_amount: draft.change_amount,
            notes: draft.notes.clone(),
            is_cancelled: false,
            created_at: Utc::now(),
            items: draft.items.clone(),
        };

        debug!(
            id = %sale.id,
            number = sale.sale_number,
            total = %sale.total_amount,
            "Creating sale"
        );

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, store_id, sale_number, register_id,
                operator_id, operator_name, customer_name, customer_phone,
                subtotal, discount_amount, discount_percentage, total_amount,
                payment_type, change_amount, notes, is_cancelled, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.store_id)
        .bind(sale.sale_number)
        .bind(&sale.register_id)
        .bind(&sale.operator_id)
        .bind(&sale.operator_name)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(sale.subtotal.to_string())
        .bind(sale.discount_amount.to_string())
        .bind(sale.discount_percentage.to_string())
        .bind(sale.total_amount.to_string())
        .bind(sale.payment_type)
        .bind(sale.change_amount.to_string())
        .bind(&sale.notes)
        .bind(sale.is_cancelled)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for (idx, item) in sale.items.iter().enumerate() {
            let item_no = idx as i64 + 1;

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, item_no, product_id, product_code, product_name,
                    quantity, weight_kg, unit_price, price_per_gram,
                    discount_amount, subtotal
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6,
                    ?7, ?8, ?9, ?10,
                    ?11, ?12
                )
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(item_no)
            .bind(&item.product_id)
            .bind(&item.product_code)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.weight_kg.map(|w| w.to_string()))
            .bind(item.unit_price.to_string())
            .bind(item.price_per_gram.map(|p| p.to_string()))
            .bind(item.discount_amount.to_string())
            .bind(item.subtotal.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(sale)
    }

    /// Gets a sale with its line snapshots.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, store_id, sale_number, register_id,
                   operator_id, operator_name, customer_name, customer_phone,
                   subtotal, discount_amount, discount_percentage, total_amount,
                   payment_type, change_amount, notes, is_cancelled, created_at
            FROM sales
            WHERE store_id = ?1 AND id = ?2
            "#,
        )
        .bind(&self.store_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let mut sale = Sale::try_from(row)?;
                sale.items = self.items_for(&sale.id).await?;
                Ok(Some(sale))
            }
        }
    }

    /// Lists the store's most recent sales, newest first, items included.
    ///
    /// Backs the receipt-history screen; `limit` keeps it bounded.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, store_id, sale_number, register_id,
                   operator_id, operator_name, customer_name, customer_phone,
                   subtotal, discount_amount, discount_percentage, total_amount,
                   payment_type, change_amount, notes, is_cancelled, created_at
            FROM sales
            WHERE store_id = ?1
            ORDER BY created_at DESC, sale_number DESC
            LIMIT ?2
            "#,
        )
        .bind(&self.store_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let mut sale = Sale::try_from(row)?;
            sale.items = self.items_for(&sale.id).await?;
            sales.push(sale);
        }

        Ok(sales)
    }

    /// Line snapshots in cart order.
    async fn items_for(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT product_id, product_code, product_name,
                   quantity, weight_kg, unit_price, price_per_gram,
                   discount_amount, subtotal
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY item_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleItem::try_from).collect()
    }
}

// =============================================================================
// Collaborator Trait
// =============================================================================

#[async_trait::async_trait]
impl SaleStore for SaleRepository {
    async fn create_sale(&self, draft: SaleDraft) -> ProviderResult<Sale> {
        Ok(SaleRepository::create_sale(self, &draft).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn open_register(db: &Database, store_id: &str) -> String {
        db.registers(store_id)
            .open_session(None, dec!(100.00))
            .await
            .unwrap()
            .id
    }

    /// The worked example: two unit açaís, one 300g weighing, 10% off,
    /// cash with R$ 50 tendered.
    fn scenario_draft(register_id: &str) -> SaleDraft {
        SaleDraft {
            register_id: register_id.to_string(),
            operator_id: "op-maria".to_string(),
            operator_name: "Maria".to_string(),
            customer_name: Some("Ana".to_string()),
            customer_phone: Some("11 99999-0000".to_string()),
            subtotal: dec!(39.30),
            discount_amount: dec!(3.93),
            discount_percentage: dec!(10),
            total_amount: dec!(35.37),
            payment_type: PaymentMethod::Cash,
            change_amount: dec!(14.63),
            notes: Some("sem granola".to_string()),
            items: vec![
                SaleItem {
                    product_id: "p-acai-500".to_string(),
                    product_code: "ACAI-500".to_string(),
                    product_name: "Açaí 500ml".to_string(),
                    quantity: 2,
                    weight_kg: None,
                    unit_price: dec!(12.90),
                    price_per_gram: None,
                    discount_amount: Decimal::ZERO,
                    subtotal: dec!(25.80),
                },
                SaleItem {
                    product_id: "p-acai-kg".to_string(),
                    product_code: "ACAI-KG".to_string(),
                    product_name: "Açaí no Peso".to_string(),
                    quantity: 1,
                    weight_kg: Some(dec!(0.300)),
                    unit_price: dec!(44.99),
                    price_per_gram: Some(dec!(0.04499)),
                    discount_amount: Decimal::ZERO,
                    subtotal: dec!(13.50),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_round_trip() {
        let db = test_db().await;
        let register_id = open_register(&db, "loja1").await;
        let repo = db.sales("loja1");

        let created = repo.create_sale(&scenario_draft(&register_id)).await.unwrap();
        assert_eq!(created.sale_number, 1);
        assert!(!created.is_cancelled);

        let sale = repo.get_with_items(&created.id).await.unwrap().unwrap();
        assert_eq!(sale.sale_number, 1);
        assert_eq!(sale.register_id, register_id);
        assert_eq!(sale.subtotal, dec!(39.30));
        assert_eq!(sale.discount_amount, dec!(3.93));
        assert_eq!(sale.discount_percentage, dec!(10));
        assert_eq!(sale.total_amount, dec!(35.37));
        assert_eq!(sale.payment_type, PaymentMethod::Cash);
        assert_eq!(sale.change_amount, dec!(14.63));
        assert_eq!(sale.customer_name.as_deref(), Some("Ana"));
        assert_eq!(sale.notes.as_deref(), Some("sem granola"));

        // Line snapshots come back in cart order, exact to the digit
        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items[0].product_code, "ACAI-500");
        assert_eq!(sale.items[0].quantity, 2);
        assert_eq!(sale.items[0].subtotal, dec!(25.80));
        assert_eq!(sale.items[1].product_code, "ACAI-KG");
        assert_eq!(sale.items[1].weight_kg, Some(dec!(0.300)));
        assert_eq!(sale.items[1].price_per_gram, Some(dec!(0.04499)));
        assert_eq!(sale.items[1].unit_price, dec!(44.99));
        assert_eq!(sale.items[1].subtotal, dec!(13.50));
    }

    #[tokio::test]
    async fn test_sequence_is_per_store() {
        let db = test_db().await;
        let loja1_register = open_register(&db, "loja1").await;
        let loja2_register = open_register(&db, "loja2").await;

        let loja1 = db.sales("loja1");
        let loja2 = db.sales("loja2");

        let first = loja1.create_sale(&scenario_draft(&loja1_register)).await.unwrap();
        let second = loja1.create_sale(&scenario_draft(&loja1_register)).await.unwrap();
        assert_eq!(first.sale_number, 1);
        assert_eq!(second.sale_number, 2);

        // The other store starts its own count
        let other = loja2.create_sale(&scenario_draft(&loja2_register)).await.unwrap();
        assert_eq!(other.sale_number, 1);
    }

    #[tokio::test]
    async fn test_unknown_register_rejected_atomically() {
        let db = test_db().await;
        let repo = db.sales("loja1");

        let err = repo
            .create_sale(&scenario_draft("no-such-register"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // Rollback: no sale row, and the next successful sale is number 1
        let register_id = open_register(&db, "loja1").await;
        let sale = repo.create_sale(&scenario_draft(&register_id)).await.unwrap();
        assert_eq!(sale.sale_number, 1);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let db = test_db().await;
        let register_id = open_register(&db, "loja1").await;
        let repo = db.sales("loja1");

        for _ in 0..3 {
            repo.create_sale(&scenario_draft(&register_id)).await.unwrap();
        }

        let recent = repo.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sale_number, 3);
        assert_eq!(recent[1].sale_number, 2);
        // Items ride along for receipt redisplay
        assert_eq!(recent[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_store_scoping() {
        let db = test_db().await;
        let register_id = open_register(&db, "loja1").await;

        let sale = db
            .sales("loja1")
            .create_sale(&scenario_draft(&register_id))
            .await
            .unwrap();

        assert!(db
            .sales("loja2")
            .get_with_items(&sale.id)
            .await
            .unwrap()
            .is_none());
        assert!(db.sales("loja2").list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sale_store_trait_delegates() {
        let db = test_db().await;
        let register_id = open_register(&db, "loja1").await;
        let repo = db.sales("loja1");

        let sale = SaleStore::create_sale(&repo, scenario_draft(&register_id))
            .await
            .unwrap();
        assert_eq!(sale.sale_number, 1);
    }
}
