//! # Register Repository
//!
//! Cash-register sessions, cash movements, and the activity report.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Session Per Store At A Time                      │
//! │                                                                         │
//! │  open_session(operator, opening_amount)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────── OPEN ───────────────┐                                 │
//! │  │  sales attach to this session      │                                 │
//! │  │  record_movement(income | expense) │                                 │
//! │  └────────────────┬───────────────────┘                                 │
//! │                   │  close_session(id, closing_amount)                  │
//! │                   ▼                                                     │
//! │  ┌────────────── CLOSED ──────────────┐                                 │
//! │  │  expected = opening + cash sales   │                                 │
//! │  │             + income − expense     │                                 │
//! │  │  difference = closing − expected   │                                 │
//! │  └────────────────────────────────────┘                                 │
//! │                                                                         │
//! │  The difference row is how the manager spots a drawer that doesn't      │
//! │  add up at the end of a shift.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{parse_decimal, parse_decimal_opt};
use polpa_core::money::round_money;
use polpa_core::provider::{ProviderResult, RegisterProvider};
use polpa_core::validation::{validate_non_negative, validate_positive_amount};
use polpa_core::{
    CashRegister, MovementKind, Operator, PaymentMethod, RegisterMovement, RegisterSession,
};

// =============================================================================
// Report Types
// =============================================================================

/// Which sessions a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    All,
    Open,
    Closed,
}

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::All
    }
}

/// Filter for the register activity report.
///
/// The date range applies to `opened_at`: inclusive start, exclusive end,
/// so adjacent ranges never double-count a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub operator_id: Option<String>,
    pub status: ReportStatus,
}

impl ReportFilter {
    /// A filter over the given `opened_at` range, all operators and statuses.
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        ReportFilter {
            start,
            end,
            operator_id: None,
            status: ReportStatus::All,
        }
    }

    /// Restricts the report to sessions opened by one operator.
    pub fn operator(mut self, operator_id: impl Into<String>) -> Self {
        self.operator_id = Some(operator_id.into());
        self
    }

    /// Restricts the report by session status.
    pub fn status(mut self, status: ReportStatus) -> Self {
        self.status = status;
        self
    }
}

/// Cash aggregates for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSummary {
    /// All non-cancelled sales attached to the session.
    pub sales_total: Decimal,
    /// The cash-paid subset of `sales_total`.
    pub cash_sales_total: Decimal,
    /// Income movements recorded outside of sales.
    pub other_income_total: Decimal,
    /// Expense movements.
    pub total_expense: Decimal,
    /// opening + cash sales + income − expense.
    pub expected_balance: Decimal,
    /// closing − expected. Absent while the session is still open.
    pub difference: Option<Decimal>,
}

/// One report row: the session record plus its cash summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReportRow {
    pub register: CashRegister,
    pub summary: RegisterSummary,
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct RegisterRow {
    id: String,
    store_id: String,
    operator_id: Option<String>,
    operator_name: Option<String>,
    opening_amount: String,
    closing_amount: Option<String>,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl TryFrom<RegisterRow> for CashRegister {
    type Error = DbError;

    fn try_from(row: RegisterRow) -> DbResult<CashRegister> {
        Ok(CashRegister {
            opening_amount: parse_decimal(&row.opening_amount, "cash_registers.opening_amount")?,
            closing_amount: parse_decimal_opt(
                row.closing_amount.as_deref(),
                "cash_registers.closing_amount",
            )?,
            id: row.id,
            store_id: row.store_id,
            operator_id: row.operator_id,
            operator_name: row.operator_name,
            opened_at: row.opened_at,
            closed_at: row.closed_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MovementRow {
    id: String,
    register_id: String,
    kind: MovementKind,
    amount: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for RegisterMovement {
    type Error = DbError;

    fn try_from(row: MovementRow) -> DbResult<RegisterMovement> {
        Ok(RegisterMovement {
            amount: parse_decimal(&row.amount, "register_movements.amount")?,
            id: row.id,
            register_id: row.register_id,
            kind: row.kind,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for register sessions, scoped to a single store.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.registers("loja1");
///
/// let session = repo.open_session(Some(&operator), dec!(100.00)).await?;
/// repo.record_movement(&session.id, MovementKind::Expense, dec!(5.50), None).await?;
/// repo.close_session(&session.id, dec!(140.00)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
    store_id: String,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository for the given store.
    pub fn new(pool: SqlitePool, store_id: String) -> Self {
        RegisterRepository { pool, store_id }
    }

    /// Opens a new register session.
    ///
    /// ## Behavior
    /// - The opening amount is the cash float counted into the drawer
    /// - Fails with `Conflict` while another session is open for this store
    ///   (a partial unique index backstops check-then-insert races)
    ///
    /// ## Returns
    /// * `Ok(CashRegister)` - The open session as persisted
    /// * `Err(DbError::Validation)` - Negative opening amount
    /// * `Err(DbError::Conflict)` - A session is already open
    pub async fn open_session(
        &self,
        operator: Option<&Operator>,
        opening_amount: Decimal,
    ) -> DbResult<CashRegister> {
        validate_non_negative(opening_amount, "opening amount")?;

        if let Some(open) = self.find_open_session().await? {
            return Err(DbError::conflict(format!(
                "register session {} is still open",
                open.id
            )));
        }

        let register = CashRegister {
            id: Uuid::new_v4().to_string(),
            store_id: self.store_id.clone(),
            operator_id: operator.map(|o| o.id.clone()),
            operator_name: operator.map(|o| o.name.clone()),
            opening_amount: round_money(opening_amount),
            closing_amount: None,
            opened_at: Utc::now(),
            closed_at: None,
        };

        debug!(
            id = %register.id,
            opening = %register.opening_amount,
            "Opening register session"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_registers (
                id, store_id, operator_id, operator_name,
                opening_amount, closing_amount, opened_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&register.id)
        .bind(&register.store_id)
        .bind(&register.operator_id)
        .bind(&register.operator_name)
        .bind(register.opening_amount.to_string())
        .bind(register.closing_amount.map(|d| d.to_string()))
        .bind(register.opened_at)
        .bind(register.closed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::conflict("store already has an open register session")
            }
            other => other,
        })?;

        Ok(register)
    }

    /// The store's most recent session, open or closed.
    ///
    /// Callers that need "open only" check `is_open()` on the result; this
    /// is exactly what the finalizer does through the provider trait.
    pub async fn current_session(&self) -> DbResult<Option<CashRegister>> {
        let row = sqlx::query_as::<_, RegisterRow>(
            r#"
            SELECT id, store_id, operator_id, operator_name,
                   opening_amount, closing_amount, opened_at, closed_at
            FROM cash_registers
            WHERE store_id = ?1
            ORDER BY opened_at DESC
            LIMIT 1
            "#,
        )
        .bind(&self.store_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CashRegister::try_from).transpose()
    }

    /// Gets a session by id.
    pub async fn get_by_id(&self, register_id: &str) -> DbResult<Option<CashRegister>> {
        let row = sqlx::query_as::<_, RegisterRow>(
            r#"
            SELECT id, store_id, operator_id, operator_name,
                   opening_amount, closing_amount, opened_at, closed_at
            FROM cash_registers
            WHERE store_id = ?1 AND id = ?2
            "#,
        )
        .bind(&self.store_id)
        .bind(register_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CashRegister::try_from).transpose()
    }

    /// Closes an open session, stamping the counted closing amount.
    ///
    /// ## Returns
    /// * `Ok(CashRegister)` - The session with `closed_at` set
    /// * `Err(DbError::NotFound)` - Unknown session id
    /// * `Err(DbError::Conflict)` - Session is already closed
    pub async fn close_session(
        &self,
        register_id: &str,
        closing_amount: Decimal,
    ) -> DbResult<CashRegister> {
        validate_non_negative(closing_amount, "closing amount")?;

        let mut register = self
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| DbError::not_found("Register session", register_id))?;

        if !register.is_open() {
            return Err(DbError::conflict("register session is already closed"));
        }

        let closing = round_money(closing_amount);
        let closed_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE cash_registers
            SET closing_amount = ?3, closed_at = ?4
            WHERE store_id = ?1 AND id = ?2 AND closed_at IS NULL
            "#,
        )
        .bind(&self.store_id)
        .bind(register_id)
        .bind(closing.to_string())
        .bind(closed_at)
        .execute(&self.pool)
        .await?;

        // The closed_at IS NULL guard catches a close that raced this one
        if result.rows_affected() == 0 {
            return Err(DbError::conflict("register session is already closed"));
        }

        register.closing_amount = Some(closing);
        register.closed_at = Some(closed_at);

        debug!(id = %register.id, closing = %closing, "Closed register session");

        Ok(register)
    }

    /// Records a cash movement (income or expense) against an open session.
    ///
    /// ## Returns
    /// * `Ok(RegisterMovement)` - The movement as persisted
    /// * `Err(DbError::Validation)` - Amount is zero or negative
    /// * `Err(DbError::NotFound)` - Unknown session id
    /// * `Err(DbError::Conflict)` - Session is closed
    pub async fn record_movement(
        &self,
        register_id: &str,
        kind: MovementKind,
        amount: Decimal,
        description: Option<String>,
    ) -> DbResult<RegisterMovement> {
        validate_positive_amount(amount, "amount")?;

        let register = self
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| DbError::not_found("Register session", register_id))?;

        if !register.is_open() {
            return Err(DbError::conflict("register session is closed"));
        }

        let movement = RegisterMovement {
            id: Uuid::new_v4().to_string(),
            register_id: register.id,
            kind,
            amount: round_money(amount),
            description,
            created_at: Utc::now(),
        };

        debug!(
            register_id = %movement.register_id,
            kind = ?movement.kind,
            amount = %movement.amount,
            "Recording register movement"
        );

        sqlx::query(
            r#"
            INSERT INTO register_movements (
                id, register_id, kind, amount, description, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.register_id)
        .bind(movement.kind)
        .bind(movement.amount.to_string())
        .bind(&movement.description)
        .bind(movement.created_at)
        .execute(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Lists a session's movements in the order they were recorded.
    pub async fn movements(&self, register_id: &str) -> DbResult<Vec<RegisterMovement>> {
        // Resolve through the store scope first so a foreign session id
        // reads as NotFound rather than leaking another store's rows.
        let register = self
            .get_by_id(register_id)
            .await?
            .ok_or_else(|| DbError::not_found("Register session", register_id))?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, register_id, kind, amount, description, created_at
            FROM register_movements
            WHERE register_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(&register.id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RegisterMovement::try_from).collect()
    }

    /// Builds the register activity report.
    ///
    /// ## Behavior
    /// - Date range applies to `opened_at`: inclusive start, exclusive end
    /// - Optional operator and status filters
    /// - Rows come back most-recently-opened first
    /// - Each row carries the session plus its cash summary; `difference`
    ///   is present only for closed sessions
    pub async fn report(&self, filter: &ReportFilter) -> DbResult<Vec<RegisterReportRow>> {
        let status = match filter.status {
            ReportStatus::All => "all",
            ReportStatus::Open => "open",
            ReportStatus::Closed => "closed",
        };

        let rows = sqlx::query_as::<_, RegisterRow>(
            r#"
            SELECT id, store_id, operator_id, operator_name,
                   opening_amount, closing_amount, opened_at, closed_at
            FROM cash_registers
            WHERE store_id = ?1
              AND opened_at >= ?2
              AND opened_at < ?3
              AND (?4 IS NULL OR operator_id = ?4)
              AND (
                    ?5 = 'all'
                 OR (?5 = 'open' AND closed_at IS NULL)
                 OR (?5 = 'closed' AND closed_at IS NOT NULL)
              )
            ORDER BY opened_at DESC
            "#,
        )
        .bind(&self.store_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(&filter.operator_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        let mut report = Vec::with_capacity(rows.len());
        for row in rows {
            let register = CashRegister::try_from(row)?;
            let summary = self.summarize(&register).await?;
            report.push(RegisterReportRow { register, summary });
        }

        debug!(rows = report.len(), "Built register report");
        Ok(report)
    }

    /// Aggregates sales and movements for one session.
    ///
    /// Sums run over exact decimals in Rust; SQLite SUM over TEXT would
    /// silently fall back to float arithmetic.
    async fn summarize(&self, register: &CashRegister) -> DbResult<RegisterSummary> {
        let sales = sqlx::query_as::<_, (String, PaymentMethod)>(
            r#"
            SELECT total_amount, payment_type
            FROM sales
            WHERE register_id = ?1 AND is_cancelled = 0
            "#,
        )
        .bind(&register.id)
        .fetch_all(&self.pool)
        .await?;

        let mut sales_total = Decimal::ZERO;
        let mut cash_sales_total = Decimal::ZERO;
        for (amount, method) in &sales {
            let amount = parse_decimal(amount, "sales.total_amount")?;
            sales_total += amount;
            if method.is_cash() {
                cash_sales_total += amount;
            }
        }

        let movements = sqlx::query_as::<_, (MovementKind, String)>(
            r#"
            SELECT kind, amount
            FROM register_movements
            WHERE register_id = ?1
            "#,
        )
        .bind(&register.id)
        .fetch_all(&self.pool)
        .await?;

        let mut other_income_total = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        for (kind, amount) in &movements {
            let amount = parse_decimal(amount, "register_movements.amount")?;
            match kind {
                MovementKind::Income => other_income_total += amount,
                MovementKind::Expense => total_expense += amount,
            }
        }

        let expected_balance =
            register.opening_amount + cash_sales_total + other_income_total - total_expense;
        let difference = register.closing_amount.map(|closing| closing - expected_balance);

        Ok(RegisterSummary {
            sales_total,
            cash_sales_total,
            other_income_total,
            total_expense,
            expected_balance,
            difference,
        })
    }

    async fn find_open_session(&self) -> DbResult<Option<CashRegister>> {
        let row = sqlx::query_as::<_, RegisterRow>(
            r#"
            SELECT id, store_id, operator_id, operator_name,
                   opening_amount, closing_amount, opened_at, closed_at
            FROM cash_registers
            WHERE store_id = ?1 AND closed_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(&self.store_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CashRegister::try_from).transpose()
    }
}

// =============================================================================
// Collaborator Trait
// =============================================================================

/// The finalizer only needs "is there a session, and is it open"; the full
/// record stays behind the repository methods.
#[async_trait]
impl RegisterProvider for RegisterRepository {
    async fn current_session(&self) -> ProviderResult<Option<RegisterSession>> {
        let session = RegisterRepository::current_session(self).await?;
        Ok(session.map(|register| register.session()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use polpa_core::SaleDraft;
    use rust_decimal_macros::dec;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn maria() -> Operator {
        Operator {
            id: "op-maria".to_string(),
            name: "Maria".to_string(),
        }
    }

    fn joao() -> Operator {
        Operator {
            id: "op-joao".to_string(),
            name: "João".to_string(),
        }
    }

    /// Minimal draft for report aggregation; item snapshots are covered by
    /// the sale repository tests.
    fn draft(register_id: &str, method: PaymentMethod, total: Decimal) -> SaleDraft {
        SaleDraft {
            register_id: register_id.to_string(),
            operator_id: "op-maria".to_string(),
            operator_name: "Maria".to_string(),
            customer_name: None,
            customer_phone: None,
            subtotal: total,
            discount_amount: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
            total_amount: total,
            payment_type: method,
            change_amount: Decimal::ZERO,
            notes: None,
            items: vec![],
        }
    }

    fn row_ids(rows: &[RegisterReportRow]) -> Vec<String> {
        rows.iter().map(|r| r.register.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let db = test_db().await;
        let repo = db.registers("loja1");

        assert!(repo.current_session().await.unwrap().is_none());

        let operator = maria();
        let session = repo
            .open_session(Some(&operator), dec!(100.00))
            .await
            .unwrap();
        assert!(session.is_open());
        assert_eq!(session.opening_amount, dec!(100.00));
        assert_eq!(session.operator_id.as_deref(), Some("op-maria"));

        let current = repo.current_session().await.unwrap().unwrap();
        assert_eq!(current.id, session.id);
        assert!(current.is_open());

        let closed = repo.close_session(&session.id, dec!(142.50)).await.unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.closing_amount, Some(dec!(142.50)));

        // Most recent session is still returned after close
        let current = repo.current_session().await.unwrap().unwrap();
        assert_eq!(current.id, session.id);
        assert!(!current.is_open());

        // The finalizer's trait view carries the open flag
        let view = RegisterProvider::current_session(&repo).await.unwrap().unwrap();
        assert_eq!(view.id, session.id);
        assert!(!view.is_open);
    }

    #[tokio::test]
    async fn test_single_open_session_per_store() {
        let db = test_db().await;
        let repo = db.registers("loja1");

        let session = repo.open_session(None, dec!(50)).await.unwrap();

        let err = repo.open_session(None, dec!(80)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        // Another store is unaffected
        db.registers("loja2")
            .open_session(None, dec!(80))
            .await
            .unwrap();

        // After closing, the store can open again
        repo.close_session(&session.id, dec!(50)).await.unwrap();
        repo.open_session(None, dec!(60)).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_rejections() {
        let db = test_db().await;
        let repo = db.registers("loja1");

        let err = repo.close_session("missing", dec!(10)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let session = repo.open_session(None, dec!(50)).await.unwrap();
        repo.close_session(&session.id, dec!(50)).await.unwrap();

        let err = repo.close_session(&session.id, dec!(50)).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        let err = repo.open_session(None, dec!(-1)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_record_movement() {
        let db = test_db().await;
        let repo = db.registers("loja1");
        let session = repo.open_session(None, dec!(100)).await.unwrap();

        let income = repo
            .record_movement(
                &session.id,
                MovementKind::Income,
                dec!(10.00),
                Some("troco extra".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(income.amount, dec!(10.00));

        repo.record_movement(&session.id, MovementKind::Expense, dec!(5.50), None)
            .await
            .unwrap();

        let movements = repo.movements(&session.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].kind, MovementKind::Income);
        assert_eq!(movements[1].kind, MovementKind::Expense);

        // Non-positive amounts are rejected
        let err = repo
            .record_movement(&session.id, MovementKind::Income, Decimal::ZERO, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Unknown session
        let err = repo
            .record_movement("missing", MovementKind::Income, dec!(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // Closed session
        repo.close_session(&session.id, dec!(104.50)).await.unwrap();
        let err = repo
            .record_movement(&session.id, MovementKind::Income, dec!(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_report_summarizes_a_shift() {
        let db = test_db().await;
        let registers = db.registers("loja1");
        let sales = db.sales("loja1");

        let operator = maria();
        let session = registers
            .open_session(Some(&operator), dec!(100.00))
            .await
            .unwrap();

        sales
            .create_sale(&draft(&session.id, PaymentMethod::Cash, dec!(35.37)))
            .await
            .unwrap();
        sales
            .create_sale(&draft(&session.id, PaymentMethod::Pix, dec!(20.00)))
            .await
            .unwrap();

        registers
            .record_movement(
                &session.id,
                MovementKind::Income,
                dec!(10.00),
                Some("troco extra".to_string()),
            )
            .await
            .unwrap();
        registers
            .record_movement(
                &session.id,
                MovementKind::Expense,
                dec!(5.50),
                Some("gelo".to_string()),
            )
            .await
            .unwrap();

        let closed = registers
            .close_session(&session.id, dec!(140.00))
            .await
            .unwrap();

        let filter = ReportFilter::range(
            closed.opened_at - Duration::hours(1),
            closed.opened_at + Duration::hours(1),
        );
        let report = registers.report(&filter).await.unwrap();
        assert_eq!(report.len(), 1);

        let summary = &report[0].summary;
        assert_eq!(summary.sales_total, dec!(55.37));
        assert_eq!(summary.cash_sales_total, dec!(35.37));
        assert_eq!(summary.other_income_total, dec!(10.00));
        assert_eq!(summary.total_expense, dec!(5.50));
        // 100.00 + 35.37 + 10.00 - 5.50
        assert_eq!(summary.expected_balance, dec!(139.87));
        // Drawer was counted at 140.00: 0.13 over
        assert_eq!(summary.difference, Some(dec!(0.13)));
    }

    #[tokio::test]
    async fn test_report_filters_and_ordering() {
        let db = test_db().await;
        let repo = db.registers("loja1");

        let a = repo.open_session(Some(&maria()), dec!(50)).await.unwrap();
        repo.close_session(&a.id, dec!(50)).await.unwrap();
        let b = repo.open_session(Some(&joao()), dec!(80)).await.unwrap();

        let full = ReportFilter::range(
            a.opened_at - Duration::hours(1),
            b.opened_at + Duration::hours(1),
        );

        // Most recently opened first
        let rows = repo.report(&full).await.unwrap();
        assert_eq!(row_ids(&rows), vec![b.id.clone(), a.id.clone()]);

        // Status filters
        let open_rows = repo
            .report(&full.clone().status(ReportStatus::Open))
            .await
            .unwrap();
        assert_eq!(row_ids(&open_rows), vec![b.id.clone()]);
        assert!(open_rows[0].summary.difference.is_none());
        assert_eq!(open_rows[0].summary.expected_balance, dec!(80));

        let closed_rows = repo
            .report(&full.clone().status(ReportStatus::Closed))
            .await
            .unwrap();
        assert_eq!(row_ids(&closed_rows), vec![a.id.clone()]);
        assert_eq!(closed_rows[0].summary.difference, Some(dec!(0)));

        // Operator filter
        let marias = repo
            .report(&full.clone().operator("op-maria"))
            .await
            .unwrap();
        assert_eq!(row_ids(&marias), vec![a.id.clone()]);

        // Exclusive end: a range ending exactly at B's opened_at excludes B
        let up_to_b = ReportFilter::range(a.opened_at - Duration::hours(1), b.opened_at);
        assert_eq!(row_ids(&repo.report(&up_to_b).await.unwrap()), vec![a.id]);
    }
}
