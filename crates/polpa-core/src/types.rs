//! # Domain Types
//!
//! Core domain types used throughout Polpa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  CashRegister   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  sale_number    │   │  opening_amount │       │
//! │  │  is_weighable   │   │  total_amount   │   │  closed_at?     │       │
//! │  │  unit_price /   │   │  change_amount  │   │  (open = NULL)  │       │
//! │  │  price_per_gram │   │  items[]        │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductCategory │   │  PaymentMethod  │   │  DiscountSpec   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  acai, sorvetes │   │  cash, pix,     │   │  none | flat |  │       │
//! │  │  bebidas, ...   │   │  cards, mixed   │   │  percentage     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (code, sale_number, etc.) - human-readable, shown to operators

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money;

// =============================================================================
// Product Category
// =============================================================================

/// Product taxonomy, as it appears in the catalog data.
///
/// Category names are the Portuguese ones the business actually uses;
/// they double as the stored TEXT values.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Acai,
    Combo,
    Milkshake,
    Vitamina,
    Sorvetes,
    Bebidas,
    Complementos,
    Sobremesas,
    Outros,
}

impl Default for ProductCategory {
    fn default() -> Self {
        ProductCategory::Outros
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// ## Pricing Modes
/// Exactly one of `unit_price` / `price_per_gram` is the active price field,
/// selected by `is_weighable`:
/// - `is_weighable = false`: sold by discrete unit count at `unit_price`
/// - `is_weighable = true`: sold by mass at `price_per_gram` (displayed
///   per kilogram, weighed in kilograms)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store (channel tag) this product belongs to.
    pub store_id: String,

    /// Short operator-facing code - business identifier, unique per store.
    pub code: String,

    /// Display name shown to the operator and on the receipt.
    pub name: String,

    /// Catalog category.
    pub category: ProductCategory,

    /// Selects the pricing mode (unit vs. weighed).
    pub is_weighable: bool,

    /// Price per unit. Required when `is_weighable = false`.
    #[ts(as = "Option<String>")]
    pub unit_price: Option<Decimal>,

    /// Price per gram. Required when `is_weighable = true`.
    #[ts(as = "Option<String>")]
    pub price_per_gram: Option<Decimal>,

    /// Optional product photo for the catalog grid.
    pub image_url: Option<String>,

    /// Current stock level (informational; sales do not decrement it).
    pub stock_quantity: i64,

    /// Restock threshold for the manager screen.
    pub min_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// Barcode (EAN-13 etc.), if the product has one.
    pub barcode: Option<String>,

    /// Optional description for product details.
    pub description: Option<String>,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price the operator sees on the catalog grid: the unit price, or
    /// the per-kilogram rate for weighable products.
    pub fn display_price(&self) -> Option<Decimal> {
        if self.is_weighable {
            self.price_per_gram.map(money::display_rate_per_kg)
        } else {
            self.unit_price
        }
    }
}

/// Fields for creating a product (ids and timestamps are assigned by the
/// catalog store).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub category: ProductCategory,
    pub is_weighable: bool,
    #[ts(as = "Option<String>")]
    pub unit_price: Option<Decimal>,
    #[ts(as = "Option<String>")]
    pub price_per_gram: Option<Decimal>,
    pub image_url: Option<String>,
    pub stock_quantity: i64,
    pub min_stock: i64,
    pub is_active: bool,
    pub barcode: Option<String>,
    pub description: Option<String>,
}

impl From<&Product> for NewProduct {
    /// The creation-shaped view of an existing product, so edit forms
    /// resubmit through the same validation as creation.
    fn from(product: &Product) -> Self {
        NewProduct {
            code: product.code.clone(),
            name: product.name.clone(),
            category: product.category,
            is_weighable: product.is_weighable,
            unit_price: product.unit_price,
            price_per_gram: product.price_per_gram,
            image_url: product.image_url.clone(),
            stock_quantity: product.stock_quantity,
            min_stock: product.min_stock,
            is_active: product.is_active,
            barcode: product.barcode.clone(),
            description: product.description.clone(),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. A fixed set; `mixed` covers split payments whose
/// breakdown lives outside this system.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash - the only method where change applies.
    Cash,
    /// Instant bank transfer.
    Pix,
    CreditCard,
    DebitCard,
    Voucher,
    Mixed,
}

impl PaymentMethod {
    /// Whether this method settles in physical cash (change math applies).
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Discount kinds applicable to the cart subtotal as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    None,
    /// A currency amount, clamped at the subtotal.
    Flat,
    /// 0-100; out-of-range values are clamped by the calculator.
    Percentage,
}

/// The cart-level discount draft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSpec {
    pub kind: DiscountKind,
    #[ts(as = "String")]
    pub value: Decimal,
}

impl DiscountSpec {
    /// No discount.
    pub fn none() -> Self {
        DiscountSpec {
            kind: DiscountKind::None,
            value: Decimal::ZERO,
        }
    }

    /// A flat currency-amount discount.
    pub fn flat(value: Decimal) -> Self {
        DiscountSpec {
            kind: DiscountKind::Flat,
            value,
        }
    }

    /// A percentage (0-100) discount.
    pub fn percentage(value: Decimal) -> Self {
        DiscountSpec {
            kind: DiscountKind::Percentage,
            value,
        }
    }
}

impl Default for DiscountSpec {
    fn default() -> Self {
        DiscountSpec::none()
    }
}

// =============================================================================
// Payment Draft
// =============================================================================

/// Payment information collected while the sale is still a cart.
/// Mutable until finalize; frozen onto the Sale at that point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub method: PaymentMethod,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,

    /// The note the customer hands over, when paying cash. Only meaningful
    /// for cash; must cover the total at finalize time.
    #[ts(as = "Option<String>")]
    pub change_for: Option<Decimal>,

    /// Free text carried onto the sale record.
    pub notes: Option<String>,
}

// =============================================================================
// Operator
// =============================================================================

/// The logged-in operator, supplied by the embedding shell at terminal
/// construction and stamped onto every sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Cash Register
// =============================================================================

/// The slice of a register session the finalizer consumes: can a sale be
/// attached, and to which session id.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSession {
    pub id: String,
    pub is_open: bool,
}

/// A full cash-register session record. Open while `closed_at` is absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashRegister {
    pub id: String,
    pub store_id: String,
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    #[ts(as = "String")]
    pub opening_amount: Decimal,
    #[ts(as = "Option<String>")]
    pub closing_amount: Option<Decimal>,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl CashRegister {
    /// A session is open until it gets a closing timestamp.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// The finalizer's view of this session.
    pub fn session(&self) -> RegisterSession {
        RegisterSession {
            id: self.id.clone(),
            is_open: self.is_open(),
        }
    }
}

/// Cash adjustment kinds recorded against an open register outside of sales.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Income,
    Expense,
}

/// A cash in/out adjustment against an open register session.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMovement {
    pub id: String,
    pub register_id: String,
    pub kind: MovementKind,
    #[ts(as = "String")]
    pub amount: Decimal,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// One finalized line: a frozen snapshot of what was sold, decoupled from
/// the live catalog so later product edits cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
    #[ts(as = "Option<String>")]
    pub weight_kg: Option<Decimal>,
    /// Unit price, or the per-kilogram rate for weighed lines.
    #[ts(as = "String")]
    pub unit_price: Decimal,
    #[ts(as = "Option<String>")]
    pub price_per_gram: Option<Decimal>,
    #[ts(as = "String")]
    pub discount_amount: Decimal,
    #[ts(as = "String")]
    pub subtotal: Decimal,
}

/// The immutable output of finalization. Created only by a successful
/// finalize call; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Unique identifier (UUID v4), assigned by the sale store.
    pub id: String,

    /// Per-store receipt sequence, assigned by the sale store.
    pub sale_number: i64,

    pub store_id: String,

    /// The open register session the sale was recorded against.
    pub register_id: String,

    pub operator_id: String,
    pub operator_name: String,

    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,

    #[ts(as = "String")]
    pub subtotal: Decimal,
    #[ts(as = "String")]
    pub discount_amount: Decimal,
    /// The percentage value when the discount kind was percentage, else 0.
    #[ts(as = "String")]
    pub discount_percentage: Decimal,
    #[ts(as = "String")]
    pub total_amount: Decimal,

    pub payment_type: PaymentMethod,
    #[ts(as = "String")]
    pub change_amount: Decimal,

    pub notes: Option<String>,

    /// Always false at creation; voiding is a back-office concern.
    pub is_cancelled: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Line snapshots in the order they sat in the cart.
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"credit_card\""
        );
        assert_eq!(serde_json::to_string(&PaymentMethod::Pix).unwrap(), "\"pix\"");
        assert!(PaymentMethod::Cash.is_cash());
        assert!(!PaymentMethod::Pix.is_cash());
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProductCategory::Sorvetes).unwrap(),
            "\"sorvetes\""
        );
        let parsed: ProductCategory = serde_json::from_str("\"acai\"").unwrap();
        assert_eq!(parsed, ProductCategory::Acai);
    }

    #[test]
    fn test_discount_spec_default_is_none() {
        let spec = DiscountSpec::default();
        assert_eq!(spec.kind, DiscountKind::None);
        assert_eq!(spec.value, Decimal::ZERO);
    }

    #[test]
    fn test_display_price_follows_mode() {
        let mut product = Product {
            id: "p1".to_string(),
            store_id: "loja1".to_string(),
            code: "ACAI1KG".to_string(),
            name: "Açaí 1kg (Pesável)".to_string(),
            category: ProductCategory::Acai,
            is_weighable: true,
            unit_price: None,
            price_per_gram: Some(dec!(0.04499)),
            image_url: None,
            stock_quantity: 50,
            min_stock: 5,
            is_active: true,
            barcode: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.display_price(), Some(dec!(44.99)));

        product.is_weighable = false;
        product.price_per_gram = None;
        product.unit_price = Some(dec!(12.90));
        assert_eq!(product.display_price(), Some(dec!(12.90)));
    }

    #[test]
    fn test_register_session_view() {
        let register = CashRegister {
            id: "reg-1".to_string(),
            store_id: "loja1".to_string(),
            operator_id: Some("op-1".to_string()),
            operator_name: Some("Maria".to_string()),
            opening_amount: dec!(100.00),
            closing_amount: None,
            opened_at: Utc::now(),
            closed_at: None,
        };
        assert!(register.is_open());
        let session = register.session();
        assert_eq!(session.id, "reg-1");
        assert!(session.is_open);
    }

    #[test]
    fn test_sale_payload_uses_camel_case() {
        let sale = Sale {
            id: "s1".to_string(),
            sale_number: 7,
            store_id: "loja1".to_string(),
            register_id: "reg-1".to_string(),
            operator_id: "op-1".to_string(),
            operator_name: "Maria".to_string(),
            customer_name: None,
            customer_phone: None,
            subtotal: dec!(39.30),
            discount_amount: dec!(3.93),
            discount_percentage: dec!(10),
            total_amount: dec!(35.37),
            payment_type: PaymentMethod::Cash,
            change_amount: dec!(14.63),
            notes: None,
            is_cancelled: false,
            created_at: Utc::now(),
            items: vec![],
        };
        let json = serde_json::to_value(&sale).unwrap();
        assert!(json.get("saleNumber").is_some());
        assert!(json.get("paymentType").is_some());
        assert!(json.get("changeAmount").is_some());
        assert_eq!(json["paymentType"], "cash");
    }
}
