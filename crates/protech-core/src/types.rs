//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  order_id (FK)  │       │
//! │  │  price (auth.)  │   │  user_id        │   │  product_id     │       │
//! │  │  stock          │   │  total_amount   │   │  product_name ❄ │       │
//! │  │  availability ◄─┼─ derived from stock │   │  price        ❄ │       │
//! │  └─────────────────┘   │  status         │   └─────────────────┘       │
//! │                        └─────────────────┘    ❄ = frozen snapshot      │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │  Availability   │   │  OrderStatus    │       │
//! │  │  email (unique) │   │  In Stock       │   │  Pending        │       │
//! │  │  password_hash  │   │  Limited Stock  │   │  Processing ... │       │
//! │  │  is_admin       │   │  Out of Stock   │   │  Cancelled      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation;
use crate::LIMITED_STOCK_THRESHOLD;

// =============================================================================
// Availability
// =============================================================================

/// Stock availability label shown next to a product.
///
/// Always a pure function of stock, see [`Availability::from_stock`]. It is
/// stored alongside the stock column for listing queries, but never set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Availability {
    #[serde(rename = "In Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "In Stock"))]
    InStock,
    #[serde(rename = "Limited Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Limited Stock"))]
    LimitedStock,
    #[serde(rename = "Out of Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Out of Stock"))]
    OutOfStock,
}

impl Availability {
    /// Derives the label from a stock level.
    ///
    /// ## Mapping
    /// ```text
    /// stock ≤ 0       → Out of Stock
    /// 0 < stock < 5   → Limited Stock
    /// stock ≥ 5       → In Stock
    /// ```
    pub const fn from_stock(stock: i64) -> Self {
        if stock <= 0 {
            Availability::OutOfStock
        } else if stock < LIMITED_STOCK_THRESHOLD {
            Availability::LimitedStock
        } else {
            Availability::InStock
        }
    }

    /// The label as stored and displayed.
    pub const fn label(&self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::LimitedStock => "Limited Stock",
            Availability::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name, copied into order items at checkout.
    pub name: String,

    /// Catalogue section ("Computers", "Networking", ...).
    pub category: String,

    /// Authoritative unit price in FCFA. Never taken from a client.
    pub price: i64,

    pub description: Option<String>,

    /// Free-form technical specification text.
    pub specs: Option<String>,

    /// Relative path or URL of the product picture.
    pub image_url: Option<String>,

    /// Units on hand, never negative.
    pub stock: i64,

    /// Derived from `stock`.
    pub availability: Availability,

    /// Warranty description, e.g. "12 months".
    pub warranty: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::new(self.price)
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Sets the stock level and re-derives availability.
    pub fn set_stock(&mut self, stock: i64) {
        self.stock = stock;
        self.refresh_availability();
    }

    /// Re-derives availability from the current stock.
    #[inline]
    pub fn refresh_availability(&mut self) {
        self.availability = Availability::from_stock(self.stock);
    }
}

/// Fields for a new catalogue entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specs: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Defaults to zero when omitted.
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub warranty: Option<String>,
}

impl NewProduct {
    /// Validates every field.
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_product_name(&self.name)?;
        validation::validate_category(&self.category)?;
        validation::validate_price(self.price)?;
        if let Some(stock) = self.stock {
            validation::validate_stock(stock)?;
        }
        Ok(())
    }

    /// Initial stock level.
    pub fn initial_stock(&self) -> i64 {
        self.stock.unwrap_or(0)
    }

    /// Availability matching the initial stock.
    pub fn initial_availability(&self) -> Availability {
        Availability::from_stock(self.initial_stock())
    }
}

/// Partial update of a product: one optional field per mutable attribute.
///
/// `None` leaves the attribute untouched. Availability is not part of the
/// patch; it follows `stock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specs: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub warranty: Option<String>,
}

impl ProductPatch {
    /// Validates the fields that are present.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validation::validate_product_name(name)?;
        }
        if let Some(category) = &self.category {
            validation::validate_category(category)?;
        }
        if let Some(price) = self.price {
            validation::validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validation::validate_stock(stock)?;
        }
        Ok(())
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.specs.is_none()
            && self.image_url.is_none()
            && self.stock.is_none()
            && self.warranty.is_none()
    }

    /// Availability to store alongside a patched stock level.
    pub fn availability(&self) -> Option<Availability> {
        self.stock.map(Availability::from_stock)
    }

    /// Applies the patch field by field, re-deriving availability whenever
    /// stock changes.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(specs) = &self.specs {
            product.specs = Some(specs.clone());
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = Some(image_url.clone());
        }
        if let Some(warranty) = &self.warranty {
            product.warranty = Some(warranty.clone());
        }
        if let Some(stock) = self.stock {
            product.set_stock(stock);
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered customer or administrator.
///
/// Not serializable: the password hash must never leave the backend. Use
/// [`UserProfile`] for anything sent to a client.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub full_name: String,
    /// Unique, matched exactly (case-sensitive).
    pub email: String,
    pub phone: Option<String>,
    /// Salted one-way hash in PHC string format.
    pub password_hash: String,
    /// Set only by trusted provisioning, never by registration.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public projection of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// What a client may see about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_admin: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Self-service registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
}

impl NewUser {
    /// Validates the registration form.
    pub fn validate(&self) -> CoreResult<()> {
        validation::validate_full_name(&self.full_name)?;
        validation::validate_email(&self.email)?;
        if let Some(phone) = &self.phone {
            validation::validate_phone(phone)?;
        }
        validation::validate_password(&self.password)?;
        Ok(())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ## State Machine
/// ```text
///   Pending ──► Processing ──► Shipped ──► Delivered
///      │            │
///      └────────────┴──► Cancelled
/// ```
/// `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum OrderStatus {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pending"))]
    Pending,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Processing"))]
    Processing,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Shipped"))]
    Shipped,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Delivered"))]
    Delivered,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Cancelled"))]
    Cancelled,
}

impl OrderStatus {
    /// All recognised statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// The label as stored and displayed.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// No transition leaves a terminal status.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether an admin may move an order from `self` to `next`.
    ///
    /// Re-applying the current status is accepted as a no-op.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (*self, next),
            (Pending, Pending)
                | (Processing, Processing)
                | (Shipped, Shipped)
                | (Delivered, Delivered)
                | (Cancelled, Cancelled)
                | (Pending, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
        )
    }

    /// Checks a transition, returning `InvalidStatus` if it is not allowed.
    pub fn transition_to(&self, next: OrderStatus) -> CoreResult<OrderStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatus(format!(
                "cannot move order from {} to {}",
                self, next
            )))
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one of the five labels exactly; anything else is `InvalidStatus`.
impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order. `total_amount` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::new(self.total_amount)
    }
}

/// A line of a placed order.
/// Uses snapshot pattern to freeze product data at time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// Weak reference: the product may since have changed or been deleted.
    pub product_id: i64,
    /// Product name at time of purchase (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of purchase (frozen).
    pub price: i64,
}

impl OrderItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::new(self.price)
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::new(self.price * self.quantity)
    }
}

/// An order together with its items, oldest item first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Sum of the item line totals.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// An order enriched with its owner's name and email at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerOrder {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlacedOrder {
    pub order_id: i64,
    pub total_amount: i64,
    pub items_count: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop(stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: "Dell Latitude 5420".to_string(),
            category: "Computers".to_string(),
            price: 450_000,
            description: None,
            specs: None,
            image_url: None,
            stock,
            availability: Availability::from_stock(stock),
            warranty: Some("12 months".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_availability_mapping() {
        assert_eq!(Availability::from_stock(-3), Availability::OutOfStock);
        assert_eq!(Availability::from_stock(0), Availability::OutOfStock);
        assert_eq!(Availability::from_stock(1), Availability::LimitedStock);
        assert_eq!(Availability::from_stock(4), Availability::LimitedStock);
        assert_eq!(Availability::from_stock(5), Availability::InStock);
        assert_eq!(Availability::from_stock(48), Availability::InStock);
    }

    #[test]
    fn test_availability_is_idempotent() {
        let mut product = laptop(3);
        product.refresh_availability();
        let first = product.availability;
        product.refresh_availability();
        assert_eq!(first, product.availability);
        assert_eq!(first, Availability::LimitedStock);
    }

    #[test]
    fn test_availability_serializes_as_label() {
        let json = serde_json::to_string(&Availability::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
        let parsed: Availability = serde_json::from_str("\"Limited Stock\"").unwrap();
        assert_eq!(parsed, Availability::LimitedStock);
    }

    #[test]
    fn test_patch_recomputes_availability_on_stock_change() {
        let mut product = laptop(50);
        let patch = ProductPatch {
            stock: Some(2),
            ..Default::default()
        };
        patch.apply(&mut product);
        assert_eq!(product.stock, 2);
        assert_eq!(product.availability, Availability::LimitedStock);
        assert_eq!(patch.availability(), Some(Availability::LimitedStock));
    }

    #[test]
    fn test_patch_leaves_untouched_fields() {
        let mut product = laptop(50);
        let patch = ProductPatch {
            price: Some(430_000),
            ..Default::default()
        };
        patch.apply(&mut product);
        assert_eq!(product.price, 430_000);
        assert_eq!(product.name, "Dell Latitude 5420");
        assert_eq!(product.stock, 50);
        assert_eq!(product.availability, Availability::InStock);
        assert!(patch.availability().is_none());
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_patch_rejects_negative_values() {
        let patch = ProductPatch {
            price: Some(-1),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ProductPatch {
            stock: Some(-5),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_new_product_defaults() {
        let new = NewProduct {
            name: "HDMI Cable 2m".to_string(),
            category: "Accessories".to_string(),
            price: 3_500,
            ..Default::default()
        };
        assert!(new.validate().is_ok());
        assert_eq!(new.initial_stock(), 0);
        assert_eq!(new.initial_availability(), Availability::OutOfStock);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);

        let err = "Completed".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus(_)));
        // Labels are exact.
        assert!("pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));

        // No skipping, no reversing.
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Shipped.can_transition_to(Cancelled));

        // Terminal states.
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Cancelled));

        assert!(matches!(
            Delivered.transition_to(Pending),
            Err(CoreError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            product_name: "Dell Latitude 5420".to_string(),
            quantity: 2,
            price: 450_000,
        };
        assert_eq!(item.line_total(), Money::new(900_000));
    }

    #[test]
    fn test_profile_hides_password_hash() {
        let user = User {
            id: 3,
            full_name: "Test Customer".to_string(),
            email: "test@customer.com".to_string(),
            phone: Some("677000000".to_string()),
            password_hash: "$argon2id$v=19$...".to_string(),
            is_admin: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("test@customer.com"));
    }
}
