//! # Cart Pricing
//!
//! Turns a submitted cart into a priced, stock-checked order draft.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [{id, quantity, price?}, ...]        (client payload, price ignored)   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  empty? ──────────────────────────────────────────► EmptyCart           │
//! │           │                                                             │
//! │           ▼  for each line, in input order                              │
//! │  id or quantity missing? ─────────────────────────► skip                │
//! │  product unknown? ────────────────────────────────► ProductNotFound     │
//! │  quantity ≤ 0? ───────────────────────────────────► skip                │
//! │  stock < requested (cumulative)? ─────────────────► InsufficientStock   │
//! │  line = catalogue price × quantity                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  no lines kept? ──────────────────────────────────► NoValidItems        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  OrderDraft { items, total }                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This step is pure: the caller supplies a product lookup, and the stock
//! figures it sees are re-checked by the database when the draft is
//! committed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Cart Input
// =============================================================================

/// A quantity as the storefront frontend sends it.
///
/// Browsers submit numbers, but form fields occasionally arrive as strings
/// or as non-integral numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum QuantityInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl QuantityInput {
    /// Coerces to an integer quantity.
    ///
    /// JSON numbers are truncated toward zero. Strings must hold an integer;
    /// `"2.5"` and `"two"` are validation failures.
    ///
    /// ## Example
    /// ```rust
    /// use protech_core::cart::QuantityInput;
    ///
    /// assert_eq!(QuantityInput::Int(2).coerce().unwrap(), 2);
    /// assert_eq!(QuantityInput::Float(2.9).coerce().unwrap(), 2);
    /// assert_eq!(QuantityInput::Text(" 3 ".into()).coerce().unwrap(), 3);
    /// assert!(QuantityInput::Text("2.5".into()).coerce().is_err());
    /// assert!(QuantityInput::Text("two".into()).coerce().is_err());
    /// ```
    pub fn coerce(&self) -> Result<i64, ValidationError> {
        match self {
            QuantityInput::Int(qty) => Ok(*qty),
            QuantityInput::Float(qty) => truncate(*qty),
            QuantityInput::Text(text) => text.trim().parse::<i64>().map_err(|_| not_an_integer()),
        }
    }
}

fn truncate(qty: f64) -> Result<i64, ValidationError> {
    if qty.is_finite() {
        Ok(qty.trunc() as i64)
    } else {
        Err(not_an_integer())
    }
}

fn not_an_integer() -> ValidationError {
    ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: "must be an integer".to_string(),
    }
}

impl From<i64> for QuantityInput {
    fn from(qty: i64) -> Self {
        QuantityInput::Int(qty)
    }
}

/// One submitted cart line.
///
/// Both fields are optional on the wire; a line missing either one is
/// skipped. Unknown fields, including any client-side `price`, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    #[serde(default, alias = "product_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<QuantityInput>,
}

impl CartLine {
    /// A complete line with an integer quantity.
    pub fn new(product_id: i64, quantity: i64) -> Self {
        CartLine {
            id: Some(product_id),
            quantity: Some(QuantityInput::Int(quantity)),
        }
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// A priced cart line, ready to be frozen into an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemDraft {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl OrderItemDraft {
    /// Unit price × quantity. Already checked for overflow when drafted.
    pub fn line_total(&self) -> Money {
        Money::new(self.unit_price.amount() * self.quantity)
    }
}

/// The priced contents of an order before it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    pub items: Vec<OrderItemDraft>,
    pub total: Money,
}

impl OrderDraft {
    /// Total quantity per product, in the order products first appear.
    ///
    /// Stock is decremented once per product with the summed quantity.
    pub fn stock_demand(&self) -> Vec<(i64, i64)> {
        let mut demand: Vec<(i64, i64)> = Vec::new();
        for item in &self.items {
            match demand.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, qty)) => *qty += item.quantity,
                None => demand.push((item.product_id, item.quantity)),
            }
        }
        demand
    }

    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    /// Prices the same lines again from fresh product rows.
    ///
    /// Quantities are kept; unit price and name are taken from `resolve`.
    /// The order engine calls this inside its transaction, once stock has
    /// been taken, so the order records the catalogue as it stood at commit.
    pub fn reprice<'a, F>(&self, mut resolve: F) -> CoreResult<OrderDraft>
    where
        F: FnMut(i64) -> Option<&'a Product>,
    {
        let mut items = Vec::with_capacity(self.items.len());
        let mut total = Money::zero();

        for item in &self.items {
            let product = resolve(item.product_id)
                .ok_or(CoreError::ProductNotFound(item.product_id))?;
            items.push(price_line(product, item.quantity, &mut total)?);
        }

        Ok(OrderDraft { items, total })
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices a cart against the catalogue.
///
/// `resolve` looks a product up by id. Prices always come from the resolved
/// product. Duplicate lines for the same product are checked against stock
/// cumulatively.
///
/// ## Errors
/// - `EmptyCart` when `lines` is empty
/// - `Validation` when a quantity is not an integer, or a total overflows
/// - `ProductNotFound` for the first unknown product id
/// - `InsufficientStock` for the first product whose stock cannot cover
///   the quantity requested so far
/// - `NoValidItems` when every line was skipped
///
/// ## Example
/// ```rust
/// use protech_core::cart::{price_cart, CartLine};
/// use protech_core::CoreError;
///
/// let err = price_cart(&[], |_| None).unwrap_err();
/// assert!(matches!(err, CoreError::EmptyCart));
///
/// let err = price_cart(&[CartLine::new(999, 1)], |_| None).unwrap_err();
/// assert!(matches!(err, CoreError::ProductNotFound(999)));
/// ```
pub fn price_cart<'a, F>(lines: &[CartLine], mut resolve: F) -> CoreResult<OrderDraft>
where
    F: FnMut(i64) -> Option<&'a Product>,
{
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut total = Money::zero();
    let mut requested: HashMap<i64, i64> = HashMap::new();

    for line in lines {
        let (Some(product_id), Some(quantity)) = (line.id, line.quantity.as_ref()) else {
            continue;
        };

        let product = resolve(product_id).ok_or(CoreError::ProductNotFound(product_id))?;

        let quantity = quantity.coerce()?;
        if quantity <= 0 {
            continue;
        }

        let wanted = requested.entry(product_id).or_insert(0);
        *wanted += quantity;
        if !product.can_fulfil(*wanted) {
            return Err(CoreError::InsufficientStock {
                product_id,
                available: product.stock,
                requested: *wanted,
            });
        }

        items.push(price_line(product, quantity, &mut total)?);
    }

    if items.is_empty() {
        return Err(CoreError::NoValidItems);
    }

    Ok(OrderDraft { items, total })
}

/// Prices one line at the product's catalogue price and adds it to `total`.
fn price_line(product: &Product, quantity: i64, total: &mut Money) -> CoreResult<OrderItemDraft> {
    let unit_price = product.unit_price();
    let line_total = unit_price
        .checked_mul_quantity(quantity)
        .ok_or_else(|| total_overflow("line total"))?;
    *total = total
        .checked_add(line_total)
        .ok_or_else(|| total_overflow("order total"))?;

    Ok(OrderItemDraft {
        product_id: product.id,
        product_name: product.name.clone(),
        quantity,
        unit_price,
    })
}

fn total_overflow(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
