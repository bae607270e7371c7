//! # Order Repository
//!
//! Reads of placed orders and their items, and the status write.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (OrderEngine, one transaction)                               │
//! │     └── insert_order() → Order { status: Pending }                     │
//! │     └── insert_item()  → OrderItem (frozen name + price)               │
//! │                                                                         │
//! │  2. ADMINISTER                                                         │
//! │     └── set_status()   → Processing → Shipped → Delivered              │
//! │                          (or Cancelled before shipping)                │
//! │                                                                         │
//! │  3. READ                                                               │
//! │     └── list_for_user() / list_all() / get_with_items()                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are never rewritten except `orders.status`; the schema rejects any
//! other update with a trigger.

use chrono::{DateTime, Utc};
use protech_core::{CustomerOrder, Order, OrderItem, OrderItemDraft, OrderStatus, OrderWithItems};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn find(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order by ID, or `NotFound`.
    pub async fn get(&self, id: i64) -> DbResult<Order> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Items of an order in the order they were placed.
    pub async fn items_for(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// An order together with its items.
    pub async fn get_with_items(&self, id: i64) -> DbResult<OrderWithItems> {
        let order = self.get(id).await?;
        let items = self.items_for(id).await?;

        Ok(OrderWithItems { order, items })
    }

    /// A user's orders, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<Order>> {
        debug!(user_id, "Listing orders for user");

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Every order, newest first, with the owner's name and email as they
    /// are now.
    pub async fn list_all(&self) -> DbResult<Vec<CustomerOrder>> {
        let orders = sqlx::query_as::<_, CustomerOrder>(
            r#"
            SELECT
                o.id,
                o.user_id,
                o.total_amount,
                o.status,
                o.created_at,
                u.full_name AS customer_name,
                u.email AS customer_email
            FROM orders o
            INNER JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = orders.len(), "Listed all orders");
        Ok(orders)
    }

    /// Moves an order from `from` to `to`.
    ///
    /// Compare-and-set on the current status: returns `None` if the order
    /// no longer has status `from` (or does not exist).
    pub async fn set_status(
        &self,
        id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<Option<Order>> {
        debug!(id, from = %from, to = %to, "Updating order status");

        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = ?3 WHERE id = ?1 AND status = ?2 RETURNING *",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Placement helpers (run inside the engine's transaction)
// =============================================================================

/// Inserts a Pending order and returns its id.
pub(crate) async fn insert_order(
    conn: &mut SqliteConnection,
    user_id: i64,
    total_amount: i64,
    now: DateTime<Utc>,
) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO orders (user_id, total_amount, status, created_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(total_amount)
    .bind(OrderStatus::Pending.as_str())
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Freezes one priced line into `order_items`.
pub(crate) async fn insert_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    item: &OrderItemDraft,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, product_id, product_name, quantity, price)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price.amount())
    .execute(&mut *conn)
    .await?;

    Ok(())
}
