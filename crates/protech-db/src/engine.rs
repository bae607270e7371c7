//! # Order Engine
//!
//! Places orders and moves them through their lifecycle.
//!
//! ## Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order(user_id, cart)                           │
//! │                                                                         │
//! │  READ PHASE (no writes)                                                │
//! │  ├── user exists?                        else Unauthenticated          │
//! │  ├── fetch every referenced product                                    │
//! │  └── price_cart()  EmptyCart / ProductNotFound / InsufficientStock /   │
//! │                    NoValidItems / ValidationFailure                    │
//! │                                                                         │
//! │  COMMIT PHASE (one transaction)                                        │
//! │  ├── per product: UPDATE stock = stock - q WHERE stock >= q            │
//! │  │     0 rows → a concurrent order took the stock → rollback           │
//! │  ├── per product: availability = from_stock(new stock), row re-read    │
//! │  ├── reprice lines from the re-read rows                               │
//! │  ├── INSERT order (Pending, total from catalogue prices)               │
//! │  ├── INSERT order_items (frozen name + unit price)                     │
//! │  └── COMMIT                              failure → TransactionFailed   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock decrement is the first statement of the transaction, so
//! concurrent placements queue on SQLite's write lock and each one re-checks
//! stock against the committed value of the previous one. Prices and names
//! are taken again from the rows the transaction touched, so the order
//! records the catalogue as it stood while the write lock was held.

use std::collections::HashMap;

use chrono::Utc;
use protech_core::{
    price_cart, CartLine, CoreError, CustomerOrder, Order, OrderDraft, OrderStatus, PlacedOrder,
    Product,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::order::{self, OrderRepository};
use crate::repository::product::{self, ProductRepository};
use crate::repository::user::UserRepository;

/// Order placement and administration.
///
/// Built from its collaborators rather than looking them up:
/// ```rust,ignore
/// let engine = OrderEngine::new(pool.clone(), catalog, identity);
/// let placed = engine.place_order(user.id, &cart).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderEngine {
    pool: SqlitePool,
    catalog: ProductRepository,
    identity: UserRepository,
    orders: OrderRepository,
}

impl OrderEngine {
    pub fn new(pool: SqlitePool, catalog: ProductRepository, identity: UserRepository) -> Self {
        let orders = OrderRepository::new(pool.clone());
        OrderEngine {
            pool,
            catalog,
            identity,
            orders,
        }
    }

    /// Places an order for `user_id`.
    ///
    /// Prices come from the catalogue; any price in the cart payload is
    /// ignored. The cart is priced once to validate it and again inside the
    /// transaction, so a price edited in between is the one recorded. On
    /// any error nothing is written.
    pub async fn place_order(&self, user_id: i64, cart: &[CartLine]) -> DbResult<PlacedOrder> {
        if self.identity.find(user_id).await?.is_none() {
            return Err(CoreError::Unauthenticated.into());
        }

        let products = self.resolve_products(cart).await?;
        let draft = price_cart(cart, |id| products.get(&id)).map_err(|e| {
            debug!(user_id, error = %e, "Cart rejected");
            e
        })?;

        self.commit(user_id, &draft).await
    }

    /// Fetches each product a complete cart line refers to.
    async fn resolve_products(&self, cart: &[CartLine]) -> DbResult<HashMap<i64, Product>> {
        let mut products = HashMap::new();

        for id in cart.iter().filter(|l| l.quantity.is_some()).filter_map(|l| l.id) {
            if products.contains_key(&id) {
                continue;
            }
            match self.catalog.find(id).await? {
                Some(product) => {
                    products.insert(id, product);
                }
                // price_cart reports it in line order.
                None => break,
            }
        }

        Ok(products)
    }

    async fn commit(&self, user_id: i64, draft: &OrderDraft) -> DbResult<PlacedOrder> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut fresh: HashMap<i64, Product> = HashMap::new();

        for (product_id, quantity) in draft.stock_demand() {
            match product::shift_stock(&mut *tx, product_id, -quantity, now).await? {
                Some(stock) => {
                    let row = product::write_availability(&mut *tx, product_id, stock).await?;
                    fresh.insert(product_id, row);
                }
                None => {
                    let err = match product::current_stock(&mut *tx, product_id).await? {
                        Some(available) => CoreError::InsufficientStock {
                            product_id,
                            available,
                            requested: quantity,
                        },
                        None => CoreError::ProductNotFound(product_id),
                    };
                    debug!(user_id, error = %err, "Lost stock race, rolling back");
                    return Err(err.into());
                }
            }
        }

        let draft = draft.reprice(|id| fresh.get(&id))?;

        let order_id = order::insert_order(&mut *tx, user_id, draft.total.amount(), now).await?;
        for item in &draft.items {
            order::insert_item(&mut *tx, order_id, item).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            order_id,
            user_id,
            total_amount = draft.total.amount(),
            items = draft.items_count(),
            "Order placed"
        );

        Ok(PlacedOrder {
            order_id,
            total_amount: draft.total.amount(),
            items_count: draft.items_count(),
        })
    }

    /// Sets an order's status from its label.
    ///
    /// ## Returns
    /// * `Err(InvalidStatus)` - Unknown label, or a move the lifecycle forbids
    /// * `Err(OrderNotFound)` - No such order
    pub async fn update_status(&self, order_id: i64, status: &str) -> DbResult<Order> {
        let next: OrderStatus = status.parse()?;
        self.transition(order_id, next).await
    }

    /// Moves an order to `next`. Re-applying the current status is a no-op.
    pub async fn transition(&self, order_id: i64, next: OrderStatus) -> DbResult<Order> {
        loop {
            let current = self
                .orders
                .find(order_id)
                .await?
                .ok_or(CoreError::OrderNotFound(order_id))?;

            current.status.transition_to(next)?;
            if current.status == next {
                return Ok(current);
            }

            // None: another admin moved the order first; re-check from there.
            if let Some(updated) = self.orders.set_status(order_id, current.status, next).await? {
                info!(order_id, from = %current.status, to = %next, "Order status changed");
                return Ok(updated);
            }
        }
    }

    /// A user's orders, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<Order>> {
        self.orders.list_for_user(user_id).await
    }

    /// Every order, newest first, with its owner's name and email.
    pub async fn list_all(&self) -> DbResult<Vec<CustomerOrder>> {
        self.orders.list_all().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use protech_core::{Availability, ErrorKind, NewProduct, NewUser, ProductPatch};

    struct Shop {
        db: Database,
        engine: OrderEngine,
        user_id: i64,
    }

    async fn shop_with(db: Database) -> Shop {
        let user = db
            .users()
            .create(&NewUser {
                full_name: "Test Customer".to_string(),
                email: "test@customer.com".to_string(),
                phone: Some("677000000".to_string()),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        Shop {
            engine: db.engine(),
            db,
            user_id: user.id,
        }
    }

    async fn shop() -> Shop {
        shop_with(Database::new(DbConfig::in_memory()).await.unwrap()).await
    }

    async fn add_product(db: &Database, name: &str, price: i64, stock: i64) -> Product {
        db.products()
            .create(&NewProduct {
                name: name.to_string(),
                category: "Computers".to_string(),
                price,
                stock: Some(stock),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get(id).await.unwrap().stock
    }

    #[tokio::test]
    async fn test_place_order_prices_and_deducts() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "Dell Latitude 5420", 450_000, 50).await;

        let placed = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(laptop.id, 2)])
            .await
            .unwrap();

        assert_eq!(placed.total_amount, 900_000);
        assert_eq!(placed.items_count, 1);

        let product = shop.db.products().get(laptop.id).await.unwrap();
        assert_eq!(product.stock, 48);
        assert_eq!(product.availability, Availability::InStock);

        let order = shop.db.orders().get_with_items(placed.order_id).await.unwrap();
        assert_eq!(order.order.status, OrderStatus::Pending);
        assert_eq!(order.order.user_id, shop.user_id);
        assert_eq!(order.items[0].product_name, "Dell Latitude 5420");
        assert_eq!(order.items[0].price, 450_000);
        assert_eq!(order.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_total_matches_items() {
        let shop = shop().await;
        let a = add_product(&shop.db, "Logitech MX Master 3", 35_000, 50).await;
        let b = add_product(&shop.db, "HDMI Cable 2m", 3_500, 50).await;

        let placed = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(a.id, 3), CartLine::new(b.id, 4)])
            .await
            .unwrap();

        let order = shop.db.orders().get_with_items(placed.order_id).await.unwrap();
        assert_eq!(order.items_total(), order.order.total());
        assert_eq!(order.order.total_amount, 119_000);
    }

    #[tokio::test]
    async fn test_client_price_is_ignored() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "HP ProBook 450 G8", 520_000, 50).await;

        let cart: Vec<CartLine> = serde_json::from_str(&format!(
            r#"[{{"id": {}, "quantity": 1, "price": 1}}]"#,
            laptop.id
        ))
        .unwrap();
        let placed = shop.engine.place_order(shop.user_id, &cart).await.unwrap();
        assert_eq!(placed.total_amount, 520_000);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "Dell Latitude 5420", 450_000, 50).await;

        let err = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(laptop.id, 100)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(!err.is_retryable());
        assert_eq!(stock_of(&shop.db, laptop.id).await, 50);
        assert_eq!(shop.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_changes_nothing() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "Dell Latitude 5420", 450_000, 50).await;

        let err = shop
            .engine
            .place_order(
                shop.user_id,
                &[CartLine::new(laptop.id, 1), CartLine::new(999, 1)],
            )
            .await
            .unwrap_err();

        assert!(matches!(err.as_domain(), Some(CoreError::ProductNotFound(999))));
        assert_eq!(stock_of(&shop.db, laptop.id).await, 50);
        assert_eq!(shop.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_and_skipped_carts() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "Dell Latitude 5420", 450_000, 50).await;

        let err = shop.engine.place_order(shop.user_id, &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCart);

        let err = shop
            .engine
            .place_order(
                shop.user_id,
                &[
                    CartLine::new(laptop.id, 0),
                    CartLine {
                        id: Some(laptop.id),
                        quantity: None,
                    },
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoValidItems);
        assert_eq!(shop.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_unauthenticated() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "Dell Latitude 5420", 450_000, 50).await;

        let err = shop
            .engine
            .place_order(shop.user_id + 100, &[CartLine::new(laptop.id, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(stock_of(&shop.db, laptop.id).await, 50);
    }

    #[tokio::test]
    async fn test_availability_follows_deduction() {
        let shop = shop().await;
        let ssd = add_product(&shop.db, "Samsung T7 SSD 1TB", 95_000, 5).await;

        shop.engine
            .place_order(shop.user_id, &[CartLine::new(ssd.id, 2)])
            .await
            .unwrap();
        let product = shop.db.products().get(ssd.id).await.unwrap();
        assert_eq!(product.stock, 3);
        assert_eq!(product.availability, Availability::LimitedStock);

        shop.engine
            .place_order(shop.user_id, &[CartLine::new(ssd.id, 3)])
            .await
            .unwrap();
        let product = shop.db.products().get(ssd.id).await.unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.availability, Availability::OutOfStock);
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_summed() {
        let shop = shop().await;
        let usb = add_product(&shop.db, "SanDisk Ultra 128GB USB", 7_500, 10).await;

        let placed = shop
            .engine
            .place_order(
                shop.user_id,
                &[CartLine::new(usb.id, 2), CartLine::new(usb.id, 3)],
            )
            .await
            .unwrap();

        assert_eq!(placed.items_count, 2);
        assert_eq!(placed.total_amount, 37_500);
        assert_eq!(stock_of(&shop.db, usb.id).await, 5);

        let err = shop
            .engine
            .place_order(
                shop.user_id,
                &[CartLine::new(usb.id, 3), CartLine::new(usb.id, 3)],
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert_eq!(stock_of(&shop.db, usb.id).await, 5);
    }

    #[tokio::test]
    async fn test_items_are_frozen_snapshots() {
        let shop = shop().await;
        let router = add_product(&shop.db, "Cisco Small Business Router", 95_000, 50).await;

        let placed = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(router.id, 1)])
            .await
            .unwrap();

        shop.db
            .products()
            .update(
                router.id,
                &ProductPatch {
                    name: Some("Cisco RV340".to_string()),
                    price: Some(110_000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        shop.db.products().delete(router.id).await.unwrap();

        let order = shop.db.orders().get_with_items(placed.order_id).await.unwrap();
        assert_eq!(order.order.total_amount, 95_000);
        assert_eq!(order.items[0].price, 95_000);
        assert_eq!(order.items[0].product_name, "Cisco Small Business Router");
    }

    #[tokio::test]
    async fn test_price_read_inside_transaction() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "Dell Latitude 5420", 450_000, 50).await;

        // Stands in for an admin price edit landing after the cart was priced.
        sqlx::query(
            r#"
            CREATE TRIGGER reprice_on_sale AFTER UPDATE OF stock ON products
            BEGIN UPDATE products SET price = 500000, name = 'Dell Latitude 5430' WHERE id = NEW.id; END
            "#,
        )
        .execute(shop.db.pool())
        .await
        .unwrap();

        let placed = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(laptop.id, 2)])
            .await
            .unwrap();
        assert_eq!(placed.total_amount, 1_000_000);

        let order = shop.db.orders().get_with_items(placed.order_id).await.unwrap();
        assert_eq!(order.order.total_amount, 1_000_000);
        assert_eq!(order.items[0].price, 500_000);
        assert_eq!(order.items[0].product_name, "Dell Latitude 5430");
        assert_eq!(stock_of(&shop.db, laptop.id).await, 48);
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_everything() {
        let shop = shop().await;
        let laptop = add_product(&shop.db, "Lenovo ThinkPad T14", 480_000, 50).await;

        sqlx::query(
            r#"
            CREATE TRIGGER reject_items BEFORE INSERT ON order_items
            BEGIN SELECT RAISE(ABORT, 'disk on fire'); END
            "#,
        )
        .execute(shop.db.pool())
        .await
        .unwrap();

        let err = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(laptop.id, 2)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert_eq!(stock_of(&shop.db, laptop.id).await, 50);
        assert_eq!(shop.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let shop = shop().await;
        let cable = add_product(&shop.db, "HDMI Cable 2m", 3_500, 50).await;

        let first = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(cable.id, 1)])
            .await
            .unwrap();
        let second = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(cable.id, 2)])
            .await
            .unwrap();

        let orders = shop.engine.list_for_user(shop.user_id).await.unwrap();
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.order_id, first.order_id]);

        let all = shop.engine.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].customer_email, "test@customer.com");
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let shop = shop().await;
        let cable = add_product(&shop.db, "HDMI Cable 2m", 3_500, 50).await;
        let placed = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(cable.id, 1)])
            .await
            .unwrap();
        let id = placed.order_id;

        for label in ["Processing", "Shipped", "Delivered"] {
            let order = shop.engine.update_status(id, label).await.unwrap();
            assert_eq!(order.status.as_str(), label);
        }

        // Terminal.
        let err = shop.engine.update_status(id, "Cancelled").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);

        // Same status again is accepted.
        let order = shop.engine.update_status(id, "Delivered").await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.total_amount, 3_500);
    }

    #[tokio::test]
    async fn test_status_errors() {
        let shop = shop().await;
        let cable = add_product(&shop.db, "HDMI Cable 2m", 3_500, 50).await;
        let placed = shop
            .engine
            .place_order(shop.user_id, &[CartLine::new(cable.id, 1)])
            .await
            .unwrap();

        let err = shop
            .engine
            .update_status(placed.order_id, "Teleported")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);

        let err = shop
            .engine
            .update_status(placed.order_id, "Shipped")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);

        let err = shop.engine.update_status(999, "Processing").await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::OrderNotFound(999))));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let order = shop
            .engine
            .transition(placed.order_id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    // -------------------------------------------------------------------------
    // Concurrency
    // -------------------------------------------------------------------------

    async fn file_shop(dir: &tempfile::TempDir) -> Shop {
        let db = Database::new(DbConfig::new(dir.path().join("protech.db")).max_connections(8))
            .await
            .unwrap();
        shop_with(db).await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let shop = file_shop(&dir).await;
        let switch = add_product(&shop.db, "TP-Link 24-Port Switch", 120_000, 10).await;

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let engine = shop.engine.clone();
                let cart = vec![CartLine::new(switch.id, 6)];
                let user_id = shop.user_id;
                tokio::spawn(async move { engine.place_order(user_id, &cart).await })
            })
            .collect();

        let mut successes = 0;
        let mut shortages = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) if e.kind() == ErrorKind::InsufficientStock => shortages += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(shortages, 1);
        assert_eq!(stock_of(&shop.db, switch.id).await, 4);
        assert_eq!(shop.db.orders().count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_buyers_drain_stock_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let shop = file_shop(&dir).await;
        let ap = add_product(&shop.db, "Ubiquiti UniFi AP AC Pro", 85_000, 5).await;

        let tasks: Vec<_> = (0..12)
            .map(|_| {
                let engine = shop.engine.clone();
                let cart = vec![CartLine::new(ap.id, 1)];
                let user_id = shop.user_id;
                tokio::spawn(async move { engine.place_order(user_id, &cart).await })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_eq!(e.kind(), ErrorKind::InsufficientStock),
            }
        }

        assert_eq!(successes, 5);
        let product = shop.db.products().get(ap.id).await.unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.availability, Availability::OutOfStock);
    }
}
