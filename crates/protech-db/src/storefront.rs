//! # Storefront
//!
//! The library surface an API layer calls, one method per endpoint.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Anyone            Customers (user id)        Admins (user id)          │
//! │  ─────────────     ───────────────────        ─────────────────────     │
//! │  list_products     place_order                create/update/delete      │
//! │  get_product       my_orders                  adjust_stock/set_stock    │
//! │  register          order_details (own)        update_order_status       │
//! │  login             profile                    all_orders / users        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is a [`DbError`](crate::DbError) whose `kind()` the API
//! layer maps to a status code.

use protech_core::{
    CartLine, CoreError, CustomerOrder, NewProduct, NewUser, Order, OrderWithItems, PlacedOrder,
    Product, ProductPatch, UserProfile,
};

use crate::access::AccessGuard;
use crate::engine::OrderEngine;
use crate::error::DbResult;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;

/// Privilege-gated facade over the stores and the order engine.
#[derive(Debug, Clone)]
pub struct Storefront {
    catalog: ProductRepository,
    identity: UserRepository,
    orders: OrderRepository,
    engine: OrderEngine,
    guard: AccessGuard,
}

impl Storefront {
    pub fn new(
        catalog: ProductRepository,
        identity: UserRepository,
        orders: OrderRepository,
        engine: OrderEngine,
        guard: AccessGuard,
    ) -> Self {
        Storefront {
            catalog,
            identity,
            orders,
            engine,
            guard,
        }
    }

    // =========================================================================
    // Catalogue (public)
    // =========================================================================

    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.catalog.list().await
    }

    pub async fn products_in_category(&self, category: &str) -> DbResult<Vec<Product>> {
        self.catalog.list_by_category(category).await
    }

    pub async fn get_product(&self, id: i64) -> DbResult<Product> {
        self.catalog.get(id).await
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Self-service registration. Never grants admin.
    pub async fn register(&self, new: &NewUser) -> DbResult<UserProfile> {
        Ok(self.identity.create(new).await?.profile())
    }

    /// Checks credentials and returns the profile to put in a token.
    pub async fn login(&self, email: &str, password: &str) -> DbResult<UserProfile> {
        Ok(self.identity.verify(email, password).await?.profile())
    }

    pub async fn profile(&self, user_id: i64) -> DbResult<UserProfile> {
        Ok(self.guard.require_user(user_id).await?.profile())
    }

    // =========================================================================
    // Orders (customers)
    // =========================================================================

    pub async fn place_order(&self, user_id: i64, cart: &[CartLine]) -> DbResult<PlacedOrder> {
        self.engine.place_order(user_id, cart).await
    }

    pub async fn my_orders(&self, user_id: i64) -> DbResult<Vec<Order>> {
        self.guard.require_user(user_id).await?;
        self.engine.list_for_user(user_id).await
    }

    /// An order with its items, visible to its owner and to admins.
    ///
    /// Other users get `OrderNotFound`, as if the order did not exist.
    pub async fn order_details(&self, user_id: i64, order_id: i64) -> DbResult<OrderWithItems> {
        let caller = self.guard.require_user(user_id).await?;

        let order = self
            .orders
            .find(order_id)
            .await?
            .filter(|o| caller.is_admin || o.user_id == caller.id)
            .ok_or(CoreError::OrderNotFound(order_id))?;

        let items = self.orders.items_for(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    // =========================================================================
    // Administration
    // =========================================================================

    pub async fn create_product(&self, user_id: i64, new: &NewProduct) -> DbResult<Product> {
        self.guard.require_admin(user_id, "create products").await?;
        self.catalog.create(new).await
    }

    pub async fn update_product(
        &self,
        user_id: i64,
        id: i64,
        patch: &ProductPatch,
    ) -> DbResult<Product> {
        self.guard.require_admin(user_id, "update products").await?;
        self.catalog.update(id, patch).await
    }

    pub async fn adjust_stock(&self, user_id: i64, id: i64, delta: i64) -> DbResult<Product> {
        self.guard.require_admin(user_id, "update stock").await?;
        self.catalog.adjust_stock(id, delta).await
    }

    pub async fn set_stock(&self, user_id: i64, id: i64, stock: i64) -> DbResult<Product> {
        self.guard.require_admin(user_id, "update stock").await?;
        self.catalog.set_stock(id, stock).await
    }

    pub async fn delete_product(&self, user_id: i64, id: i64) -> DbResult<()> {
        self.guard.require_admin(user_id, "delete products").await?;
        self.catalog.delete(id).await
    }

    pub async fn update_order_status(
        &self,
        user_id: i64,
        order_id: i64,
        status: &str,
    ) -> DbResult<Order> {
        self.guard.require_admin(user_id, "update orders").await?;
        self.engine.update_status(order_id, status).await
    }

    pub async fn all_orders(&self, user_id: i64) -> DbResult<Vec<CustomerOrder>> {
        self.guard.require_admin(user_id, "view all orders").await?;
        self.engine.list_all().await
    }

    pub async fn users(&self, user_id: i64) -> DbResult<Vec<UserProfile>> {
        self.guard.require_admin(user_id, "view users").await?;
        let users = self.identity.list().await?;
        Ok(users.iter().map(UserProfile::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use protech_core::{ErrorKind, OrderStatus};

    struct Fixture {
        store: Storefront,
        admin: i64,
        customer: i64,
        other: i64,
        laptop: Product,
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: None,
            password: "password123".to_string(),
        }
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admin = db
            .users()
            .create_admin(&new_user("System Administrator", "admin@protechsolutions.cm"))
            .await
            .unwrap();
        let store = db.storefront();

        let customer = store
            .register(&new_user("Test Customer", "test@customer.com"))
            .await
            .unwrap();
        let other = store
            .register(&new_user("Other Customer", "other@customer.com"))
            .await
            .unwrap();

        let laptop = store
            .create_product(
                admin.id,
                &NewProduct {
                    name: "Dell Latitude 5420".to_string(),
                    category: "Computers".to_string(),
                    price: 450_000,
                    stock: Some(50),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        Fixture {
            store,
            admin: admin.id,
            customer: customer.id,
            other: other.id,
            laptop,
        }
    }

    #[tokio::test]
    async fn test_customer_flow() {
        let f = fixture().await;

        let profile = f.store.login("test@customer.com", "password123").await.unwrap();
        assert_eq!(profile.id, f.customer);
        assert!(!profile.is_admin);

        let placed = f
            .store
            .place_order(f.customer, &[CartLine::new(f.laptop.id, 2)])
            .await
            .unwrap();
        assert_eq!(placed.total_amount, 900_000);

        let mine = f.store.my_orders(f.customer).await.unwrap();
        assert_eq!(mine.len(), 1);

        let details = f.store.order_details(f.customer, placed.order_id).await.unwrap();
        assert_eq!(details.items.len(), 1);

        // Not visible to another customer, visible to an admin.
        let err = f
            .store
            .order_details(f.other, placed.order_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(f.store.order_details(f.admin, placed.order_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_operations_are_gated() {
        let f = fixture().await;

        let err = f
            .store
            .delete_product(f.customer, f.laptop.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = f.store.set_stock(f.customer, f.laptop.id, 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = f.store.all_orders(f.customer).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = f.store.users(999).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        assert_eq!(f.store.get_product(f.laptop.id).await.unwrap().stock, 50);
    }

    #[tokio::test]
    async fn test_admin_flow() {
        let f = fixture().await;
        let placed = f
            .store
            .place_order(f.customer, &[CartLine::new(f.laptop.id, 1)])
            .await
            .unwrap();

        let order = f
            .store
            .update_order_status(f.admin, placed.order_id, "Processing")
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);

        let all = f.store.all_orders(f.admin).await.unwrap();
        assert_eq!(all[0].customer_name, "Test Customer");

        let product = f.store.adjust_stock(f.admin, f.laptop.id, 5).await.unwrap();
        assert_eq!(product.stock, 54);

        let product = f
            .store
            .update_product(
                f.admin,
                f.laptop.id,
                &ProductPatch {
                    stock: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(product.availability.label(), "Limited Stock");

        let users = f.store.users(f.admin).await.unwrap();
        assert_eq!(users.len(), 3);

        f.store.delete_product(f.admin, f.laptop.id).await.unwrap();
        assert!(f.store.list_products().await.unwrap().is_empty());
        assert_eq!(
            f.store.get_product(f.laptop.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_registration_never_grants_admin() {
        let f = fixture().await;
        let profile = f.store.profile(f.customer).await.unwrap();
        assert!(!profile.is_admin);

        let err = f
            .store
            .register(&new_user("Copycat", "test@customer.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
