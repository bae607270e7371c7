//! # Product Repository
//!
//! The Catalog Store: every read and write of a product row goes through here
//! (or through the stock helpers the order engine borrows from this module).
//!
//! ## Stock Mutations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, compute, write back                                   │
//! │     SELECT stock ...;  UPDATE products SET stock = 7 ...               │
//! │     (two buyers both read 10, both write 4)                            │
//! │                                                                         │
//! │  ✅ CORRECT: compare-and-set in one statement                          │
//! │     UPDATE products SET stock = stock - 6                              │
//! │     WHERE id = ? AND stock >= 6                                        │
//! │     (the second buyer matches zero rows)                               │
//! │                                                                         │
//! │  Then, in the same transaction:                                        │
//! │     availability = Availability::from_stock(new stock)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use protech_core::{Availability, CoreError, NewProduct, Product, ProductPatch};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get(1).await?;
/// let product = repo.adjust_stock(1, -2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by id, or `NotFound`.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find(&self, id: i64) -> DbResult<Option<Product>> {
        debug!(id, "Fetching product");

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by exact name. Used to keep seeding idempotent.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE name = ?1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the whole catalogue in id order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists one catalogue section in id order.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE category = ?1 ORDER BY id",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        debug!(category, count = products.len(), "Listed products by category");
        Ok(products)
    }

    /// Creates a catalogue entry.
    ///
    /// Stock defaults to zero; availability is derived from it.
    pub async fn create(&self, new: &NewProduct) -> DbResult<Product> {
        new.validate()?;

        debug!(name = %new.name, "Inserting product");

        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, category, price, description, specs, image_url,
                stock, availability, warranty, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            RETURNING *
            "#,
        )
        .bind(new.name.trim())
        .bind(new.category.trim())
        .bind(new.price)
        .bind(&new.description)
        .bind(&new.specs)
        .bind(&new.image_url)
        .bind(new.initial_stock())
        .bind(new.initial_availability().label())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies a partial update.
    ///
    /// Absent fields keep their stored value. When the patch carries a
    /// stock level, availability is re-derived in the same statement.
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> DbResult<Product> {
        patch.validate()?;

        debug!(id, stock = ?patch.stock, "Updating product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                category = COALESCE(?3, category),
                price = COALESCE(?4, price),
                description = COALESCE(?5, description),
                specs = COALESCE(?6, specs),
                image_url = COALESCE(?7, image_url),
                stock = COALESCE(?8, stock),
                availability = COALESCE(?9, availability),
                warranty = COALESCE(?10, warranty),
                updated_at = ?11
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.category.as_deref().map(str::trim))
        .bind(patch.price)
        .bind(&patch.description)
        .bind(&patch.specs)
        .bind(&patch.image_url)
        .bind(patch.stock)
        .bind(patch.availability().map(|a| a.label()))
        .bind(&patch.warranty)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds `delta` (negative to remove) to a product's stock.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(InsufficientStock)` - Stock would go below zero; nothing changed
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<Product> {
        debug!(id, delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let Some(stock) = shift_stock(&mut *tx, id, delta, now).await? else {
            return match current_stock(&mut *tx, id).await? {
                Some(available) => Err(CoreError::InsufficientStock {
                    product_id: id,
                    available,
                    requested: -delta,
                }
                .into()),
                None => Err(DbError::not_found("Product", id)),
            };
        };

        let product = write_availability(&mut *tx, id, stock).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(product)
    }

    /// Sets the stock level outright (restocking after an inventory count).
    pub async fn set_stock(&self, id: i64, stock: i64) -> DbResult<Product> {
        self.update(
            id,
            &ProductPatch {
                stock: Some(stock),
                ..Default::default()
            },
        )
        .await
    }

    /// Removes a product from the catalogue.
    ///
    /// Order items keep their snapshot of it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts catalogue entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Stock helpers (shared with the order engine)
// =============================================================================

/// Compare-and-set stock change: applies `delta` only if the result stays
/// non-negative. Returns the new stock, or `None` when no row matched.
pub(crate) async fn shift_stock(
    conn: &mut SqliteConnection,
    id: i64,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1 AND stock + ?2 >= 0
        RETURNING stock
        "#,
    )
    .bind(id)
    .bind(delta)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(stock)
}

/// Stores the availability label matching `stock`.
pub(crate) async fn write_availability(
    conn: &mut SqliteConnection,
    id: i64,
    stock: i64,
) -> DbResult<Product> {
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET availability = ?2 WHERE id = ?1 RETURNING *",
    )
    .bind(id)
    .bind(Availability::from_stock(stock).label())
    .fetch_one(&mut *conn)
    .await?;

    Ok(product)
}

/// Reads the stock level inside a transaction. `None` if the product is gone.
pub(crate) async fn current_stock(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(stock)
}

// =============================================================================
// Unit Tests
// =============================================================================
