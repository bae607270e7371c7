//! # protech-db: Storage and Order Placement for the ProTech storefront
//!
//! This crate provides the stores and the order engine on top of SQLite,
//! using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ProTech Storefront Data Flow                        │
//! │                                                                         │
//! │  API layer (POST /orders)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     protech-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  Storefront   │───►│  OrderEngine  │───►│ Repositories │  │   │
//! │  │   │ (AccessGuard) │    │ (engine.rs)   │    │ Product/User │  │   │
//! │  │   │               │    │               │    │ Order        │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                         │          │   │
//! │  │           └──────── Database (pool.rs) ◄────────────┘          │   │
//! │  │                     migrations (embedded)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog, identity and order stores
//! - [`engine`] - The order placement transaction
//! - [`access`] - Admin role checks
//! - [`storefront`] - Privilege-gated facade
//! - [`password`] - Password hashing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use protech_db::{Database, StoreConfig};
//! use protech_core::CartLine;
//!
//! let config = StoreConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let placed = db.engine().place_order(user_id, &[CartLine::new(1, 2)]).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod config;
pub mod engine;
pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;
pub mod storefront;

// =============================================================================
// Re-exports
// =============================================================================

pub use access::AccessGuard;
pub use config::{ConfigError, StoreConfig};
pub use engine::OrderEngine;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use storefront::Storefront;

pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;

/// Initializes the tracing subscriber for the command-line tools.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=protech=trace` - Show trace for protech crates only
/// - Default: INFO level, sqlx warnings only
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,protech=debug,sqlx=warn"));

    // Already installed (tests, embedding): keep the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
