//! # Repository Module
//!
//! The stores behind the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  API layer / Storefront                                                │
//! │       │                                                                 │
//! │       │  db.products().get(1)                                          │
//! │       ▼                                                                 │
//! │  ProductRepository (Catalog Store)                                     │
//! │  ├── get / list / list_by_category                                     │
//! │  ├── create / update / delete                                          │
//! │  └── adjust_stock / set_stock                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog Store
//! - [`UserRepository`](user::UserRepository) - Identity Store
//! - [`OrderRepository`](order::OrderRepository) - Order reads and status writes

pub mod order;
pub mod product;
pub mod user;
