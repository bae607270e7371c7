//! # protech-core: Pure Business Logic for the ProTech storefront
//!
//! This crate is the **heart** of the storefront backend. It contains the
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ProTech Storefront Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend (catalogue, cart, checkout)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP (external)              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               API layer: auth, routing, marshaling              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ protech-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CartLine  │  │   rules   │  │   │
//! │  │   │   Order   │  │           │  │ price_cart│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          protech-db (stores, migrations, OrderEngine)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, User, Order, OrderItem, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart lines and server-side pricing of a cart
//! - [`error`] - Domain error types and the error taxonomy
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use protech_core::types::Availability;
//!
//! assert_eq!(Availability::from_stock(0), Availability::OutOfStock);
//! assert_eq!(Availability::from_stock(3), Availability::LimitedStock);
//! assert_eq!(Availability::from_stock(48).label(), "In Stock");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{price_cart, CartLine, OrderDraft, OrderItemDraft, QuantityInput};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level below which a product is labelled "Limited Stock".
pub const LIMITED_STOCK_THRESHOLD: i64 = 5;

/// ISO 4217 code of the storefront currency (Central African CFA franc).
pub const CURRENCY_CODE: &str = "XAF";
