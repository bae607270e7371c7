//! # Error Types
//!
//! Domain-specific error types for protech-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  protech-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule failures                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Transport-neutral classification               │
//! │                                                                         │
//! │  protech-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures + wrapped CoreError           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → API layer status code   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, requested quantity, ...)
//! 3. Errors are enum variants, never String
//! 4. Every error maps to exactly one [`ErrorKind`]

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Classification of every failure the storefront core can return.
///
/// The API layer maps these to transport status codes; the mapping itself is
/// not part of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unauthenticated,
    Unauthorized,
    ValidationFailure,
    EmptyCart,
    NoValidItems,
    ProductNotFound,
    InsufficientStock,
    InvalidStatus,
    StorageFailure,
}

impl ErrorKind {
    /// Business-rule failures fail again deterministically on resubmission.
    ///
    /// Only storage failures may be retried by the caller.
    pub const fn is_business_rule(&self) -> bool {
        !matches!(self, ErrorKind::StorageFailure)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations detected before any
/// state is mutated.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line references a product id that is not in the catalogue.
    ///
    /// ## When This Occurs
    /// - Product id never existed
    /// - Product was deleted between browsing and checkout
    #[error("Product with ID {0} not found")]
    ProductNotFound(i64),

    /// Insufficient stock to fulfil a cart line.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 100)
    ///      │
    ///      ▼
    /// Check stock: available=50
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 1, available: 50, requested: 100 }
    ///      │
    ///      ▼
    /// UI shows: "Only 50 left in stock"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// The submitted cart has no lines at all.
    #[error("Cart is empty")]
    EmptyCart,

    /// Every cart line was skipped (missing fields or non-positive quantity).
    #[error("No valid items in cart")]
    NoValidItems,

    /// Order id does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// Status label is unknown, or the transition is not allowed.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// Registration with an email address that already has an account.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Login with an unknown email or a wrong password.
    ///
    /// Deliberately does not say which of the two was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The caller could not be resolved to a registered user.
    #[error("Authentication required")]
    Unauthenticated,

    /// The caller is authenticated but lacks the admin role.
    #[error("Admin access required to {action}")]
    Unauthorized { action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an Unauthorized error for the named action.
    pub fn unauthorized(action: impl Into<String>) -> Self {
        CoreError::Unauthorized {
            action: action.into(),
        }
    }

    /// Returns the taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_) => ErrorKind::ProductNotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::EmptyCart => ErrorKind::EmptyCart,
            CoreError::NoValidItems => ErrorKind::NoValidItems,
            CoreError::OrderNotFound(_) => ErrorKind::NotFound,
            CoreError::InvalidStatus(_) => ErrorKind::InvalidStatus,
            CoreError::EmailTaken(_) => ErrorKind::Conflict,
            CoreError::InvalidCredentials | CoreError::Unauthenticated => {
                ErrorKind::Unauthenticated
            }
            CoreError::Unauthorized { .. } => ErrorKind::Unauthorized,
            CoreError::Validation(_) => ErrorKind::ValidationFailure,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, non-numeric quantity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
