//! # Validation Module
//!
//! Input validation utilities for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend scripts                                             │
//! │  ├── Basic format checks (empty, email shape, phone shape)             │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Stores and OrderEngine (Rust)                                │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints (stock >= 0, price >= 0)             │
//! │  ├── UNIQUE constraint on users.email                                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use protech_core::validation::{validate_email, validate_stock};
//!
//! assert!(validate_email("client@protech.cm").is_ok());
//! assert!(validate_stock(5).is_ok());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use protech_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Logitech MX Keys").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, 100)
}

/// Validates a catalogue category (non-empty, at most 50 characters).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    require_text("category", category, 50)
}

/// Validates a customer's full name.
///
/// ## Rules
/// - May be empty (registration accepts a missing name)
/// - At most 100 characters
pub fn validate_full_name(full_name: &str) -> ValidationResult<()> {
    if full_name.trim().chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "full_name".to_string(),
            max: 100,
        });
    }
    Ok(())
}

/// Validates a phone number (at most 20 characters, digits, spaces and `+`).
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '+')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces and '+'".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Shape `local@domain.tld` with no whitespace
/// - At most 120 characters
///
/// Case is preserved: addresses are matched exactly.
///
/// ## Example
/// ```rust
/// use protech_core::validation::validate_email;
///
/// assert!(validate_email("admin@protechsolutions.cm").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// assert!(validate_email("a b@c.cm").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 120,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a password supplied at registration or login.
///
/// Only presence is checked; strength rules belong to the frontend.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use protech_core::validation::validate_price;
///
/// assert!(validate_price(450_000).is_ok());
/// assert!(validate_price(0).is_ok());
/// assert!(validate_price(-100).is_err());
/// ```
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level (non-negative integer).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
