//! # Validation Module
//!
//! Input validation utilities for Shopbook.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: caller UI/forms     - immediate feedback, format checks
//! Layer 2: THIS MODULE         - business rule validation
//! Layer 3: SQLite constraints  - NOT NULL, UNIQUE, foreign keys
//! ```
//!
//! The balance/status derivation in [`crate::finance`] is deliberately
//! total: it never rejects inputs. These validators are its precondition -
//! negative amounts and overlarge payments must be stopped here, before
//! the derivation or the database ever sees them.
//!
//! ## Usage
//! ```rust
//! use shopbook_core::validation::{validate_amount_cents, validate_payment};
//!
//! // Before creating an expense
//! validate_amount_cents("amount_due", 50_000).unwrap();
//!
//! // Before recording a payment against a 60.00 balance
//! validate_payment(4_000, 6_000).unwrap();
//! assert!(validate_payment(7_000, 6_000).is_err()); // exceeds balance
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum quantity of a single line item.
///
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use shopbook_core::validation::validate_sku;
///
/// assert!(validate_sku("PEN-01").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product, category, vendor, customer, expense
/// title).
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount in cents.
///
/// ## Rules
/// - Must be non-negative (zero is allowed: free items, waived bills)
///
/// This is the documented precondition of the financial-state derivation,
/// which itself accepts anything.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a payment against the outstanding balance.
///
/// ## Rules
/// - Payment must be positive
/// - Payment must not exceed the outstanding balance ("amount paid cannot
///   exceed amount due")
///
/// The derivation itself tolerates overpayment (negative balance); this
/// rule exists at the caller layer only, so deliberate overpayment can be
/// allowed by skipping this check.
pub fn validate_payment(amount_cents: i64, outstanding_cents: i64) -> ValidationResult<()> {
    if amount_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment".to_string(),
        });
    }

    if amount_cents > outstanding_cents {
        return Err(ValidationError::Exceeds {
            field: "payment".to_string(),
            limit: outstanding_cents,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use shopbook_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("PEN-01").is_ok());
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Ballpoint Pen").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("title", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("amount_due", 0).is_ok());
        assert!(validate_amount_cents("amount_due", 1099).is_ok());
        assert!(validate_amount_cents("amount_due", -1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9_999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(10_000).is_err());
    }

    #[test]
    fn test_validate_payment() {
        assert!(validate_payment(4_000, 6_000).is_ok());
        assert!(validate_payment(6_000, 6_000).is_ok());

        // Overpayment is a caller-layer rejection.
        assert!(validate_payment(7_000, 6_000).is_err());
        assert!(validate_payment(0, 6_000).is_err());
        assert!(validate_payment(-100, 6_000).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
