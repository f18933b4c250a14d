//! # Validation Module
//!
//! Input validation, applied at the HTTP edge before any storage access.
//! A validation failure rejects the whole request; nothing is written.

use crate::error::ValidationError;
use crate::types::CartLine;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item display name.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - Non-empty, at most 50 characters
/// - Letters, digits, dots, hyphens, underscores
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart-line quantity.
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

/// Validates a price in paise. Zero is allowed (complimentary items).
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a dine-in table number (1-based).
pub fn validate_table_number(table_no: i64) -> ValidationResult<()> {
    if table_no < 1 {
        return Err(ValidationError::MustBePositive {
            field: "table number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validation
// =============================================================================

/// Validates a whole cart before a sale is attempted.
///
/// All-or-nothing: the first bad line rejects the cart. Stock availability
/// is NOT checked here (that requires the store and happens inside the sale
/// transaction).
pub fn validate_cart(cart: &[CartLine]) -> ValidationResult<()> {
    if cart.is_empty() {
        return Err(ValidationError::Required {
            field: "cart".to_string(),
        });
    }

    if cart.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    for line in cart {
        validate_item_name(&line.name)?;
        validate_quantity(line.qty)?;
        validate_price_paise(line.unit_price_paise)?;
        validate_tax_rate_bps(line.tax_rate_bps)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: i64) -> CartLine {
        CartLine {
            item_id: 1,
            name: "Paneer Tikka".to_string(),
            qty,
            unit_price_paise: 22_000,
            tax_rate_bps: 500,
            mrp_paise: None,
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_paise() {
        assert!(validate_price_paise(0).is_ok());
        assert!(validate_price_paise(1099).is_ok());
        assert!(validate_price_paise(-100).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("cashier").is_ok());
        assert!(validate_username("ravi.kumar_2").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_cart_rejects_empty() {
        assert!(matches!(
            validate_cart(&[]),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_cart_rejects_bad_line() {
        let cart = vec![line(2), line(0)];
        assert!(validate_cart(&cart).is_err());
    }

    #[test]
    fn test_validate_cart_accepts_good_cart() {
        let cart = vec![line(2), line(3)];
        assert!(validate_cart(&cart).is_ok());
    }

    #[test]
    fn test_validate_table_number() {
        assert!(validate_table_number(1).is_ok());
        assert!(validate_table_number(0).is_err());
        assert!(validate_table_number(-4).is_err());
    }
}
