//! Field validation helpers.
//!
//! Validation reports the first violated rule only, as a 400 with the rule's
//! message. Helpers here return that message so handlers can bail with `?`.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{BazaarError, Result};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{10,15}$").unwrap())
}

/// Require a non-empty trimmed value.
pub fn required<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(BazaarError::validation(message)),
    }
}

/// Name: 2 to 50 characters after trimming.
pub fn name(value: &str) -> Result<String> {
    let value = value.trim();
    if value.len() < 2 {
        return Err(BazaarError::validation("Name must be at least 2 characters"));
    }
    if value.len() > 50 {
        return Err(BazaarError::validation("Name cannot exceed 50 characters"));
    }
    Ok(value.to_string())
}

/// Shop name: 2 to 100 characters after trimming.
pub fn shop_name(value: &str) -> Result<String> {
    let value = value.trim();
    if value.len() < 2 {
        return Err(BazaarError::validation(
            "Shop name must be at least 2 characters",
        ));
    }
    if value.len() > 100 {
        return Err(BazaarError::validation(
            "Shop name cannot exceed 100 characters",
        ));
    }
    Ok(value.to_string())
}

/// Email: trimmed, lowercased, must match the address pattern.
pub fn email(value: &str) -> Result<String> {
    let value = value.trim().to_lowercase();
    if !email_pattern().is_match(&value) {
        return Err(BazaarError::validation(
            "Please provide a valid email address",
        ));
    }
    Ok(value)
}

/// Password: at least 8 characters. Returns the raw password for hashing.
pub fn password(value: &str) -> Result<&str> {
    if value.len() < 8 {
        return Err(BazaarError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(value)
}

/// Phone number: 10 to 15 digits.
pub fn phone_no(value: &str) -> Result<String> {
    let value = value.trim();
    if !phone_pattern().is_match(value) {
        return Err(BazaarError::validation(
            "Please provide a valid phone number",
        ));
    }
    Ok(value.to_string())
}

/// Rating: 1 to 5 inclusive.
pub fn rating(value: i32) -> Result<i32> {
    if !(1..=5).contains(&value) {
        return Err(BazaarError::validation("Rating must be between 1 and 5"));
    }
    Ok(value)
}

/// Price: non-negative.
pub fn price(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(BazaarError::validation("Price must be 0 or greater"));
    }
    Ok(value)
}

/// Discount percentage: 0 to 100.
pub fn discount(value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(BazaarError::validation(
            "Discount must be between 0 and 100",
        ));
    }
    Ok(value)
}

/// Order quantity: at least 1.
pub fn quantity(value: i64) -> Result<i64> {
    if value < 1 {
        return Err(BazaarError::validation("Quantity must be at least 1"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        assert_eq!(email("  Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(email("not-an-email").is_err());
        assert!(email("a b@example.com").is_err());
    }

    #[test]
    fn test_name_bounds() {
        assert!(name("A").is_err());
        assert!(name(&"x".repeat(51)).is_err());
        assert_eq!(name("  Bob  ").unwrap(), "Bob");
    }

    #[test]
    fn test_phone_digits_only() {
        assert!(phone_no("1234567890").is_ok());
        assert!(phone_no("12345").is_err());
        assert!(phone_no("12345678901234567").is_err());
        assert!(phone_no("+12345678901").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(password("short").is_err());
        assert!(password("longenough").is_ok());
    }

    #[test]
    fn test_numeric_rules() {
        assert!(rating(0).is_err());
        assert!(rating(5).is_ok());
        assert!(price(-1.0).is_err());
        assert!(discount(100.5).is_err());
        assert!(quantity(0).is_err());
    }

    #[test]
    fn test_required_first_error_message() {
        let err = required(None, "Name is required").unwrap_err();
        assert_eq!(err.user_message(), "Name is required");
        let err = required(Some("   "), "Name is required").unwrap_err();
        assert_eq!(err.user_message(), "Name is required");
    }
}
