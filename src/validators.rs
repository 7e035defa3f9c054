use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};

/// Input validation for the registration and mutation boundaries

// Compiled once at first use; the pattern is a compile-time constant in practice
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("hardcoded email regex is invalid")
});

pub const MIN_PASSWORD_LEN: usize = 5;

/// Validate email format (`local@domain.tld`)
pub fn validate_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validate password length (minimum 5 characters)
pub fn validate_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN
}

/// Reject empty required fields with the field name in the message
pub fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
