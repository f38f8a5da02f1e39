//! Synchronous input validation for provisioning and edits.
//!
//! Validation failures are reported to the caller and never persisted.

use regex::Regex;

use crate::error::{DomainError, DomainResult};

pub const MIN_PASSWORD_LEN: usize = 6;

fn matches_pattern(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).is_ok_and(|re| re.is_match(value))
}

/// Validate an already-normalized tenant code.
pub fn validate_tenant_code(code: &str) -> DomainResult<()> {
    if matches_pattern(r"^[A-Z0-9]{3,10}$", code) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "tenant code must be 3-10 letters or digits",
        ))
    }
}

/// Validate an already-normalized username.
pub fn validate_username(username: &str) -> DomainResult<()> {
    if matches_pattern(r"^[a-z0-9._-]{3,32}$", username) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "username must be 3-32 characters of a-z, 0-9, '.', '_' or '-'",
        ))
    }
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Reject blank required fields; returns the trimmed value.
pub fn require_non_blank<'a>(field: &str, value: &'a str) -> DomainResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}
