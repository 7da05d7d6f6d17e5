//! Explicit validation rules applied before persistence.

use thiserror::Error;

/// Maximum user name length in characters (not bytes).
pub const MAX_USER_NAME_CHARS: usize = 50;

/// Validation failure for user-provided fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("name too long ({actual} chars, max {max})")]
    NameTooLong { actual: usize, max: usize },
    #[error("input must be a number, got `{0}`")]
    InvalidInput(String),
}

/// Trims and validates a user name.
///
/// Returns the trimmed name ready for storage.
pub fn validate_user_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let actual = trimmed.chars().count();
    if actual > MAX_USER_NAME_CHARS {
        return Err(ValidationError::NameTooLong {
            actual,
            max: MAX_USER_NAME_CHARS,
        });
    }

    Ok(trimmed.to_string())
}
