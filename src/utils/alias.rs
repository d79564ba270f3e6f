//! Alias generation and validation utilities.
//!
//! Generated aliases are short base-36 tokens. Custom aliases supplied by callers
//! are validated against a conservative, URL-path-safe character set.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Length of generated aliases.
pub const GENERATED_ALIAS_LENGTH: usize = 6;

/// Minimum and maximum length of custom aliases.
pub const CUSTOM_ALIAS_MIN: usize = 3;
pub const CUSTOM_ALIAS_MAX: usize = 64;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Aliases that would shadow service routes.
const RESERVED_ALIASES: &[&str] = &["api", "health"];

/// Generates a random 6-character lowercase alphanumeric alias.
///
/// Collisions are possible and are detected by the store's unique constraint,
/// not here.
pub fn generate_alias() -> String {
    let mut rng = rand::rng();

    (0..GENERATED_ALIAS_LENGTH)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// Validates a caller-supplied alias.
///
/// # Rules
///
/// - Length: 3-64 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Case is preserved and significant
/// - Cannot be a reserved route segment
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if alias.len() < CUSTOM_ALIAS_MIN || alias.len() > CUSTOM_ALIAS_MAX {
        return Err(AppError::bad_request(
            "Alias must be 3-64 characters",
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Alias can only contain letters, digits, hyphens and underscores",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES.contains(&alias) {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
