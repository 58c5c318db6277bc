//! Input normalization shared by the write paths.

use crate::errors::{Error, Result};

/// Lower-cases and trims an email so lookups are case-insensitive.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an email address and returns its normalized form.
pub fn parse_email(email: &str) -> Result<String> {
    let normalized = normalize_email(email);
    normalized
        .parse::<lettre::Address>()
        .map_err(|_| Error::validation(format!("Invalid email address: {}", email.trim())))?;
    Ok(normalized)
}

/// Trims a required text field, rejecting empty input.
pub fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field, mapping blank input to `None`.
#[must_use]
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_normalize_email_is_case_insensitive() {
        assert_eq!(normalize_email("  Jane.Doe@Example.ORG "), "jane.doe@example.org");
    }

    #[test]
    fn test_parse_email_rejects_garbage() {
        assert!(parse_email("alum@example.org").is_ok());
        assert!(matches!(parse_email("not-an-email"), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_required_and_optional_trim() {
        assert_eq!(required("Title", "  Grand Reunion ").unwrap(), "Grand Reunion");
        assert!(required("Title", "   ").is_err());
        assert_eq!(optional(Some("  ".to_string())), None);
        assert_eq!(optional(Some(" Hall A ".to_string())), Some("Hall A".to_string()));
    }
}
