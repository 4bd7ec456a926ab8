//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, supplier
pub const MAX_NAME_LEN: usize = 200;

/// Short identifiers: username, sku, color, size
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Numeric limits ──────────────────────────────────────────────────

/// Unit price upper bound (KRW)
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Quantity upper bound for order lines and stock variants
pub const MAX_QUANTITY: i64 = 1_000_000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
///
/// The failing field is recorded in the error details.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_field(field, format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::invalid_field(
            field,
            format!(
                "{field} is too long ({} chars, max {max_len})",
                value.chars().count()
            ),
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", v.chars().count()),
        ));
    }
    Ok(())
}

/// Validate an integer upper bound; `ValueOutOfRange` names the field.
pub fn validate_at_most(value: i64, field: &str, max: i64) -> Result<(), AppError> {
    if value > max {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be at most {max}"),
        )
        .with_detail(field, max));
    }
    Ok(())
}

/// Trim a name and treat blank input as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an optional integer query parameter; blank means absent.
pub fn parse_optional_i64(value: Option<&str>, field: &str) -> Result<Option<i64>, AppError> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::invalid_field(field, format!("{field} must be an integer"))),
    }
}

/// Parse a required integer query parameter.
pub fn parse_required_i64(value: Option<&str>, field: &str) -> Result<i64, AppError> {
    parse_optional_i64(value, field)?
        .ok_or_else(|| AppError::invalid_field(field, format!("{field} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_blank() {
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.details.unwrap().contains_key("name"));
    }

    #[test]
    fn test_required_text_counts_chars_not_bytes() {
        // 3 Hangul syllables are 9 bytes
        assert!(validate_required_text("목걸이", "name", 3).is_ok());
        assert!(validate_required_text("목걸이", "name", 2).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "size", 3).is_ok());
        assert!(validate_optional_text(&Some("11호".into()), "size", 3).is_ok());
        assert!(validate_optional_text(&Some("long size".into()), "size", 3).is_err());
    }

    #[test]
    fn test_at_most() {
        assert!(validate_at_most(MAX_QUANTITY, "quantity", MAX_QUANTITY).is_ok());
        let err = validate_at_most(MAX_QUANTITY + 1, "quantity", MAX_QUANTITY).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(err.details.unwrap().contains_key("quantity"));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  골드 ")), Some("골드"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_optional_i64(None, "supplierId").unwrap(), None);
        assert_eq!(parse_optional_i64(Some(""), "supplierId").unwrap(), None);
        assert_eq!(parse_optional_i64(Some(" 7 "), "supplierId").unwrap(), Some(7));
        assert!(parse_optional_i64(Some("abc"), "supplierId").is_err());

        assert_eq!(parse_required_i64(Some("2024"), "startYear").unwrap(), 2024);
        let err = parse_required_i64(None, "startYear").unwrap_err();
        assert!(err.details.unwrap().contains_key("startYear"));
    }
}
