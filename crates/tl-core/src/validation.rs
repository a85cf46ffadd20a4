//! Input rules shared by the posting forms and the account forms.

use crate::error::{AppError, Result};

pub const MIN_TELLL_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 8;
const HANDLE_CHARS: std::ops::RangeInclusive<usize> = 3..=30;

/// Checks telll and comment bodies. Returns the trimmed text.
pub fn validate_telll_text(raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.chars().count() < MIN_TELLL_CHARS {
        return Err(AppError::ValidationError(format!(
            "Minimum {MIN_TELLL_CHARS} characters."
        )));
    }
    Ok(text.to_string())
}

/// Usernames and community slugs: lowercase ASCII letters, digits and `_`.
pub fn validate_handle(raw: &str) -> Result<String> {
    let handle = raw.trim().to_ascii_lowercase();
    if !HANDLE_CHARS.contains(&handle.len()) {
        return Err(AppError::ValidationError(format!(
            "Must be between {} and {} characters.",
            HANDLE_CHARS.start(),
            HANDLE_CHARS.end()
        )));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(AppError::ValidationError(
            "Only letters, digits and underscores are allowed.".into(),
        ));
    }
    Ok(handle)
}

pub fn validate_password(raw: &str) -> Result<()> {
    if raw.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::ValidationError(format!(
            "Password needs at least {MIN_PASSWORD_CHARS} characters."
        )));
    }
    Ok(())
}

/// Empty optional form fields become `None`.
pub fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telll_text_needs_three_chars_after_trim() {
        assert!(validate_telll_text("  hi  ").is_err());
        assert_eq!(validate_telll_text("  hey ").unwrap(), "hey");
    }

    #[test]
    fn telll_text_counts_chars_not_bytes() {
        assert!(validate_telll_text("éé").is_err());
        assert!(validate_telll_text("ééé").is_ok());
    }

    #[test]
    fn handle_is_lowercased_and_checked() {
        assert_eq!(validate_handle("Ferris_42").unwrap(), "ferris_42");
        assert!(validate_handle("ab").is_err());
        assert!(validate_handle("no spaces").is_err());
        assert!(validate_handle(&"a".repeat(31)).is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn non_empty_drops_blank_fields() {
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(Some(" x ".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
