//! Input checks shared by the registration and add-project forms.

use crate::error::CoreError;

/// Longest accepted user or project name, in characters.
///
/// Names are echoed into the session cookie (login identity and flash), so
/// they must stay well inside the browser's 4 KiB cookie limit.
pub const MAX_NAME_CHARS: usize = 100;

/// Trim `value` and require it to be non-empty and at most
/// [`MAX_NAME_CHARS`] characters. Returns the trimmed name.
pub fn validate_name(label: &str, value: &str) -> Result<String, CoreError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(format!("{label} is required")));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(CoreError::Validation(format!(
            "{label} must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts_normal_names() {
        assert_eq!(validate_name("Name", "  alice ").unwrap(), "alice");
    }

    #[test]
    fn rejects_blank_names() {
        let err = validate_name("Name", "   ").unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg == "Name is required"));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MAX_NAME_CHARS);
        assert!(validate_name("Name", &at_limit).is_ok());

        let over = "x".repeat(MAX_NAME_CHARS + 1);
        assert!(matches!(
            validate_name("Project name", &over),
            Err(CoreError::Validation(_))
        ));
    }
}
