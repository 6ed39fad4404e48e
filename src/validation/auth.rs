use crate::error::{AppError, Result};

/// Checks that a login request carries both credentials.
///
/// # Arguments
///
/// * `username` - The submitted username, if any.
/// * `password` - The submitted password, if any.
///
/// # Returns
///
/// The two values, or `AppError::Validation` when either is missing or blank.
pub fn require_credentials<'a>(
    username: Option<&'a str>,
    password: Option<&'a str>,
) -> Result<(&'a str, &'a str)> {
    match (username, password) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err(AppError::Validation(
            "Username and password are required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_fields_present() {
        assert_eq!(
            require_credentials(Some("admin"), Some("admin123")).unwrap(),
            ("admin", "admin123")
        );
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        assert!(require_credentials(None, Some("x")).is_err());
        assert!(require_credentials(Some("admin"), None).is_err());
        assert!(require_credentials(Some("  "), Some("x")).is_err());
        assert!(require_credentials(Some("admin"), Some("")).is_err());
    }
}
