//! Input validation for credentials.

use validator::ValidateEmail;

use super::AuthError;

/// Validate an email address and return its normalised (trimmed, lowercase) form.
pub fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.validate_email() {
        return Err(AuthError::ValidationError(
            "Please enter a valid email address".into(),
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_normalises() {
        assert_eq!(normalize_email("  A@X.com ").unwrap(), "a@x.com");
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "plain", "a@", "@x.com", "a b@x.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }
}
