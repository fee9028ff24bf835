/// Input validators
///
/// Validates credentials-facing input before it reaches the database:
/// email format (RFC 5322 simplified) and display names, with length limits.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::{AppError, ValidationError};

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_NAME_LENGTH: usize = 100;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address and returns its canonical (trimmed, lowercased)
/// form. Emails are unique case-insensitively, so all lookups and storage use
/// the canonical form.
pub fn is_valid_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()).into());
    }
    if email.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH).into());
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH).into());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidFormat("email".to_string()).into());
    }

    Ok(email.to_lowercase())
}

/// Validates a display name: non-empty after trimming, bounded length.
pub fn is_valid_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()).into());
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name".to_string(), MAX_NAME_LENGTH).into());
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email_and_lowercases_it() {
        let email = is_valid_email("Admin@X.com").expect("should be valid");
        assert_eq!(email, "admin@x.com");
    }

    #[test]
    fn rejects_missing_at_sign() {
        assert!(is_valid_email("not-an-email").is_err());
    }

    #[test]
    fn rejects_empty_email() {
        assert!(is_valid_email("   ").is_err());
    }

    #[test]
    fn rejects_overlong_email() {
        let local = "a".repeat(MAX_EMAIL_LENGTH);
        assert!(is_valid_email(&format!("{}@x.com", local)).is_err());
    }

    #[test]
    fn trims_and_accepts_name() {
        assert_eq!(is_valid_name("  Jane Doe ").unwrap(), "Jane Doe");
    }

    #[test]
    fn rejects_empty_name() {
        assert!(is_valid_name("").is_err());
    }
}
