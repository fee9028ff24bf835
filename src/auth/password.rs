/// Password hashing and verification
///
/// Bcrypt for storage, with strength rules enforced before hashing.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
// Bcrypt truncates past 72 bytes; reject well before that.
const MAX_PASSWORD_LENGTH: usize = 64;

/// Hash a password for storage.
///
/// # Errors
/// Returns a validation error when the password fails the strength rules, or
/// an internal error if bcrypt itself fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a candidate password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Strength rules: 8-64 characters, at least one digit, one lowercase and
/// one uppercase letter.
fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_and_verifies() {
        let password = "ValidPassword123";
        let hashed = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hashed);
        assert!(hashed.starts_with("$2"));
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("WrongPassword123", &hashed).unwrap());
    }

    #[test]
    fn rejects_short_password() {
        assert!(hash_password("Short1").is_err());
    }

    #[test]
    fn rejects_overlong_password() {
        let long = format!("A1{}", "a".repeat(MAX_PASSWORD_LENGTH));
        assert!(hash_password(&long).is_err());
    }

    #[test]
    fn requires_character_classes() {
        assert!(hash_password("nodigitshere").is_err());
        assert!(hash_password("NOLOWERCASE1").is_err());
        assert!(hash_password("nouppercase1").is_err());
        assert!(hash_password("ValidPassword123").is_ok());
    }
}
