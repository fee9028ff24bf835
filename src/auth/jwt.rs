/// Token codec
///
/// Encodes claim sets into signed HS512 tokens and decodes/verifies token
/// strings back into typed claims. Verification order: structural
/// well-formedness, then signature (constant-time, inside jsonwebtoken), then
/// expiry with zero clock-skew tolerance. Every failure maps to a typed
/// `AuthError` with no partial-claim leakage.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::auth::keys::SigningKeys;
use crate::error::{AppError, AuthError};

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

pub fn encode_access_token(
    claims: &AccessClaims,
    keys: &SigningKeys,
) -> Result<String, AppError> {
    sign(claims, keys)
}

pub fn encode_refresh_token(
    claims: &RefreshClaims,
    keys: &SigningKeys,
) -> Result<String, AppError> {
    sign(claims, keys)
}

/// Decode and verify an access token.
pub fn decode_access_token(token: &str, keys: &SigningKeys) -> Result<AccessClaims, AppError> {
    let claims: AccessClaims = verify(token, keys)?;
    check_expiry(claims.exp)?;
    Ok(claims)
}

/// Decode and verify a refresh token.
///
/// Access tokens fail here structurally (their claim shape is different), so
/// a capability-bearing token can never be used to rotate credentials.
pub fn decode_refresh_token(token: &str, keys: &SigningKeys) -> Result<RefreshClaims, AppError> {
    let claims: RefreshClaims = verify(token, keys)?;
    check_expiry(claims.exp)?;
    Ok(claims)
}

fn sign<C: Serialize>(claims: &C, keys: &SigningKeys) -> Result<String, AppError> {
    encode(&Header::new(JWT_ALGORITHM), claims, keys.encoding())
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn verify<C: DeserializeOwned>(token: &str, keys: &SigningKeys) -> Result<C, AppError> {
    // Expiry is enforced by `check_expiry` with zero leeway; jsonwebtoken's
    // built-in check carries a default 60s leeway.
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = false;

    decode::<C>(token, keys.decoding(), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("Token verification failed: {}", e);
            AppError::Auth(classify(&e))
        })
}

fn classify(err: &jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::BadSignature,
        // Wrong segment count, bad base64, claim-shape mismatch, wrong
        // algorithm in the header: all structural.
        _ => AuthError::Malformed,
    }
}

/// Expiry check with zero clock-skew tolerance: a token is valid only while
/// `exp > now`.
fn check_expiry(exp: i64) -> Result<(), AppError> {
    let now = chrono::Utc::now().timestamp();
    if exp <= now {
        return Err(AppError::Auth(AuthError::Expired { expired_at: exp }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::TokenUser;

    fn test_keys() -> SigningKeys {
        SigningKeys::from_base64_secret("dGVzdC1zZWNyZXQta2V5LWF0LWxlYXN0LTMyLWNoYXJhY3RlcnMtbG9uZw==")
            .expect("Failed to build test keys")
    }

    fn other_keys() -> SigningKeys {
        SigningKeys::from_base64_secret("YW5vdGhlci1zZWNyZXQta2V5LWFsc28tMzItY2hhcmFjdGVycy1sb25n")
            .expect("Failed to build test keys")
    }

    fn test_user() -> TokenUser {
        TokenUser {
            id: 1,
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let keys = test_keys();
        let claims = AccessClaims::new(
            test_user(),
            vec!["ROLE_USER_CREATE".to_string(), "ROLE_USER_UPDATE".to_string()],
            900,
        );

        let token = encode_access_token(&claims, &keys).expect("Failed to encode");
        let decoded = decode_access_token(&token, &keys).expect("Failed to decode");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn refresh_token_round_trip() {
        let keys = test_keys();
        let claims = RefreshClaims::new(test_user(), 604_800);

        let token = encode_refresh_token(&claims, &keys).expect("Failed to encode");
        let decoded = decode_refresh_token(&token, &keys).expect("Failed to decode");

        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_has_three_segments() {
        let keys = test_keys();
        let claims = AccessClaims::new(test_user(), vec![], 900);
        let token = encode_access_token(&claims, &keys).unwrap();

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn tampered_signature_is_a_bad_signature() {
        let keys = test_keys();
        let claims = AccessClaims::new(test_user(), vec![], 900);
        let token = encode_access_token(&claims, &keys).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let sig = parts[2].clone();
        let flipped: String = sig
            .char_indices()
            .map(|(i, c)| if i == 0 { if c == 'A' { 'B' } else { 'A' } } else { c })
            .collect();
        parts[2] = flipped;
        let tampered = parts.join(".");

        match decode_access_token(&tampered, &keys) {
            Err(AppError::Auth(AuthError::BadSignature)) => {}
            other => panic!("Expected BadSignature, got {:?}", other),
        }
    }

    #[test]
    fn wrong_key_is_a_bad_signature() {
        let claims = AccessClaims::new(test_user(), vec![], 900);
        let token = encode_access_token(&claims, &test_keys()).unwrap();

        match decode_access_token(&token, &other_keys()) {
            Err(AppError::Auth(AuthError::BadSignature)) => {}
            other => panic!("Expected BadSignature, got {:?}", other),
        }
    }

    #[test]
    fn garbage_token_is_malformed() {
        match decode_access_token("invalid.token.here", &test_keys()) {
            Err(AppError::Auth(AuthError::Malformed)) => {}
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        match decode_access_token("only-one-segment", &test_keys()) {
            Err(AppError::Auth(AuthError::Malformed)) => {}
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn expired_token_is_rejected_with_its_expiry_instant() {
        let keys = test_keys();
        // Expired one second ago, well inside the 60s leeway jsonwebtoken
        // would have tolerated.
        let mut claims = AccessClaims::new(test_user(), vec![], 900);
        claims.exp = chrono::Utc::now().timestamp() - 1;

        let token = encode_access_token(&claims, &keys).unwrap();
        match decode_access_token(&token, &keys) {
            Err(AppError::Auth(AuthError::Expired { expired_at })) => {
                assert_eq!(expired_at, claims.exp);
            }
            other => panic!("Expected Expired, got {:?}", other),
        }
    }

    #[test]
    fn expiry_boundary_has_zero_leeway() {
        let now = chrono::Utc::now().timestamp();
        assert!(check_expiry(now - 1).is_err());
        assert!(check_expiry(now + 2).is_ok());
    }

    #[test]
    fn access_token_is_rejected_on_the_refresh_path() {
        let keys = test_keys();
        let claims = AccessClaims::new(test_user(), vec!["ROLE_USER_CREATE".to_string()], 900);
        let token = encode_access_token(&claims, &keys).unwrap();

        match decode_refresh_token(&token, &keys) {
            Err(AppError::Auth(AuthError::Malformed)) => {}
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }
}
