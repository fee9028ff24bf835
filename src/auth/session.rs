/// Credential issuance and refresh rotation
///
/// The issuer builds an access/refresh pair for an authenticated principal;
/// authorities are always resolved from the identity store at the moment of
/// issuance, never re-derived from an old token's claims. Rotation validates
/// the presented refresh token against the stored value and supersedes it
/// atomically, so any refresh token is valid for exactly one rotation.

use crate::auth::claims::{AccessClaims, RefreshClaims, TokenUser};
use crate::auth::jwt::{decode_refresh_token, encode_access_token, encode_refresh_token};
use crate::auth::keys::SigningKeys;
use crate::auth::password::verify_password;
use crate::auth::store::{IdentityStore, RefreshStore, UserRecord};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs an access token and a refresh token for `user`.
///
/// Pure issuance: persisting the refresh token is the caller's job, so login
/// and rotation can choose between an overwrite and a compare-and-swap.
pub fn issue_token_pair(
    user: &TokenUser,
    authorities: Vec<String>,
    keys: &SigningKeys,
    config: &JwtSettings,
) -> Result<TokenPair, AppError> {
    let access = AccessClaims::new(user.clone(), authorities, config.access_token_expiry);
    let refresh = RefreshClaims::new(user.clone(), config.refresh_token_expiry);

    Ok(TokenPair {
        access_token: encode_access_token(&access, keys)?,
        refresh_token: encode_refresh_token(&refresh, keys)?,
    })
}

/// Authenticates `email`/`password` and issues a new credential pair,
/// overwriting any previously stored refresh token for the principal.
pub async fn login<S>(
    store: &S,
    keys: &SigningKeys,
    config: &JwtSettings,
    email: &str,
    password: &str,
) -> Result<(TokenUser, TokenPair), AppError>
where
    S: IdentityStore + RefreshStore,
{
    let user = store
        .find_by_email(email)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    // Same failure for "unknown email" and "wrong password": no user
    // enumeration.
    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let authorities = store.authorities_of(user.id).await?;
    let token_user = snapshot(&user);
    let pair = issue_token_pair(&token_user, authorities, keys, config)?;

    store.store_refresh_token(user.id, &pair.refresh_token).await?;

    Ok((token_user, pair))
}

/// Rotates a presented refresh token into a new credential pair.
///
/// Validation order:
/// 1. Codec verification; any failure aborts with the codec's error.
/// 2. The claimed subject must still exist (`UnknownPrincipal` otherwise).
/// 3. The presented value must match the stored one byte for byte. Absence
///    and mismatch are both `InvalidRefreshToken`: a cryptographically valid
///    but superseded token is indistinguishable from an expired one.
/// 4. The stored value is replaced by compare-and-swap; losing that race is
///    also `InvalidRefreshToken`.
///
/// Authorities for the new access token are re-fetched from the identity
/// store, so privilege changes take effect at the next rotation.
pub async fn rotate_refresh_token<S>(
    store: &S,
    keys: &SigningKeys,
    config: &JwtSettings,
    presented: &str,
) -> Result<(TokenUser, TokenPair), AppError>
where
    S: IdentityStore + RefreshStore,
{
    let claims = decode_refresh_token(presented, keys)?;

    let user = store
        .find_by_email(&claims.sub)
        .await?
        .ok_or(AppError::Auth(AuthError::UnknownPrincipal))?;

    match store.current_refresh_token(user.id).await? {
        Some(stored) if stored == presented => {}
        _ => return Err(AppError::Auth(AuthError::InvalidRefreshToken)),
    }

    let authorities = store.authorities_of(user.id).await?;
    let token_user = snapshot(&user);
    let pair = issue_token_pair(&token_user, authorities, keys, config)?;

    if !store
        .swap_refresh_token(user.id, presented, &pair.refresh_token)
        .await?
    {
        // A concurrent rotation superseded the presented token after the
        // match check.
        return Err(AppError::Auth(AuthError::InvalidRefreshToken));
    }

    Ok((token_user, pair))
}

fn snapshot(user: &UserRecord) -> TokenUser {
    TokenUser {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    }
}
