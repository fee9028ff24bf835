/// Authorities and the per-request authentication context
///
/// Authority codes from an access token's `permission` claim map 1:1 into
/// `Authority` values with no prefix rewriting, so they cannot collide with
/// unrelated scope conventions. The `AuthContext` is attached to the request
/// by the authentication gate and passed explicitly to handlers; there is no
/// ambient global principal.

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::claims::{AccessClaims, TokenUser};
use crate::error::{AppError, AuthError};

/// A single capability code, e.g. `ROLE_USER_CREATE`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Authority(String);

impl Authority {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Authority {
    fn from(code: String) -> Self {
        Authority(code)
    }
}

/// Authenticated principal and authorities for one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    user: TokenUser,
    authorities: Vec<Authority>,
}

impl AuthContext {
    /// Maps the token's authority codes directly, preserving order.
    pub fn from_claims(claims: AccessClaims) -> Self {
        let authorities = claims.permission.into_iter().map(Authority::from).collect();
        Self {
            user: claims.user,
            authorities,
        }
    }

    pub fn user(&self) -> &TokenUser {
        &self.user
    }

    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    /// Exact-match route guard check.
    pub fn has_authority(&self, code: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str() == code)
    }

    /// Prefix-match route guard check, e.g. `ROLE_USER_` for any user action.
    pub fn has_authority_prefix(&self, prefix: &str) -> bool {
        self.authorities.iter().any(|a| a.as_str().starts_with(prefix))
    }
}

/// Extracts the context attached by the authentication gate.
///
/// An anonymous request reaching a handler that extracts `AuthContext`
/// answers 401 through the authorization entry point.
impl FromRequest for AuthContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthContext>()
                .cloned()
                .ok_or(AppError::Auth(AuthError::MissingToken)),
        )
    }
}
