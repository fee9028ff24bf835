/// Token claim sets
///
/// Two structurally distinct payload shapes, one per token kind. Access
/// tokens carry the principal snapshot plus the authority codes resolved at
/// issuance; refresh tokens carry only the snapshot. A refresh token alone
/// must never grant capabilities, so its shape has no `permission` field and
/// rejects unknown fields on decode.

use serde::{Deserialize, Serialize};

/// Principal snapshot embedded in every token.
///
/// Referenced, not owned: the identity store remains the source of truth and
/// is re-consulted at every rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Claims for short-lived access tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Principal snapshot
    pub user: TokenUser,
    /// Ordered authority codes, resolved from the identity store at issuance
    pub permission: Vec<String>,
}

impl AccessClaims {
    pub fn new(user: TokenUser, permission: Vec<String>, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.email.clone(),
            iat: now,
            exp: now + expiry_seconds,
            user,
            permission,
        }
    }
}

/// Claims for long-lived refresh tokens.
///
/// `deny_unknown_fields` makes the shape closed: an access token presented on
/// the refresh path fails to deserialize because of its extra `permission`
/// field, instead of being silently accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub user: TokenUser,
}

impl RefreshClaims {
    pub fn new(user: TokenUser, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.email.clone(),
            iat: now,
            exp: now + expiry_seconds,
            user,
        }
    }
}
