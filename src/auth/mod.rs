/// Authentication and authorization
///
/// Signing-key material, token claim shapes, the token codec, credential
/// issuance with refresh rotation, stores, passwords, and the per-request
/// authority context.

mod authority;
mod claims;
mod jwt;
mod keys;
mod password;
mod session;
mod store;

pub use authority::{AuthContext, Authority};
pub use claims::{AccessClaims, RefreshClaims, TokenUser};
pub use jwt::{decode_access_token, decode_refresh_token, encode_access_token, encode_refresh_token};
pub use keys::SigningKeys;
pub use password::{hash_password, verify_password};
pub use session::{issue_token_pair, login, rotate_refresh_token, TokenPair};
pub use store::{IdentityStore, RefreshStore, UserRecord};
