/// Middleware module
///
/// The per-request authentication gate.

mod jwt_middleware;

pub use jwt_middleware::JwtAuthentication;
