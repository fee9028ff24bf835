/// jobfind-auth
///
/// Issues and validates signed session credentials for the job-board API:
/// short-lived access tokens, long-lived single-use refresh tokens, and
/// stateless per-request authorization from the token's authority claims.

pub mod auth;
pub mod configuration;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod validators;
