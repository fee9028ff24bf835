mod auth;
mod health_check;

pub use auth::{account, login, logout, refresh, register, REFRESH_TOKEN_COOKIE};
pub use health_check::health_check;
