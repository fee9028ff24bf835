/// Authentication routes
///
/// Login, refresh-token rotation, logout, registration and current-account
/// lookup. Refresh tokens travel only in an HTTP-only cookie; access tokens
/// in the response body and the Authorization header.

use actix_web::{
    cookie::{time::Duration, Cookie},
    web, HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    hash_password, login as authenticate, rotate_refresh_token, AuthContext, Authority,
    RefreshStore, SigningKeys, TokenUser,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::validators::{is_valid_email, is_valid_name};

/// Cookie carrying the refresh token. HTTP-only, so it is never readable
/// from script.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: TokenUser,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub user: TokenUser,
    pub permission: Vec<Authority>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
}

fn refresh_cookie(value: &str, max_age_seconds: i64) -> Cookie<'_> {
    Cookie::build(REFRESH_TOKEN_COOKIE, value)
        .http_only(true)
        .path("/")
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_TOKEN_COOKIE, "")
        .http_only(true)
        .path("/")
        .max_age(Duration::ZERO)
        .finish()
}

/// POST /api/v1/auth/login
///
/// Authenticates email/password and issues a fresh credential pair. The
/// refresh token is set as an HTTP-only cookie, superseding whatever value
/// was stored for the principal before.
///
/// # Errors
/// - 400: invalid email format
/// - 401: unknown email or wrong password (same message for both)
/// - 5xx: storage failure (never auto-retried, to avoid double issuance)
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    keys: web::Data<SigningKeys>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let (user, pair) = authenticate(
        pool.get_ref(),
        keys.get_ref(),
        jwt_config.get_ref(),
        &email,
        &form.password,
    )
    .await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Created()
        .cookie(refresh_cookie(
            &pair.refresh_token,
            jwt_config.refresh_token_expiry,
        ))
        .json(LoginResponse {
            access_token: pair.access_token,
            user,
        }))
}

/// GET /api/v1/auth/refresh
///
/// Rotates the refresh token from the cookie into a new credential pair. Any
/// refresh token is good for exactly one rotation; presenting a superseded
/// one fails with 401.
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    keys: web::Data<SigningKeys>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let cookie = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let (user, pair) = rotate_refresh_token(
        pool.get_ref(),
        keys.get_ref(),
        jwt_config.get_ref(),
        cookie.value(),
    )
    .await?;

    tracing::info!(user_id = user.id, "Refresh token rotated");

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(
            &pair.refresh_token,
            jwt_config.refresh_token_expiry,
        ))
        .json(LoginResponse {
            access_token: pair.access_token,
            user,
        }))
}

/// POST /api/v1/auth/logout
///
/// Clears the stored refresh token and expires the cookie. Already-issued
/// access tokens stay valid until natural expiry; there is no revocation
/// list.
pub async fn logout(
    context: AuthContext,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    pool.clear_refresh_token(context.user().id).await?;

    tracing::info!(user_id = context.user().id, "User logged out");

    Ok(HttpResponse::Ok().cookie(removal_cookie()).finish())
}

/// GET /api/v1/auth/account
///
/// Current principal and authorities, straight from the validated access
/// token's context.
pub async fn account(context: AuthContext) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(AccountResponse {
        user: context.user().clone(),
        permission: context.authorities().to_vec(),
    }))
}

/// POST /api/v1/auth/register
///
/// Creates a new account with the default role. Returns no tokens; the
/// client logs in separately.
///
/// # Errors
/// - 400: invalid email, name, or weak password
/// - 409: email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let name = is_valid_name(&form.name)?;
    let password_hash = hash_password(&form.password)?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (email, name, password_hash, role_id)
        VALUES ($1, $2, $3, (SELECT id FROM roles WHERE name = 'USER'))
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id = id, "User registered");

    Ok(HttpResponse::Created().json(RegisterResponse { id, email, name }))
}
