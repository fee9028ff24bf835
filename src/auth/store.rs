/// Identity and refresh-token stores
///
/// The rotation protocol talks to storage through two small traits so its
/// invariants can be exercised without a live database. The Postgres
/// implementations hold the production semantics: one `refresh_token` column
/// per user row, so at most one refresh token is ever valid per principal.

use sqlx::PgPool;

use crate::error::AppError;

/// A user row as the identity store sees it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Read access to principals and their current authorities.
#[allow(async_fn_in_trait)]
pub trait IdentityStore {
    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// The principal's current authority codes, resolved from its role. This
    /// is consulted at every issuance and rotation; authorities are never
    /// copied forward from old claims.
    async fn authorities_of(&self, user_id: i64) -> Result<Vec<String>, AppError>;
}

/// Persistence of the single currently-valid refresh token per principal.
#[allow(async_fn_in_trait)]
pub trait RefreshStore {
    async fn current_refresh_token(&self, user_id: i64) -> Result<Option<String>, AppError>;

    /// Unconditional overwrite, used at login. The prior value, if any,
    /// becomes permanently unmatchable.
    async fn store_refresh_token(&self, user_id: i64, token: &str) -> Result<(), AppError>;

    /// Compare-and-swap overwrite, used at rotation. Returns `false` when
    /// `current` no longer matches the stored value, which means a concurrent
    /// rotation won the race.
    async fn swap_refresh_token(
        &self,
        user_id: i64,
        current: &str,
        next: &str,
    ) -> Result<bool, AppError>;

    /// Used at logout.
    async fn clear_refresh_token(&self, user_id: i64) -> Result<(), AppError>;
}

impl IdentityStore for PgPool {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, password_hash FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(self)
        .await?;

        Ok(user)
    }

    async fn authorities_of(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name
            FROM permissions p
            JOIN role_permission rp ON rp.permission_id = p.id
            JOIN users u ON u.role_id = rp.role_id
            WHERE u.id = $1
            ORDER BY p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self)
        .await?;

        Ok(codes)
    }
}

impl RefreshStore for PgPool {
    async fn current_refresh_token(&self, user_id: i64) -> Result<Option<String>, AppError> {
        let token = sqlx::query_scalar::<_, Option<String>>(
            "SELECT refresh_token FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(self)
        .await?;

        Ok(token.flatten())
    }

    async fn store_refresh_token(&self, user_id: i64, token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
            .bind(token)
            .bind(user_id)
            .execute(self)
            .await?;

        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_id: i64,
        current: &str,
        next: &str,
    ) -> Result<bool, AppError> {
        // The WHERE clause makes the overwrite atomic: of two concurrent
        // rotations presenting the same token, exactly one matches.
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $1 WHERE id = $2 AND refresh_token = $3",
        )
        .bind(next)
        .bind(user_id)
        .bind(current)
        .execute(self)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn clear_refresh_token(&self, user_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = NULL WHERE id = $1")
            .bind(user_id)
            .execute(self)
            .await?;

        Ok(())
    }
}
