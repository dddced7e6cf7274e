//! User lookups and creation backing the credential verifier.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::types::UserRecord;
use crate::api::handlers::error::{is_foreign_key_violation, is_unique_violation};

/// Stored user as needed by the verifier. The hash never leaves this module's callers.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<Uuid>,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(UserRecord),
    /// Username or email already taken.
    Conflict,
    /// `role_id` does not reference an existing role.
    UnknownRole,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Exact-match lookup by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>>;

    async fn create_user(&self, user: NewUser) -> Result<CreateOutcome>;
}

/// Postgres-backed directory.
#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>> {
        let query = r"
            SELECT u.id, u.username, u.password_hash, r.name AS role
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE u.username = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user")?;

        Ok(row.map(|row| StoredUser {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            role: row.get("role"),
        }))
    }

    async fn create_user(&self, user: NewUser) -> Result<CreateOutcome> {
        let query = r"
            INSERT INTO users (username, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, role_id, created_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role_id)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(CreateOutcome::Created(UserRecord {
                id: row.get("id"),
                username: row.get("username"),
                email: row.get("email"),
                role_id: row.get("role_id"),
                created_at: row.get("created_at"),
            })),
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
            Err(err) if is_foreign_key_violation(&err) => Ok(CreateOutcome::UnknownRole),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }
}
