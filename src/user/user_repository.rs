use axum::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::user_models::User;
use crate::error::{conflict_on_unique, AppError, Result};

const DUPLICATE_EMAIL: &str = "Email already exists";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn count_by_email(&self, email: &str) -> Result<i64>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn insert(&self, user: &User) -> Result<()>;

    /// Overwrites the stored session and refresh tokens. Returns the number
    /// of matched users.
    async fn update_tokens(
        &self,
        user_id: Uuid,
        token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn count_by_email(&self, email: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users
                 (id, name, email, password_hash, token, refresh_token, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.token)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_EMAIL))?;

        Ok(())
    }

    async fn update_tokens(
        &self,
        user_id: Uuid,
        token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET token = $1, refresh_token = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(token)
        .bind(refresh_token)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Process-local user store. Email uniqueness is enforced through a
/// secondary index claimed before the record is written.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<DashMap<Uuid, User>>,
    emails: Arc<DashMap<String, Uuid>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn count_by_email(&self, email: &str) -> Result<i64> {
        Ok(self.emails.contains_key(email) as i64)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let Some(user_id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&user_id).map(|user| user.clone()))
    }

    async fn insert(&self, user: &User) -> Result<()> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(DUPLICATE_EMAIL.to_string())),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(())
            }
        }
    }

    async fn update_tokens(
        &self,
        user_id: Uuid,
        token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        match self.users.get_mut(&user_id) {
            Some(mut user) => {
                user.token = Some(token.to_string());
                user.refresh_token = Some(refresh_token.to_string());
                user.updated_at = updated_at;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
