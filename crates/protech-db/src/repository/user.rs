//! # User Repository
//!
//! The Identity Store: registration, lookup and credential checks.
//!
//! Emails are matched exactly as stored; `Client@Shop.cm` and
//! `client@shop.cm` are different accounts.

use chrono::Utc;
use protech_core::{CoreError, NewUser, User};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::password::{hash_password, verify_password};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks a user up by exact email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        debug!(email, "Looking up user by email");

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Looks a user up by id.
    pub async fn find(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by id, or `NotFound`.
    pub async fn get(&self, id: i64) -> DbResult<User> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Lists every account, oldest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Registers a customer.
    ///
    /// Self-service accounts are never admins.
    ///
    /// ## Returns
    /// * `Err(EmailTaken)` - An account with this exact email exists
    pub async fn create(&self, new: &NewUser) -> DbResult<User> {
        self.insert(new, false).await
    }

    /// Creates an administrator. Trusted provisioning only.
    pub async fn create_admin(&self, new: &NewUser) -> DbResult<User> {
        self.insert(new, true).await
    }

    async fn insert(&self, new: &NewUser, is_admin: bool) -> DbResult<User> {
        new.validate()?;

        if self.find_by_email(&new.email).await?.is_some() {
            return Err(CoreError::EmailTaken(new.email.clone()).into());
        }

        let password_hash = hash_password(&new.password)?;

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, phone, password_hash, is_admin, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(new.full_name.trim())
        .bind(&new.email)
        .bind(new.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()))
        .bind(&password_hash)
        .bind(is_admin)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                info!(user_id = user.id, is_admin, "User registered");
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same email.
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { .. } => {
                    Err(CoreError::EmailTaken(new.email.clone()).into())
                }
                other => Err(other),
            },
        }
    }

    /// Checks a login.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn verify(&self, email: &str, password: &str) -> DbResult<User> {
        let Some(user) = self.find_by_email(email).await? else {
            warn!("Login rejected: unknown email");
            return Err(CoreError::InvalidCredentials.into());
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = user.id, "Login rejected: wrong password");
            return Err(CoreError::InvalidCredentials.into());
        }

        debug!(user_id = user.id, "Login accepted");
        Ok(user)
    }

    /// Grants the admin role.
    pub async fn promote_to_admin(&self, email: &str) -> DbResult<User> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET is_admin = 1 WHERE email = ?1 RETURNING *",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("User", email))?;

        info!(user_id = user.id, "User promoted to admin");
        Ok(user)
    }

    /// Replaces a user's password.
    pub async fn reset_password(&self, email: &str, password: &str) -> DbResult<User> {
        protech_core::validation::validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET password_hash = ?2 WHERE email = ?1 RETURNING *",
        )
        .bind(email)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("User", email))?;

        info!(user_id = user.id, "Password reset");
        Ok(user)
    }

    /// Whether the user exists and holds the admin role.
    pub async fn is_admin(&self, id: i64) -> DbResult<bool> {
        let flag: Option<bool> = sqlx::query_scalar("SELECT is_admin FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(flag.unwrap_or(false))
    }

    /// Counts accounts (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
