//! Role checks for privileged operations.
//!
//! Token verification happens upstream; by the time a call reaches this
//! crate the caller is identified by a user id, which may or may not still
//! exist.

use protech_core::{CoreError, User};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::user::UserRepository;

/// Resolves callers and enforces the admin role.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    identity: UserRepository,
}

impl AccessGuard {
    pub fn new(identity: UserRepository) -> Self {
        AccessGuard { identity }
    }

    /// True only for an existing user with the admin flag set.
    pub async fn is_admin(&self, user_id: i64) -> DbResult<bool> {
        self.identity.is_admin(user_id).await
    }

    /// The calling user, or `Unauthenticated` if the id resolves to nobody.
    pub async fn require_user(&self, user_id: i64) -> DbResult<User> {
        self.identity
            .find(user_id)
            .await?
            .ok_or_else(|| CoreError::Unauthenticated.into())
    }

    /// The calling user if they are an admin.
    ///
    /// ## Returns
    /// * `Err(Unauthenticated)` - Unknown user id
    /// * `Err(Unauthorized)` - Known user without the admin role
    pub async fn require_admin(&self, user_id: i64, action: &str) -> DbResult<User> {
        let user = self.require_user(user_id).await?;

        if !user.is_admin {
            debug!(user_id, action, "Admin action refused");
            return Err(CoreError::unauthorized(action).into());
        }

        Ok(user)
    }
}
