//! User account management.
//!
//! Passwords are hashed with Argon2 before they reach the store. Deleting
//! a user cascades over their subscriptions and posts so no orphaned
//! content or stale plan counters are left behind.

use crate::db::{PlanStore, PostStore, SubscriptionStore, UserStore};
use crate::error::{AppError, Result};
use crate::models::{NewUser, PublicUser, SubscriptionStatus, UserUpdate};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Inputs for registering a user. Exactly one of `password` or a provider
/// id is expected; the handlers validate shape, this service validates
/// uniqueness.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub twitter_id: Option<String>,
}

/// Caller-facing update; the password is re-hashed here. Changing the
/// password on an account that has one requires the current password.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub current_password: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    plans: Arc<dyn PlanStore>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        plans: Arc<dyn PlanStore>,
    ) -> Self {
        Self {
            users,
            posts,
            subscriptions,
            plans,
        }
    }

    pub async fn register(&self, input: RegisterUser) -> Result<PublicUser> {
        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "username '{}' is taken",
                input.username
            )));
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                input.email
            )));
        }

        let password_hash = match input.password {
            Some(password) => Some(hash_password(&password)?),
            None => None,
        };

        let user = self
            .users
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                google_id: input.google_id,
                facebook_id: input.facebook_id,
                twitter_id: input.twitter_id,
            })
            .await?;

        info!(user_id = %user.id, "Registered user");
        Ok(user.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<PublicUser> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
        Ok(user.into())
    }

    pub async fn get_by_username(&self, username: &str) -> Result<PublicUser> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))?;
        Ok(user.into())
    }

    pub async fn list(&self) -> Result<Vec<PublicUser>> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    pub async fn update(&self, id: Uuid, input: UpdateUser) -> Result<PublicUser> {
        if let Some(username) = &input.username {
            if let Some(existing) = self.users.find_by_username(username).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(format!("username '{username}' is taken")));
                }
            }
        }
        if let Some(email) = &input.email {
            if let Some(existing) = self.users.find_by_email(email).await? {
                if existing.id != id {
                    return Err(AppError::Conflict(format!(
                        "email '{email}' is already registered"
                    )));
                }
            }
        }

        let password_hash = match input.password {
            Some(new_password) => {
                let user = self
                    .users
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
                // Provider-only accounts set their first password freely.
                if let Some(existing_hash) = &user.password_hash {
                    let current = input.current_password.as_deref().ok_or_else(|| {
                        AppError::BadRequest(
                            "current password is required to change the password".to_string(),
                        )
                    })?;
                    verify_password(current, existing_hash)?;
                }
                Some(hash_password(&new_password)?)
            }
            None => None,
        };

        let user = self
            .users
            .update(
                id,
                UserUpdate {
                    username: input.username,
                    email: input.email,
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

        Ok(user.into())
    }

    /// Removes the account and everything hanging off it: subscriptions
    /// first (reconciling affected plan counters), then authored posts,
    /// then the user row itself.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("user {id}")));
        }

        let affected_plans = self.subscriptions.delete_by_user(id).await?;
        let now = Utc::now();
        for plan_id in affected_plans {
            let count = self
                .subscriptions
                .count_for_plan(plan_id, SubscriptionStatus::Active, now)
                .await?;
            self.plans.set_subscriber_count(plan_id, count).await?;
        }

        let removed_posts = self.posts.delete_by_author(id).await?;
        self.users.delete(id).await?;

        info!(user_id = %id, removed_posts, "Deleted user and owned content");
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("stored password hash is invalid: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::BadRequest("current password is incorrect".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies_and_hides_plaintext() {
        let hash = hash_password("hunter2").expect("hashing succeeds");
        assert!(!hash.contains("hunter2"));

        assert!(verify_password("hunter2", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AppError::BadRequest(_))
        ));
    }
}
