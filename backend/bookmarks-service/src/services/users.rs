use crate::domain::models::{User, UserProfile, UsernameUpdate, MAX_USERNAME_LEN};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::UserStore;
use crate::services::follow::FollowService;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Placeholder username for a viewer whose name the auth layer did not send
pub fn default_username(user_id: Uuid) -> String {
    format!("user-{}", user_id.simple())
}

/// Local user projection: populated from request identity, read for profiles
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    follows: FollowService,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, follows: FollowService) -> Self {
        Self { users, follows }
    }

    /// Make sure the authenticated viewer has a row before it writes anything
    /// that references `users(id)`.
    ///
    /// A username supplied by the auth layer is applied (renaming if needed);
    /// otherwise a first-time viewer gets a placeholder name.
    pub async fn ensure_viewer(&self, user_id: Uuid, username: Option<&str>) -> ServiceResult<()> {
        match username {
            Some(name) => self.apply_username(user_id, name).await,
            None => {
                if self
                    .users
                    .create_if_missing(user_id, &default_username(user_id))
                    .await?
                {
                    info!(user_id = %user_id, "registered viewer with placeholder username");
                }
                Ok(())
            }
        }
    }

    /// Set the viewer's username, creating the user if needed
    pub async fn rename(&self, user_id: Uuid, update: UsernameUpdate) -> ServiceResult<User> {
        update.validate()?;
        let username = update.username.trim();
        self.apply_username(user_id, username).await?;

        self.users
            .find_many(&[user_id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Internal(format!("user {} vanished after upsert", user_id)))
    }

    async fn apply_username(&self, user_id: Uuid, username: &str) -> ServiceResult<()> {
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(ServiceError::InvalidInput(format!(
                "username must be 1 to {} characters",
                MAX_USERNAME_LEN
            )));
        }

        match self.users.find_by_username(username).await? {
            Some(owner) if owner.id == user_id => Ok(()),
            Some(_) => Err(ServiceError::InvalidInput(format!(
                "username {} is already taken",
                username
            ))),
            None => self.users.upsert(user_id, username).await,
        }
    }

    pub async fn list(&self, limit: usize) -> ServiceResult<Vec<User>> {
        self.users.list(limit).await
    }

    /// Profile by username with follower and following ids
    pub async fn profile(&self, username: &str) -> ServiceResult<UserProfile> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", username)))?;

        let followers = self.follows.follower_ids(user.id).await?;
        let following = self.follows.following_ids(user.id).await?;

        Ok(UserProfile {
            user,
            followers,
            following,
        })
    }
}
