//! Storage ports and their PostgreSQL implementations.
//!
//! Services depend on the traits below; `main` wires the `Pg*` types in, tests
//! wire in-memory or mocked stores.

pub mod actions;
pub mod follows;
pub mod images;
pub mod users;

pub use actions::PgActionStore;
pub use follows::PgFollowStore;
pub use images::PgImageStore;
pub use users::PgUserStore;

use crate::domain::models::{Action, Image, LikeChange, TargetRef, User};
use crate::error::ServiceResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// LIMIT value for a row count; counts beyond `i64::MAX` saturate
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Feed query: entries not authored by `viewer`, optionally limited to `actors`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFilter {
    pub viewer: Uuid,
    /// `None` admits every actor except the viewer
    pub actors: Option<Vec<Uuid>>,
    pub limit: usize,
}

/// Activity stream storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Whether an action with the same actor, verb and target exists at or after `since`.
    /// A `None` target only matches actions without a target.
    async fn exists_since(
        &self,
        user_id: Uuid,
        verb: &str,
        target: Option<TargetRef>,
        since: DateTime<Utc>,
    ) -> ServiceResult<bool>;

    /// Append an action
    async fn insert(&self, action: &Action) -> ServiceResult<()>;

    /// Insert `action` unless a similar one exists at or after `since`.
    /// Returns true if the action was stored.
    ///
    /// The default is a plain check-then-insert; stores that can serialize
    /// the two steps override it.
    async fn insert_unless_recent(
        &self,
        action: &Action,
        since: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        if self
            .exists_since(action.user_id, &action.verb, action.target, since)
            .await?
        {
            return Ok(false);
        }
        self.insert(action).await?;
        Ok(true)
    }

    /// Most recent actions matching `filter`, newest first
    async fn recent(&self, filter: &FeedFilter) -> ServiceResult<Vec<Action>>;

    /// Health check (optional)
    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}

/// Social graph storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowStore: Send + Sync {
    /// Idempotent create; returns true if a new edge was inserted
    async fn create(&self, follower_id: Uuid, followee_id: Uuid) -> ServiceResult<bool>;

    /// Idempotent delete; returns true if an edge was removed
    async fn delete(&self, follower_id: Uuid, followee_id: Uuid) -> ServiceResult<bool>;

    /// Users followed by `user_id`, most recent first
    async fn following_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>>;

    /// Users following `user_id`, most recent first
    async fn follower_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>>;
}

/// Bookmarked image storage
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn create(&self, image: &Image) -> ServiceResult<()>;

    async fn get(&self, image_id: Uuid) -> ServiceResult<Option<Image>>;

    /// Batch lookup; order of the result is unspecified and missing ids are skipped
    async fn find_many(&self, image_ids: &[Uuid]) -> ServiceResult<Vec<Image>>;

    /// Add a like and recompute `total_likes`; `None` if the image does not exist
    async fn add_like(&self, image_id: Uuid, user_id: Uuid) -> ServiceResult<Option<LikeChange>>;

    /// Remove a like and recompute `total_likes`; `None` if the image does not exist
    async fn remove_like(&self, image_id: Uuid, user_id: Uuid)
        -> ServiceResult<Option<LikeChange>>;
}

/// Local projection of user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert or rename
    async fn upsert(&self, user_id: Uuid, username: &str) -> ServiceResult<()>;

    /// Insert unless the id is already known; returns true if a row was created
    async fn create_if_missing(&self, user_id: Uuid, username: &str) -> ServiceResult<bool>;

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>>;

    /// Users ordered by username
    async fn list(&self, limit: usize) -> ServiceResult<Vec<User>>;

    async fn exists(&self, user_id: Uuid) -> ServiceResult<bool>;

    /// Batch lookup; missing ids are skipped
    async fn find_many(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<User>>;
}
