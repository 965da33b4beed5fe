use crate::domain::models::{TargetRef, VERB_FOLLOWING};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics;
use crate::repository::{FollowStore, UserStore};
use crate::services::activity::ActivityLogger;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct FollowService {
    follows: Arc<dyn FollowStore>,
    users: Arc<dyn UserStore>,
    activity: ActivityLogger,
}

impl FollowService {
    pub fn new(
        follows: Arc<dyn FollowStore>,
        users: Arc<dyn UserStore>,
        activity: ActivityLogger,
    ) -> Self {
        Self {
            follows,
            users,
            activity,
        }
    }

    /// Idempotent follow; returns true if a new edge was created.
    ///
    /// Every call logs an "is following" action; the activity window keeps
    /// repeated clicks out of the stream.
    pub async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> ServiceResult<bool> {
        if follower_id == followee_id {
            return Err(ServiceError::InvalidInput(
                "users cannot follow themselves".into(),
            ));
        }
        if !self.users.exists(followee_id).await? {
            return Err(ServiceError::NotFound(format!("user {}", followee_id)));
        }

        let created = self.follows.create(follower_id, followee_id).await?;
        if created {
            metrics::record_follow_change("follow");
            info!(follower_id = %follower_id, followee_id = %followee_id, "follow created");
        }

        self.activity
            .record(follower_id, VERB_FOLLOWING, Some(TargetRef::user(followee_id)))
            .await?;

        Ok(created)
    }

    /// Idempotent unfollow; returns true if an edge was removed
    pub async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> ServiceResult<bool> {
        let removed = self.follows.delete(follower_id, followee_id).await?;
        if removed {
            metrics::record_follow_change("unfollow");
            info!(follower_id = %follower_id, followee_id = %followee_id, "follow removed");
        }
        Ok(removed)
    }

    pub async fn following_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        self.follows.following_ids(user_id).await
    }

    pub async fn follower_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        self.follows.follower_ids(user_id).await
    }
}
