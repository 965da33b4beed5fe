use crate::domain::models::{Action, FeedEntry};
use crate::error::ServiceResult;
use crate::repository::{ActionStore, FeedFilter, FollowStore, UserStore};
use crate::services::targets::TargetRegistry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Read side of the activity stream
#[derive(Clone)]
pub struct ActivityFeed {
    actions: Arc<dyn ActionStore>,
    follows: Arc<dyn FollowStore>,
    users: Arc<dyn UserStore>,
    targets: TargetRegistry,
    default_limit: usize,
}

impl ActivityFeed {
    pub fn new(
        actions: Arc<dyn ActionStore>,
        follows: Arc<dyn FollowStore>,
        users: Arc<dyn UserStore>,
        targets: TargetRegistry,
        default_limit: usize,
    ) -> Self {
        Self {
            actions,
            follows,
            users,
            targets,
            default_limit,
        }
    }

    /// Newest actions the viewer should see.
    ///
    /// The viewer's own actions never appear. When the viewer follows anyone,
    /// only followees' actions are returned; otherwise everyone else's.
    pub async fn recent(&self, viewer: Uuid, limit: usize) -> ServiceResult<Vec<Action>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let following = self.follows.following_ids(viewer).await?;
        let actors = if following.is_empty() {
            None
        } else {
            Some(following)
        };

        let filter = FeedFilter {
            viewer,
            actors,
            limit,
        };
        let actions = self.actions.recent(&filter).await?;

        debug!(
            viewer = %viewer,
            followee_filter = filter.actors.is_some(),
            count = actions.len(),
            "feed loaded"
        );
        Ok(actions)
    }

    /// `recent` hydrated with actor usernames and target summaries
    pub async fn dashboard(
        &self,
        viewer: Uuid,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<FeedEntry>> {
        let actions = self
            .recent(viewer, limit.unwrap_or(self.default_limit))
            .await?;
        if actions.is_empty() {
            return Ok(Vec::new());
        }

        let actor_ids: Vec<Uuid> = actions
            .iter()
            .map(|a| a.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let usernames: HashMap<Uuid, String> = self
            .users
            .find_many(&actor_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let summaries = self
            .targets
            .resolve_all(actions.iter().filter_map(|a| a.target))
            .await?;

        Ok(actions
            .into_iter()
            .map(|action| FeedEntry {
                actor_username: usernames.get(&action.user_id).cloned(),
                target_summary: action.target.and_then(|t| summaries.get(&t).cloned()),
                action,
            })
            .collect())
    }
}
