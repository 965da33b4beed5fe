use crate::domain::models::{Action, TargetRef};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics;
use crate::repository::ActionStore;
use crate::services::clock::Clock;
use chrono::Duration;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Longest verb the `actions.verb` column accepts
const MAX_VERB_LEN: usize = 255;

/// Records user activity, dropping repeats of the same (actor, verb, target)
/// inside a trailing time window.
#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn ActionStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl ActivityLogger {
    pub fn new(store: Arc<dyn ActionStore>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// Record `user_id` performing `verb` on an optional target.
    ///
    /// Returns false when an identical action was recorded within the window.
    pub async fn record(
        &self,
        user_id: Uuid,
        verb: &str,
        target: Option<TargetRef>,
    ) -> ServiceResult<bool> {
        if verb.trim().is_empty() {
            return Err(ServiceError::InvalidInput("verb must not be empty".into()));
        }
        if verb.chars().count() > MAX_VERB_LEN {
            return Err(ServiceError::InvalidInput(format!(
                "verb longer than {} characters",
                MAX_VERB_LEN
            )));
        }

        let now = self.clock.now();
        let since = now - self.window;
        let action = Action {
            id: Uuid::new_v4(),
            user_id,
            verb: verb.to_string(),
            target,
            created_at: now,
        };

        let recorded = self.store.insert_unless_recent(&action, since).await?;
        metrics::record_activity(recorded);

        if recorded {
            debug!(user_id = %user_id, verb, target = ?target, "activity recorded");
        } else {
            debug!(user_id = %user_id, verb, target = ?target, "duplicate activity suppressed");
        }

        Ok(recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockActionStore;
    use crate::services::clock::ManualClock;
    use chrono::Utc;

    #[tokio::test]
    async fn test_window_starts_sixty_seconds_back() {
        let now = Utc::now();
        let mut store = MockActionStore::new();
        store
            .expect_insert_unless_recent()
            .withf(move |action, since| {
                action.created_at == now && *since == now - Duration::seconds(60)
            })
            .times(1)
            .returning(|_, _| Ok(true));

        let logger = ActivityLogger::new(
            Arc::new(store),
            Arc::new(ManualClock::new(now)),
            Duration::seconds(60),
        );

        assert!(logger.record(Uuid::new_v4(), "likes", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_verb_is_rejected() {
        let logger = ActivityLogger::new(
            Arc::new(MockActionStore::new()),
            Arc::new(ManualClock::new(Utc::now())),
            Duration::seconds(60),
        );

        let result = logger.record(Uuid::new_v4(), "  ", None).await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let mut store = MockActionStore::new();
        store
            .expect_insert_unless_recent()
            .returning(|_, _| Err(ServiceError::Database(sqlx::Error::PoolTimedOut)));

        let logger = ActivityLogger::new(
            Arc::new(store),
            Arc::new(ManualClock::new(Utc::now())),
            Duration::seconds(60),
        );

        let result = logger.record(Uuid::new_v4(), "likes", None).await;
        assert!(matches!(result, Err(ServiceError::Database(_))));
    }
}
