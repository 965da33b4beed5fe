use crate::domain::models::{Action, EntityType, TargetRef};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{sql_limit, ActionStore, FeedFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::debug;
use uuid::Uuid;

/// Row shape of the `actions` table
#[derive(Debug, sqlx::FromRow)]
struct ActionRow {
    id: Uuid,
    user_id: Uuid,
    verb: String,
    target_type: Option<String>,
    target_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ActionRow> for Action {
    type Error = ServiceError;

    fn try_from(row: ActionRow) -> Result<Self, Self::Error> {
        let target = match (row.target_type, row.target_id) {
            (Some(kind), Some(entity_id)) => Some(TargetRef {
                entity_type: kind.parse::<EntityType>().map_err(ServiceError::Internal)?,
                entity_id,
            }),
            _ => None,
        };

        Ok(Action {
            id: row.id,
            user_id: row.user_id,
            verb: row.verb,
            target,
            created_at: row.created_at,
        })
    }
}

fn target_columns(target: Option<TargetRef>) -> (Option<&'static str>, Option<Uuid>) {
    match target {
        Some(t) => (Some(t.entity_type.as_str()), Some(t.entity_id)),
        None => (None, None),
    }
}

/// Key serializing concurrent records of the same (actor, verb, target)
fn dedup_lock_key(action: &Action) -> String {
    let (kind, id) = target_columns(action.target);
    format!(
        "{}:{}:{}:{}",
        action.user_id,
        action.verb,
        kind.unwrap_or("-"),
        id.map(|id| id.to_string()).unwrap_or_default()
    )
}

async fn exists_similar<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    verb: &str,
    target: Option<TargetRef>,
    since: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let (target_type, target_id) = target_columns(target);
    sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM actions
            WHERE user_id = $1
              AND verb = $2
              AND created_at >= $3
              AND target_type IS NOT DISTINCT FROM $4
              AND target_id IS NOT DISTINCT FROM $5
        )
        "#,
    )
    .bind(user_id)
    .bind(verb)
    .bind(since)
    .bind(target_type)
    .bind(target_id)
    .fetch_one(executor)
    .await
}

async fn insert_action<'e, E: PgExecutor<'e>>(
    executor: E,
    action: &Action,
) -> Result<(), sqlx::Error> {
    let (target_type, target_id) = target_columns(action.target);
    sqlx::query(
        r#"
        INSERT INTO actions (id, user_id, verb, target_type, target_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(action.id)
    .bind(action.user_id)
    .bind(&action.verb)
    .bind(target_type)
    .bind(target_id)
    .bind(action.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// PostgreSQL-backed activity stream
#[derive(Clone)]
pub struct PgActionStore {
    pool: PgPool,
}

impl PgActionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionStore for PgActionStore {
    async fn exists_since(
        &self,
        user_id: Uuid,
        verb: &str,
        target: Option<TargetRef>,
        since: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        Ok(exists_similar(&self.pool, user_id, verb, target, since).await?)
    }

    async fn insert(&self, action: &Action) -> ServiceResult<()> {
        insert_action(&self.pool, action).await?;
        Ok(())
    }

    /// Check and insert under a transaction-scoped advisory lock on the
    /// (actor, verb, target) triple, so identical concurrent records serialize.
    async fn insert_unless_recent(
        &self,
        action: &Action,
        since: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(dedup_lock_key(action))
            .execute(&mut *tx)
            .await?;

        if exists_similar(
            &mut *tx,
            action.user_id,
            &action.verb,
            action.target,
            since,
        )
        .await?
        {
            tx.rollback().await?;
            debug!(user_id = %action.user_id, verb = %action.verb, "similar action already recorded");
            return Ok(false);
        }

        insert_action(&mut *tx, action).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn recent(&self, filter: &FeedFilter) -> ServiceResult<Vec<Action>> {
        if filter.limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ActionRow>(
            r#"
            SELECT id, user_id, verb, target_type, target_id, created_at
            FROM actions
            WHERE user_id <> $1
              AND ($2::uuid[] IS NULL OR user_id = ANY($2))
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(filter.viewer)
        .bind(filter.actors.as_deref())
        .bind(sql_limit(filter.limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Action::try_from).collect()
    }

    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(target: Option<TargetRef>) -> Action {
        Action {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            verb: "likes".to_string(),
            target,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_lock_key_distinguishes_missing_target() {
        let image = Uuid::new_v4();
        let with_target = dedup_lock_key(&action(Some(TargetRef::image(image))));
        let without_target = dedup_lock_key(&action(None));

        assert_ne!(with_target, without_target);
        assert!(with_target.ends_with(&format!(":image:{}", image)));
        assert!(without_target.ends_with(":-:"));
    }

    #[test]
    fn test_row_without_target_maps_to_none() {
        let row = ActionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            verb: "is following".to_string(),
            target_type: None,
            target_id: None,
            created_at: Utc::now(),
        };
        let action = Action::try_from(row).unwrap();
        assert!(action.target.is_none());
    }

    #[test]
    fn test_row_with_unknown_target_type_is_rejected() {
        let row = ActionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            verb: "likes".to_string(),
            target_type: Some("post".to_string()),
            target_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
        };
        assert!(matches!(
            Action::try_from(row),
            Err(ServiceError::Internal(_))
        ));
    }
}
