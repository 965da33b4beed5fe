use crate::domain::models::User;
use crate::error::ServiceResult;
use crate::repository::{sql_limit, UserStore};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Local copy of the account data the activity stream needs
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    /// Upsert user (called by the identity layer on sign-up and rename)
    async fn upsert(&self, user_id: Uuid, username: &str) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username
            "#,
        )
        .bind(user_id)
        .bind(username)
        .execute(&self.pool)
        .await?;

        debug!("Upserted user {} ({})", user_id, username);
        Ok(())
    }

    async fn create_if_missing(&self, user_id: Uuid, username: &str) -> ServiceResult<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, username, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(username)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            debug!(user_id = %user_id, username, "created user on first request");
        }
        Ok(inserted > 0)
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list(&self, limit: usize) -> ServiceResult<Vec<User>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users ORDER BY username LIMIT $1",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn exists(&self, user_id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_many(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
