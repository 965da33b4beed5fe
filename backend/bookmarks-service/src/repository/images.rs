use crate::domain::models::{Image, LikeChange};
use crate::error::ServiceResult;
use crate::repository::ImageStore;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Repository for bookmarked images and their likes
#[derive(Clone)]
pub struct PgImageStore {
    pool: PgPool,
}

impl PgImageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Lock the image row; false if it does not exist
async fn lock_image(conn: &mut PgConnection, image_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM images WHERE id = $1 FOR UPDATE")
        .bind(image_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

/// Recompute the denormalized like counter from the relation
async fn refresh_total_likes(conn: &mut PgConnection, image_id: Uuid) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        UPDATE images
        SET total_likes = (SELECT COUNT(*) FROM image_likes WHERE image_id = $1)
        WHERE id = $1
        RETURNING total_likes
        "#,
    )
    .bind(image_id)
    .fetch_one(conn)
    .await
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn create(&self, image: &Image) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO images (id, owner_id, title, slug, url, description, total_likes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(image.id)
        .bind(image.owner_id)
        .bind(&image.title)
        .bind(&image.slug)
        .bind(&image.url)
        .bind(&image.description)
        .bind(image.total_likes)
        .bind(image.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, image_id: Uuid) -> ServiceResult<Option<Image>> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, owner_id, title, slug, url, description, total_likes, created_at
            FROM images
            WHERE id = $1
            "#,
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(image)
    }

    async fn find_many(&self, image_ids: &[Uuid]) -> ServiceResult<Vec<Image>> {
        if image_ids.is_empty() {
            return Ok(Vec::new());
        }

        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, owner_id, title, slug, url, description, total_likes, created_at
            FROM images
            WHERE id = ANY($1)
            "#,
        )
        .bind(image_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    async fn add_like(&self, image_id: Uuid, user_id: Uuid) -> ServiceResult<Option<LikeChange>> {
        let mut tx = self.pool.begin().await?;
        if !lock_image(&mut *tx, image_id).await? {
            return Ok(None);
        }

        let changed = sqlx::query(
            r#"
            INSERT INTO image_likes (image_id, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (image_id, user_id) DO NOTHING
            "#,
        )
        .bind(image_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        let total_likes = refresh_total_likes(&mut *tx, image_id).await?;
        tx.commit().await?;

        Ok(Some(LikeChange {
            changed,
            total_likes,
        }))
    }

    async fn remove_like(
        &self,
        image_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Option<LikeChange>> {
        let mut tx = self.pool.begin().await?;
        if !lock_image(&mut *tx, image_id).await? {
            return Ok(None);
        }

        let changed = sqlx::query("DELETE FROM image_likes WHERE image_id = $1 AND user_id = $2")
            .bind(image_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        let total_likes = refresh_total_likes(&mut *tx, image_id).await?;
        tx.commit().await?;

        Ok(Some(LikeChange {
            changed,
            total_likes,
        }))
    }
}
