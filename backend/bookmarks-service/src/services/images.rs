use crate::domain::models::{
    Image, ImageDetail, LikeChange, NewImage, TargetRef, VERB_BOOKMARKED, VERB_LIKES,
};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics;
use crate::repository::ImageStore;
use crate::services::activity::ActivityLogger;
use crate::services::clock::Clock;
use crate::services::ranking::{Ranking, ViewCounter};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Lowercase ASCII slug; runs of anything else become a single `-`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("image");
    }
    slug
}

fn has_allowed_extension(url: &str) -> bool {
    url.rsplit_once('.')
        .map(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Bookmarked images: creation, detail views, likes and the view ranking
#[derive(Clone)]
pub struct ImageService {
    images: Arc<dyn ImageStore>,
    activity: ActivityLogger,
    views: ViewCounter,
    ranking: Ranking,
    clock: Arc<dyn Clock>,
}

impl ImageService {
    pub fn new(
        images: Arc<dyn ImageStore>,
        activity: ActivityLogger,
        views: ViewCounter,
        ranking: Ranking,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            images,
            activity,
            views,
            ranking,
            clock,
        }
    }

    pub async fn bookmark(&self, owner_id: Uuid, new_image: NewImage) -> ServiceResult<Image> {
        new_image.validate()?;
        if !has_allowed_extension(&new_image.url) {
            return Err(ServiceError::InvalidInput(
                "the given URL does not match valid image extensions".into(),
            ));
        }

        let image = Image {
            id: Uuid::new_v4(),
            owner_id,
            slug: slugify(&new_image.title),
            title: new_image.title,
            url: new_image.url,
            description: new_image.description,
            total_likes: 0,
            created_at: self.clock.now(),
        };
        self.images.create(&image).await?;
        info!(image_id = %image.id, owner_id = %owner_id, "image bookmarked");

        self.activity
            .record(owner_id, VERB_BOOKMARKED, Some(TargetRef::image(image.id)))
            .await?;

        Ok(image)
    }

    /// Image detail; counts one view
    pub async fn detail(&self, image_id: Uuid, slug: &str) -> ServiceResult<ImageDetail> {
        let image = self
            .images
            .get(image_id)
            .await?
            .filter(|image| image.slug == slug)
            .ok_or_else(|| ServiceError::NotFound(format!("image {}", image_id)))?;

        let total_views = self.views.increment(image.id).await?;
        Ok(ImageDetail { image, total_views })
    }

    pub async fn like(&self, user_id: Uuid, image_id: Uuid) -> ServiceResult<LikeChange> {
        let change = self
            .images
            .add_like(image_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("image {}", image_id)))?;
        if change.changed {
            metrics::record_like_change("like");
        }

        self.activity
            .record(user_id, VERB_LIKES, Some(TargetRef::image(image_id)))
            .await?;

        Ok(change)
    }

    pub async fn unlike(&self, user_id: Uuid, image_id: Uuid) -> ServiceResult<LikeChange> {
        let change = self
            .images
            .remove_like(image_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("image {}", image_id)))?;
        if change.changed {
            metrics::record_like_change("unlike");
        }
        Ok(change)
    }

    /// Most viewed images in rank order; ranked ids no longer stored are skipped
    pub async fn ranking(&self, n: usize) -> ServiceResult<Vec<Image>> {
        let ids = self.ranking.top_n(n).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<Uuid, Image> = self
            .images
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|image| (image.id, image))
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| {
                let image = by_id.remove(&id);
                if image.is_none() {
                    warn!(image_id = %id, "ranked image missing from store");
                }
                image
            })
            .collect())
    }
}
