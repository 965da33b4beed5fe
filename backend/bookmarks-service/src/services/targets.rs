//! Resolution of polymorphic action targets into display data.
//!
//! Each entity type an action can point at registers a resolver that
//! batch-loads summaries for a set of ids. Targets that no longer exist are
//! simply absent from the result.

use crate::domain::models::{EntityType, TargetRef, TargetSummary};
use crate::error::ServiceResult;
use crate::repository::{ImageStore, UserStore};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Summaries for the given ids; missing ids are skipped
    async fn resolve(&self, ids: &[Uuid]) -> ServiceResult<Vec<TargetSummary>>;
}

pub struct UserTargetResolver {
    users: Arc<dyn UserStore>,
}

impl UserTargetResolver {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl TargetResolver for UserTargetResolver {
    async fn resolve(&self, ids: &[Uuid]) -> ServiceResult<Vec<TargetSummary>> {
        let users = self.users.find_many(ids).await?;
        Ok(users
            .into_iter()
            .map(|user| TargetSummary {
                entity_type: EntityType::User,
                entity_id: user.id,
                path: format!("/api/v1/users/{}", user.username),
                label: user.username,
            })
            .collect())
    }
}

pub struct ImageTargetResolver {
    images: Arc<dyn ImageStore>,
}

impl ImageTargetResolver {
    pub fn new(images: Arc<dyn ImageStore>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl TargetResolver for ImageTargetResolver {
    async fn resolve(&self, ids: &[Uuid]) -> ServiceResult<Vec<TargetSummary>> {
        let images = self.images.find_many(ids).await?;
        Ok(images
            .into_iter()
            .map(|image| TargetSummary {
                entity_type: EntityType::Image,
                entity_id: image.id,
                path: format!("/api/v1/images/{}/{}", image.id, image.slug),
                label: image.title,
            })
            .collect())
    }
}

/// Entity type -> resolver table
#[derive(Clone, Default)]
pub struct TargetRegistry {
    resolvers: HashMap<EntityType, Arc<dyn TargetResolver>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with resolvers for every entity type this service knows
    pub fn standard(users: Arc<dyn UserStore>, images: Arc<dyn ImageStore>) -> Self {
        Self::new()
            .with(EntityType::User, Arc::new(UserTargetResolver::new(users)))
            .with(EntityType::Image, Arc::new(ImageTargetResolver::new(images)))
    }

    pub fn with(mut self, entity_type: EntityType, resolver: Arc<dyn TargetResolver>) -> Self {
        self.resolvers.insert(entity_type, resolver);
        self
    }

    /// Resolve a set of targets, one batch query per entity type
    pub async fn resolve_all(
        &self,
        targets: impl IntoIterator<Item = TargetRef>,
    ) -> ServiceResult<HashMap<TargetRef, TargetSummary>> {
        let mut by_type: HashMap<EntityType, BTreeSet<Uuid>> = HashMap::new();
        for target in targets {
            by_type
                .entry(target.entity_type)
                .or_default()
                .insert(target.entity_id);
        }

        let mut resolved = HashMap::new();
        for (entity_type, ids) in by_type {
            let Some(resolver) = self.resolvers.get(&entity_type) else {
                warn!(entity_type = %entity_type, "no resolver registered for target type");
                continue;
            };
            let ids: Vec<Uuid> = ids.into_iter().collect();
            for summary in resolver.resolve(&ids).await? {
                let key = TargetRef {
                    entity_type: summary.entity_type,
                    entity_id: summary.entity_id,
                };
                resolved.insert(key, summary);
            }
        }

        Ok(resolved)
    }
}
