//! In-memory storage adapters and an app builder shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use bookmarks_service::config::{ActivityConfig, RankingConfig};
use bookmarks_service::domain::models::{Action, Image, LikeChange, TargetRef, User};
use bookmarks_service::error::ServiceResult;
use bookmarks_service::handlers::{AppState, Stores};
use bookmarks_service::repository::{ActionStore, FeedFilter, FollowStore, ImageStore, UserStore};
use bookmarks_service::services::{CounterStore, ManualClock};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryActionStore {
    pub actions: Mutex<Vec<Action>>,
}

impl MemoryActionStore {
    pub fn all(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn count_for(&self, user_id: Uuid, verb: &str) -> usize {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id && a.verb == verb)
            .count()
    }
}

#[async_trait]
impl ActionStore for MemoryActionStore {
    async fn exists_since(
        &self,
        user_id: Uuid,
        verb: &str,
        target: Option<TargetRef>,
        since: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        Ok(self.actions.lock().unwrap().iter().any(|a| {
            a.user_id == user_id && a.verb == verb && a.target == target && a.created_at >= since
        }))
    }

    async fn insert(&self, action: &Action) -> ServiceResult<()> {
        self.actions.lock().unwrap().push(action.clone());
        Ok(())
    }

    async fn recent(&self, filter: &FeedFilter) -> ServiceResult<Vec<Action>> {
        let mut matching: Vec<Action> = self
            .actions
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id != filter.viewer)
            .filter(|a| {
                filter
                    .actors
                    .as_ref()
                    .map(|actors| actors.contains(&a.user_id))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matching.truncate(filter.limit);
        Ok(matching)
    }
}

#[derive(Default)]
pub struct MemoryFollowStore {
    edges: Mutex<Vec<(Uuid, Uuid)>>,
}

#[async_trait]
impl FollowStore for MemoryFollowStore {
    async fn create(&self, follower_id: Uuid, followee_id: Uuid) -> ServiceResult<bool> {
        let mut edges = self.edges.lock().unwrap();
        if edges.contains(&(follower_id, followee_id)) {
            return Ok(false);
        }
        edges.push((follower_id, followee_id));
        Ok(true)
    }

    async fn delete(&self, follower_id: Uuid, followee_id: Uuid) -> ServiceResult<bool> {
        let mut edges = self.edges.lock().unwrap();
        let before = edges.len();
        edges.retain(|edge| *edge != (follower_id, followee_id));
        Ok(edges.len() < before)
    }

    async fn following_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        Ok(self
            .edges
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followee)| *followee)
            .collect())
    }

    async fn follower_ids(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        Ok(self
            .edges
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(_, followee)| *followee == user_id)
            .map(|(follower, _)| *follower)
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryImageStore {
    images: Mutex<HashMap<Uuid, Image>>,
    likes: Mutex<HashSet<(Uuid, Uuid)>>,
}

impl MemoryImageStore {
    pub fn remove(&self, image_id: Uuid) {
        self.images.lock().unwrap().remove(&image_id);
    }

    fn apply_like(&self, image_id: Uuid, user_id: Uuid, add: bool) -> Option<LikeChange> {
        let mut images = self.images.lock().unwrap();
        let image = images.get_mut(&image_id)?;
        let mut likes = self.likes.lock().unwrap();
        let changed = if add {
            likes.insert((image_id, user_id))
        } else {
            likes.remove(&(image_id, user_id))
        };
        image.total_likes = likes.iter().filter(|(id, _)| *id == image_id).count() as i32;
        Some(LikeChange {
            changed,
            total_likes: image.total_likes,
        })
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn create(&self, image: &Image) -> ServiceResult<()> {
        self.images.lock().unwrap().insert(image.id, image.clone());
        Ok(())
    }

    async fn get(&self, image_id: Uuid) -> ServiceResult<Option<Image>> {
        Ok(self.images.lock().unwrap().get(&image_id).cloned())
    }

    async fn find_many(&self, image_ids: &[Uuid]) -> ServiceResult<Vec<Image>> {
        let images = self.images.lock().unwrap();
        Ok(image_ids
            .iter()
            .filter_map(|id| images.get(id).cloned())
            .collect())
    }

    async fn add_like(&self, image_id: Uuid, user_id: Uuid) -> ServiceResult<Option<LikeChange>> {
        Ok(self.apply_like(image_id, user_id, true))
    }

    async fn remove_like(
        &self,
        image_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Option<LikeChange>> {
        Ok(self.apply_like(image_id, user_id, false))
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert(&self, user_id: Uuid, username: &str) -> ServiceResult<()> {
        self.users.lock().unwrap().insert(
            user_id,
            User {
                id: user_id,
                username: username.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn create_if_missing(&self, user_id: Uuid, username: &str) -> ServiceResult<bool> {
        if self.exists(user_id).await? {
            return Ok(false);
        }
        self.upsert(user_id, username).await?;
        Ok(true)
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self, limit: usize) -> ServiceResult<Vec<User>> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users.truncate(limit);
        Ok(users)
    }

    async fn exists(&self, user_id: Uuid) -> ServiceResult<bool> {
        Ok(self.users.lock().unwrap().contains_key(&user_id))
    }

    async fn find_many(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<User>> {
        let users = self.users.lock().unwrap();
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }
}

/// Sorted-set stand-in; equal scores come back in descending member order
/// like ZREVRANGE does.
#[derive(Default)]
pub struct MemoryCounterStore {
    views: Mutex<HashMap<Uuid, i64>>,
}

impl MemoryCounterStore {
    pub fn set_views(&self, item_id: Uuid, views: i64) {
        self.views.lock().unwrap().insert(item_id, views);
    }

    fn sorted_desc(&self) -> Vec<(Uuid, f64)> {
        let mut entries: Vec<(Uuid, f64)> = self
            .views
            .lock()
            .unwrap()
            .iter()
            .map(|(id, views)| (*id, *views as f64))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.0.cmp(&a.0)));
        entries
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment_views(&self, item_id: Uuid) -> ServiceResult<i64> {
        let mut views = self.views.lock().unwrap();
        let count = views.entry(item_id).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn views(&self, item_id: Uuid) -> ServiceResult<i64> {
        Ok(self.views.lock().unwrap().get(&item_id).copied().unwrap_or(0))
    }

    async fn top_with_scores(&self, n: usize) -> ServiceResult<Vec<(Uuid, f64)>> {
        Ok(self.sorted_desc().into_iter().take(n).collect())
    }

    async fn ties_at(&self, score: f64, limit: usize) -> ServiceResult<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self
            .sorted_desc()
            .into_iter()
            .filter(|(_, s)| *s == score)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids.truncate(limit);
        Ok(ids)
    }

    async fn ping(&self) -> ServiceResult<()> {
        Ok(())
    }
}

/// Fully wired application over in-memory stores and a manual clock
pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub actions: Arc<MemoryActionStore>,
    pub follows: Arc<MemoryFollowStore>,
    pub images: Arc<MemoryImageStore>,
    pub users: Arc<MemoryUserStore>,
    pub counters: Arc<MemoryCounterStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let actions = Arc::new(MemoryActionStore::default());
        let follows = Arc::new(MemoryFollowStore::default());
        let images = Arc::new(MemoryImageStore::default());
        let users = Arc::new(MemoryUserStore::default());
        let counters = Arc::new(MemoryCounterStore::default());

        let stores = Stores {
            actions: actions.clone(),
            follows: follows.clone(),
            images: images.clone(),
            users: users.clone(),
            counters: counters.clone(),
        };
        let state = AppState::new(
            stores,
            clock.clone(),
            &ActivityConfig::default(),
            &RankingConfig::default(),
        );

        Self {
            state,
            clock,
            actions,
            follows,
            images,
            users,
            counters,
        }
    }

    pub async fn user(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.upsert(id, username).await.unwrap();
        id
    }

    /// Insert an image directly, bypassing activity logging
    pub async fn image(&self, owner_id: Uuid, title: &str) -> Image {
        let image = Image {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            url: format!("https://example.com/{}.jpg", Uuid::new_v4()),
            description: String::new(),
            total_likes: 0,
            created_at: Utc::now(),
        };
        self.images.create(&image).await.unwrap();
        image
    }
}
