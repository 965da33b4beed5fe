//! HTTP surface: thin JSON handlers over the services.

pub mod activity;
pub mod health;
pub mod images;
pub mod social;
pub mod users;

use crate::config::{ActivityConfig, RankingConfig};
use crate::repository::{ActionStore, FollowStore, ImageStore, UserStore};
use crate::services::{
    ActivityFeed, ActivityLogger, Clock, CounterStore, FollowService, ImageService, Ranking,
    TargetRegistry, UserService, ViewCounter,
};
use actix_web::web;
use serde::Deserialize;
use std::sync::Arc;

/// Storage adapters the application is assembled from
#[derive(Clone)]
pub struct Stores {
    pub actions: Arc<dyn ActionStore>,
    pub follows: Arc<dyn FollowStore>,
    pub images: Arc<dyn ImageStore>,
    pub users: Arc<dyn UserStore>,
    pub counters: Arc<dyn CounterStore>,
}

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub activity: ActivityLogger,
    pub feed: ActivityFeed,
    pub follows: FollowService,
    pub images: ImageService,
    pub users: UserService,
    pub actions: Arc<dyn ActionStore>,
    pub counters: Arc<dyn CounterStore>,
    pub ranking_default_limit: usize,
}

impl AppState {
    pub fn new(
        stores: Stores,
        clock: Arc<dyn Clock>,
        activity_config: &ActivityConfig,
        ranking_config: &RankingConfig,
    ) -> Self {
        let activity = ActivityLogger::new(
            stores.actions.clone(),
            clock.clone(),
            activity_config.dedup_window(),
        );
        let targets = TargetRegistry::standard(stores.users.clone(), stores.images.clone());
        let feed = ActivityFeed::new(
            stores.actions.clone(),
            stores.follows.clone(),
            stores.users.clone(),
            targets,
            activity_config.feed_default_limit,
        );
        let follows = FollowService::new(stores.follows, stores.users.clone(), activity.clone());
        let users = UserService::new(stores.users, follows.clone());
        let images = ImageService::new(
            stores.images,
            activity.clone(),
            ViewCounter::new(stores.counters.clone()),
            Ranking::new(stores.counters.clone()),
            clock,
        );

        Self {
            activity,
            feed,
            follows,
            images,
            users,
            actions: stores.actions,
            counters: stores.counters,
            ranking_default_limit: ranking_config.default_limit,
        }
    }
}

/// Largest page any list endpoint returns
pub const MAX_PAGE_LIMIT: usize = 100;

/// `?limit=` query
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    /// Requested limit or `default`, capped at `MAX_PAGE_LIMIT`
    pub fn resolve(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).min(MAX_PAGE_LIMIT)
    }
}

/// Register every route on an actix `App`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/ready", web::get().to(health::ready))
        .route("/metrics", web::get().to(health::metrics))
        .service(
            web::scope("/api/v1")
                .route("/dashboard", web::get().to(activity::dashboard))
                .route("/users", web::get().to(users::list))
                .route("/users/me", web::put().to(users::update_me))
                .route("/users/follow", web::post().to(social::follow))
                .route("/users/{username}", web::get().to(users::detail))
                .route("/images", web::post().to(images::bookmark))
                .route("/images/like", web::post().to(images::like))
                .route("/images/ranking", web::get().to(images::ranking))
                .route("/images/{id}/{slug}", web::get().to(images::detail)),
        );
}
