use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Verb logged when a user follows another user
pub const VERB_FOLLOWING: &str = "is following";
/// Verb logged when a user likes an image
pub const VERB_LIKES: &str = "likes";
/// Verb logged when a user bookmarks an external image
pub const VERB_BOOKMARKED: &str = "bookmarked image";

/// Kind of entity an action can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Image,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Image => "image",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EntityType::User),
            "image" => Ok(EntityType::Image),
            other => Err(format!("unknown entity type: {}", other)),
        }
    }
}

/// Polymorphic reference to the entity an action was performed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
}

impl TargetRef {
    pub fn user(id: Uuid) -> Self {
        Self {
            entity_type: EntityType::User,
            entity_id: id,
        }
    }

    pub fn image(id: Uuid) -> Self {
        Self {
            entity_type: EntityType::Image,
            entity_id: id,
        }
    }
}

/// Action entity - one entry of the activity stream.
///
/// Actions are append-only: they are created once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub user_id: Uuid,
    pub verb: String,
    pub target: Option<TargetRef>,
    pub created_at: DateTime<Utc>,
}

/// User as seen by this service (accounts are owned by the identity layer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Longest username the `users.username` column accepts
pub const MAX_USERNAME_LEN: usize = 150;

/// Body of `PUT /api/v1/users/me`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UsernameUpdate {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
}

/// User profile with both sides of the social graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
}

/// Image bookmarked from an external site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Image {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub description: String,
    pub total_likes: i32,
    pub created_at: DateTime<Utc>,
}

/// Bookmarklet payload for a new image
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewImage {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(url, length(max = 2000))]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Image detail with its current view count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDetail {
    #[serde(flatten)]
    pub image: Image,
    pub total_views: i64,
}

/// Outcome of a like/unlike call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeChange {
    /// Whether the like relation actually changed
    pub changed: bool,
    /// Like count recomputed after the change
    pub total_likes: i32,
}

/// Display data for an action target, produced by a target resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub label: String,
    pub path: String,
}

/// Action hydrated for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub action: Action,
    pub actor_username: Option<String>,
    pub target_summary: Option<TargetSummary>,
}
