use crate::error::ServiceResult;
use crate::handlers::AppState;
use crate::middleware::ViewerId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub id: Uuid,
    pub action: FollowAction,
}

/// Follow or unfollow another user
pub async fn follow(
    state: web::Data<AppState>,
    viewer: ViewerId,
    body: web::Json<FollowRequest>,
) -> ServiceResult<HttpResponse> {
    state
        .users
        .ensure_viewer(viewer.id, viewer.username.as_deref())
        .await?;
    match body.action {
        FollowAction::Follow => state.follows.follow(viewer.id, body.id).await?,
        FollowAction::Unfollow => state.follows.unfollow(viewer.id, body.id).await?,
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}
