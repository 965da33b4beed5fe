use crate::domain::models::NewImage;
use crate::error::ServiceResult;
use crate::handlers::{AppState, LimitQuery};
use crate::middleware::ViewerId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub id: Uuid,
    pub action: LikeAction,
}

/// Bookmark an external image
pub async fn bookmark(
    state: web::Data<AppState>,
    viewer: ViewerId,
    body: web::Json<NewImage>,
) -> ServiceResult<HttpResponse> {
    state
        .users
        .ensure_viewer(viewer.id, viewer.username.as_deref())
        .await?;
    let image = state.images.bookmark(viewer.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(image))
}

/// Image detail; each request counts as a view
pub async fn detail(
    state: web::Data<AppState>,
    _viewer: ViewerId,
    path: web::Path<(Uuid, String)>,
) -> ServiceResult<HttpResponse> {
    let (image_id, slug) = path.into_inner();
    let detail = state.images.detail(image_id, &slug).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn like(
    state: web::Data<AppState>,
    viewer: ViewerId,
    body: web::Json<LikeRequest>,
) -> ServiceResult<HttpResponse> {
    state
        .users
        .ensure_viewer(viewer.id, viewer.username.as_deref())
        .await?;
    match body.action {
        LikeAction::Like => state.images.like(viewer.id, body.id).await?,
        LikeAction::Unlike => state.images.unlike(viewer.id, body.id).await?,
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

/// Most viewed images
pub async fn ranking(
    state: web::Data<AppState>,
    _viewer: ViewerId,
    query: web::Query<LimitQuery>,
) -> ServiceResult<HttpResponse> {
    let limit = query.resolve(state.ranking_default_limit);
    let images = state.images.ranking(limit).await?;
    Ok(HttpResponse::Ok().json(images))
}
