use crate::domain::models::UsernameUpdate;
use crate::error::ServiceResult;
use crate::handlers::{AppState, LimitQuery};
use crate::middleware::ViewerId;
use actix_web::{web, HttpResponse};

const DEFAULT_USER_PAGE: usize = 50;

/// Set the requesting user's username
pub async fn update_me(
    state: web::Data<AppState>,
    viewer: ViewerId,
    body: web::Json<UsernameUpdate>,
) -> ServiceResult<HttpResponse> {
    let user = state.users.rename(viewer.id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Known users ordered by username
pub async fn list(
    state: web::Data<AppState>,
    _viewer: ViewerId,
    query: web::Query<LimitQuery>,
) -> ServiceResult<HttpResponse> {
    let users = state.users.list(query.resolve(DEFAULT_USER_PAGE)).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Profile with follower and following ids
pub async fn detail(
    state: web::Data<AppState>,
    _viewer: ViewerId,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let profile = state.users.profile(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}
