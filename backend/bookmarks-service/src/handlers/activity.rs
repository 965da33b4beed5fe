use crate::error::ServiceResult;
use crate::handlers::{AppState, LimitQuery, MAX_PAGE_LIMIT};
use crate::middleware::ViewerId;
use actix_web::{web, HttpResponse};

/// Activity dashboard for the requesting user
pub async fn dashboard(
    state: web::Data<AppState>,
    viewer: ViewerId,
    query: web::Query<LimitQuery>,
) -> ServiceResult<HttpResponse> {
    let limit = query.limit.map(|n| n.min(MAX_PAGE_LIMIT));
    let entries = state.feed.dashboard(viewer.id, limit).await?;
    Ok(HttpResponse::Ok().json(entries))
}
