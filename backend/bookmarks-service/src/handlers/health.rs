use crate::handlers::AppState;
use crate::metrics;
use actix_web::{web, HttpResponse, Responder};
use tracing::warn;

pub async fn health() -> impl Responder {
    "OK"
}

/// Ready once both PostgreSQL and Redis answer
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    if let Err(e) = state.actions.health_check().await {
        warn!(error = %e, "readiness: database unavailable");
        return HttpResponse::ServiceUnavailable().body("database unavailable");
    }
    if let Err(e) = state.counters.ping().await {
        warn!(error = %e, "readiness: redis unavailable");
        return HttpResponse::ServiceUnavailable().body("redis unavailable");
    }
    HttpResponse::Ok().body("READY")
}

pub async fn metrics() -> HttpResponse {
    match metrics::render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => HttpResponse::InternalServerError().body(format!("error: {}", e)),
    }
}
