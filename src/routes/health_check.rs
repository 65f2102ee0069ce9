use actix_web::HttpResponse;
use serde_json::json;

/// GET /api/health/live
pub async fn live() -> HttpResponse {
    tracing::debug!("Health check endpoint called");
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// GET /
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Welcome to Talangraga Backend" }))
}
