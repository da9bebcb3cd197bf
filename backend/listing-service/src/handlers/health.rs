use actix_web::{web, HttpResponse};

use crate::AppState;

pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    match state.listings.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "listing-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("Store unavailable: {}", e),
            "service": "listing-service"
        })),
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
