use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::app_state::AppState;
use crate::error::AppError;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "glimpse-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "alive" }))
}

/// Readiness exercises the document store with a cheap point read.
pub async fn readiness(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state
        .store
        .get(crate::models::collections::USERS, "readiness-probe")
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "ready" })))
}
