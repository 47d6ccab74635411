use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::middleware::jwt_auth::UserId;
use crate::services::friends::FriendService;

fn parse_uuid(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid user id {raw}")))
}

pub async fn list_requests(
    state: web::Data<AppState>,
    user_id: UserId,
) -> Result<HttpResponse, AppError> {
    let requests = FriendService::new(state.store.clone())
        .pending_requests(user_id.0)
        .await?;
    Ok(HttpResponse::Ok().json(requests))
}

pub async fn send_request(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let recipient = parse_uuid(&path.into_inner())?;
    FriendService::new(state.store.clone())
        .send_request(user_id.0, recipient)
        .await?;
    Ok(HttpResponse::Created().finish())
}

pub async fn accept_request(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let sender = parse_uuid(&path.into_inner())?;
    FriendService::new(state.store.clone())
        .accept_request(user_id.0, sender)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn deny_request(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let sender = parse_uuid(&path.into_inner())?;
    FriendService::new(state.store.clone())
        .deny_request(user_id.0, sender)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
