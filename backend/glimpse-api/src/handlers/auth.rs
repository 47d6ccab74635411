use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::middleware::jwt_auth::UserId;
use crate::security::jwt::TokenResponse;
use crate::services::identity::IdentityService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedRequest {
    pub provider: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub username: String,
    #[serde(flatten)]
    pub tokens: TokenResponse,
}

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let session = IdentityService::new(state.store.clone())
        .sign_up(&body.email, &body.password)
        .await?;
    Ok(HttpResponse::Created().json(SessionResponse {
        user_id: session.user_id,
        username: session.username,
        tokens: session.tokens,
    }))
}

pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let session = IdentityService::new(state.store.clone())
        .sign_in(&body.email, &body.password)
        .await?;
    Ok(HttpResponse::Ok().json(SessionResponse {
        user_id: session.user_id,
        username: session.username,
        tokens: session.tokens,
    }))
}

pub async fn federated(
    state: web::Data<AppState>,
    body: web::Json<FederatedRequest>,
) -> Result<HttpResponse, AppError> {
    let session = IdentityService::new(state.store.clone())
        .federated_sign_in(
            &body.provider,
            &body.email,
            body.display_name.as_deref(),
            body.photo_url.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(SessionResponse {
        user_id: session.user_id,
        username: session.username,
        tokens: session.tokens,
    }))
}

pub async fn password_reset(
    state: web::Data<AppState>,
    body: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, AppError> {
    IdentityService::new(state.store.clone())
        .send_password_reset(&body.email)
        .await?;
    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "message": "password reset email sent"
    })))
}

pub async fn change_password(
    state: web::Data<AppState>,
    user_id: UserId,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    IdentityService::new(state.store.clone())
        .change_password(user_id.0, &body.current_password, &body.new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
