use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::middleware::jwt_auth::UserId;
use crate::models::PrivacyMode;
use crate::services::comments::CommentService;
use crate::services::posts::PostService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default = "default_privacy")]
    pub privacy_mode: PrivacyMode,
}

fn default_privacy() -> PrivacyMode {
    PrivacyMode::Public
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let id = PostService::new(state.store.clone())
        .create_post(user_id.0, &body.image_url, &body.caption, body.privacy_mode)
        .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "id": id })))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    PostService::new(state.store.clone())
        .delete_post(user_id.0, &path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn like_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    PostService::new(state.store.clone())
        .like(user_id.0, &path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn unlike_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    PostService::new(state.store.clone())
        .unlike(user_id.0, &path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_comments(
    state: web::Data<AppState>,
    _user_id: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let comments = CommentService::new(state.store.clone())
        .list_comments(&path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, AppError> {
    let id = CommentService::new(state.store.clone())
        .add_comment(user_id.0, &path.into_inner(), &body.text)
        .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "id": id })))
}
