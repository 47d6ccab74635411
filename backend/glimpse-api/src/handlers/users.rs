use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::middleware::jwt_auth::UserId;
use crate::services::friends::FriendService;
use crate::services::posts::PostService;
use crate::services::users::{ProfileUpdate, UserService};
use crate::services::visibility::is_visible;
use crate::utils::relative_time;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub birthday: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPhotoRequest {
    pub url: String,
}

fn user_service(state: &AppState) -> UserService {
    UserService::new(
        state.store.clone(),
        FriendService::new(state.store.clone()),
    )
}

/// Public profile page: the profile projection plus the subject's posts,
/// filtered by what the viewer is allowed to see.
pub async fn get_profile(
    state: web::Data<AppState>,
    viewer: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let users = user_service(&state);
    let profile = users.profile_by_username(&path.into_inner()).await?;

    let friends = FriendService::new(state.store.clone());
    let friend_ids = friends.friend_ids_of(viewer.0).await?;
    let posts = PostService::new(state.store.clone())
        .user_posts(profile.id)
        .await?;
    let visible: Vec<serde_json::Value> = posts
        .into_iter()
        .filter(|(_, post)| is_visible(post, Some(viewer.0), &friend_ids))
        .map(|(id, post)| {
            serde_json::json!({
                "id": id,
                "imageUrl": post.image_url,
                "caption": post.caption,
                "privacyMode": post.privacy_mode,
                "likesCount": post.likes_count,
                "createdAt": post.created_at,
                "timeAgo": relative_time(post.created_at),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "profile": profile,
        "posts": visible,
    })))
}

pub async fn get_me(
    state: web::Data<AppState>,
    user_id: UserId,
) -> Result<HttpResponse, AppError> {
    let user = user_service(&state).get_user(user_id.0).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn update_me(
    state: web::Data<AppState>,
    user_id: UserId,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let user = user_service(&state)
        .update_profile(
            user_id.0,
            ProfileUpdate {
                display_name: body.display_name,
                username: body.username,
                bio: body.bio,
                website: body.website,
                birthday: body.birthday,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn set_photo(
    state: web::Data<AppState>,
    user_id: UserId,
    body: web::Json<SetPhotoRequest>,
) -> Result<HttpResponse, AppError> {
    user_service(&state).set_photo(user_id.0, &body.url).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn suggestions(
    state: web::Data<AppState>,
    user_id: UserId,
) -> Result<HttpResponse, AppError> {
    let suggestions = user_service(&state).suggestions(user_id.0).await?;
    Ok(HttpResponse::Ok().json(suggestions))
}
