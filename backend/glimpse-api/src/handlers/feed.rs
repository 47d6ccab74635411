use actix_web::{web, HttpResponse};

use crate::app_state::AppState;
use crate::error::AppError;
use crate::middleware::jwt_auth::UserId;
use crate::services::feed::FeedService;
use crate::services::friends::FriendService;

pub async fn get_feed(
    state: web::Data<AppState>,
    user_id: UserId,
) -> Result<HttpResponse, AppError> {
    let friends = FriendService::new(state.store.clone());
    let feed = FeedService::new(state.store.clone(), friends)
        .assemble_feed(Some(user_id.0))
        .await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Anonymous variant of the feed; only public posts survive the filter.
pub async fn get_public_feed(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let friends = FriendService::new(state.store.clone());
    let feed = FeedService::new(state.store.clone(), friends)
        .assemble_feed(None)
        .await?;
    Ok(HttpResponse::Ok().json(feed))
}
