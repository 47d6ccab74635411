//! Feed assembly: one global newest-first pass over the posts collection,
//! filtered through the visibility rules for the current viewer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use doc_store::{DocumentStore, Query};

use crate::error::Result;
use crate::models::collections::{POSTS, USERS};
use crate::models::{Post, PrivacyMode, User, DEFAULT_AVATAR_URL};
use crate::services::friends::FriendService;
use crate::services::visibility::is_visible;
use crate::utils::relative_time;

/// One rendered feed entry. Field names match what the posts collection
/// stores, plus a few viewer-relative fields computed at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub user_id: Uuid,
    pub username: String,
    #[serde(rename = "userPhotoURL")]
    pub user_photo_url: String,
    pub image_url: String,
    pub caption: String,
    pub privacy_mode: PrivacyMode,
    pub likes_count: i64,
    pub liked: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub time_ago: String,
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn DocumentStore>,
    friends: FriendService,
}

impl FeedService {
    pub fn new(store: Arc<dyn DocumentStore>, friends: FriendService) -> Self {
        Self { store, friends }
    }

    /// Builds the feed for `viewer` (`None` for an unauthenticated reader,
    /// who sees public posts only). The viewer's friend set is fetched once
    /// and reused for every post; ordering is newest-first and the
    /// visibility filter never reorders surviving posts.
    pub async fn assemble_feed(&self, viewer: Option<Uuid>) -> Result<Vec<FeedItem>> {
        let friend_ids = match viewer {
            Some(viewer_id) => self.friends.friend_ids_of(viewer_id).await?,
            None => Default::default(),
        };

        let docs = self
            .store
            .query(POSTS, Query::new().order_by_desc("createdAt"))
            .await?;

        let mut items = Vec::with_capacity(docs.len());
        for doc in docs {
            let post: Post = match serde_json::from_value(doc.data) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("skipping malformed post {}: {}", doc.id, e);
                    continue;
                }
            };
            if !is_visible(&post, viewer, &friend_ids) {
                continue;
            }

            let user_photo_url = self.author_photo(post.user_id).await;
            let liked = viewer.is_some_and(|v| post.liked_by.contains(&v));

            items.push(FeedItem {
                id: doc.id,
                user_id: post.user_id,
                username: post.username,
                user_photo_url,
                image_url: post.image_url,
                caption: post.caption,
                privacy_mode: post.privacy_mode,
                likes_count: post.likes_count,
                liked,
                created_at: post.created_at,
                time_ago: relative_time(post.created_at),
            });
        }
        Ok(items)
    }

    // Author avatar looked up per post; a missing or malformed user doc
    // falls back to the default avatar rather than failing the feed.
    async fn author_photo(&self, author: Uuid) -> String {
        match self.store.get(USERS, &author.to_string()).await {
            Ok(Some(data)) => match serde_json::from_value::<User>(data) {
                Ok(user) => user.photo_url(),
                Err(_) => DEFAULT_AVATAR_URL.to_string(),
            },
            Ok(None) => DEFAULT_AVATAR_URL.to_string(),
            Err(e) => {
                tracing::warn!("author lookup failed for {}: {}", author, e);
                DEFAULT_AVATAR_URL.to_string()
            }
        }
    }
}
