//! Post lifecycle: creation with denormalized author fields, deletion with
//! an ownership check, and the like/unlike field-op pair.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use doc_store::{server_timestamp, DocumentStore, FieldOp, Query};

use crate::error::{AppError, Result};
use crate::models::collections::{POSTS, USERS};
use crate::models::{Post, PrivacyMode, User};
use crate::validators::validate_caption;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn DocumentStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Creates a post owned by `author`. The author's username is copied
    /// into the post document at write time and never re-read afterwards.
    pub async fn create_post(
        &self,
        author: Uuid,
        image_url: &str,
        caption: &str,
        privacy_mode: PrivacyMode,
    ) -> Result<String> {
        let caption = caption.trim();
        validate_caption(caption)?;
        if image_url.trim().is_empty() {
            return Err(AppError::BadRequest("imageUrl is required".to_string()));
        }
        if privacy_mode == PrivacyMode::Unknown {
            return Err(AppError::BadRequest(
                "privacyMode must be one of Public, Private, Friends Only".to_string(),
            ));
        }

        let author_data = self
            .store
            .get(USERS, &author.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {author}")))?;
        let author_doc: User = serde_json::from_value(author_data)?;

        let post = json!({
            "userId": author.to_string(),
            "username": author_doc.username,
            "imageUrl": image_url,
            "caption": caption,
            "privacyMode": privacy_mode,
            "likesCount": 0,
            "likedBy": [],
            "createdAt": server_timestamp(),
        });
        let id = self.store.insert(POSTS, post).await?;

        if let Err(e) = self
            .store
            .update(
                USERS,
                &author.to_string(),
                vec![FieldOp::increment("postsCount", 1)],
            )
            .await
        {
            tracing::warn!("postsCount increment failed for {}: {}", author, e);
        }

        tracing::info!("post {} created by {}", id, author);
        Ok(id)
    }

    /// Only the owner may delete a post.
    pub async fn delete_post(&self, actor: Uuid, post_id: &str) -> Result<()> {
        let post = self.load(post_id).await?;
        if post.user_id != actor {
            return Err(AppError::Authorization(
                "only the author can delete a post".to_string(),
            ));
        }
        self.store.delete(POSTS, post_id).await?;

        if let Err(e) = self
            .store
            .update(
                USERS,
                &actor.to_string(),
                vec![FieldOp::increment("postsCount", -1)],
            )
            .await
        {
            tracing::warn!("postsCount decrement failed for {}: {}", actor, e);
        }
        Ok(())
    }

    /// Records a like. Both the counter and the membership array change in
    /// one update, and liking twice is a no-op, so `likesCount` stays equal
    /// to `likedBy.len()`.
    pub async fn like(&self, actor: Uuid, post_id: &str) -> Result<()> {
        let post = self.load(post_id).await?;
        if post.liked_by.contains(&actor) {
            return Ok(());
        }
        self.store
            .update(
                POSTS,
                post_id,
                vec![
                    FieldOp::increment("likesCount", 1),
                    FieldOp::array_union("likedBy", json!(actor.to_string())),
                ],
            )
            .await?;
        Ok(())
    }

    /// Removes a like; unliking a post the actor never liked is a no-op.
    pub async fn unlike(&self, actor: Uuid, post_id: &str) -> Result<()> {
        let post = self.load(post_id).await?;
        if !post.liked_by.contains(&actor) {
            return Ok(());
        }
        self.store
            .update(
                POSTS,
                post_id,
                vec![
                    FieldOp::increment("likesCount", -1),
                    FieldOp::array_remove("likedBy", json!(actor.to_string())),
                ],
            )
            .await?;
        Ok(())
    }

    /// All posts owned by `user_id`, newest first, regardless of privacy.
    /// Callers apply visibility before showing these to anyone else.
    pub async fn user_posts(&self, user_id: Uuid) -> Result<Vec<(String, Post)>> {
        let docs = self
            .store
            .query(
                POSTS,
                Query::new()
                    .filter("userId", json!(user_id.to_string()))
                    .order_by_desc("createdAt"),
            )
            .await?;
        let mut posts = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<Post>(doc.data) {
                Ok(post) => posts.push((doc.id, post)),
                Err(e) => tracing::warn!("skipping malformed post {}: {}", doc.id, e),
            }
        }
        Ok(posts)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        self.load(post_id).await
    }

    async fn load(&self, post_id: &str) -> Result<Post> {
        let data = self
            .store
            .get(POSTS, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;
        Ok(serde_json::from_value(data)?)
    }
}
