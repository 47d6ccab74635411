//! Comments live in a subcollection under their post and are listed
//! oldest-first.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use doc_store::{server_timestamp, DocumentStore, Query};

use crate::error::{AppError, Result};
use crate::models::collections::{comments_of, POSTS, USERS};
use crate::models::{Comment, User};
use crate::utils::relative_time;
use crate::validators::CAPTION_MAX_LENGTH;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub user_id: Uuid,
    pub username: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub time_ago: String,
}

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DocumentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn add_comment(&self, author: Uuid, post_id: &str, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("comment text is required".to_string()));
        }
        if text.chars().count() > CAPTION_MAX_LENGTH {
            return Err(AppError::BadRequest(format!(
                "comment text must be at most {CAPTION_MAX_LENGTH} characters"
            )));
        }
        self.store
            .get(POSTS, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

        let author_data = self
            .store
            .get(USERS, &author.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {author}")))?;
        let author_doc: User = serde_json::from_value(author_data)?;

        let comment = json!({
            "userId": author.to_string(),
            "username": author_doc.username,
            "text": text,
            "createdAt": server_timestamp(),
        });
        let id = self.store.insert(&comments_of(post_id), comment).await?;
        Ok(id)
    }

    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<CommentView>> {
        self.store
            .get(POSTS, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

        let docs = self
            .store
            .query(&comments_of(post_id), Query::new().order_by_asc("createdAt"))
            .await?;
        let mut views = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<Comment>(doc.data) {
                Ok(comment) => views.push(CommentView {
                    id: doc.id,
                    user_id: comment.user_id,
                    username: comment.username,
                    text: comment.text,
                    created_at: comment.created_at,
                    time_ago: relative_time(comment.created_at),
                }),
                Err(e) => tracing::warn!("skipping malformed comment {}: {}", doc.id, e),
            }
        }
        Ok(views)
    }
}
