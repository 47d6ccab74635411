//! Profile reads and edits, plus the friend-suggestion list shown on the
//! search page.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use doc_store::{DocumentStore, FieldOp, Query};

use crate::error::{AppError, Result};
use crate::models::collections::USERS;
use crate::models::User;
use crate::services::friends::FriendService;
use crate::validators::{fold_username, messages, validate_bio, validate_username};

/// Public projection of a user document. The email is withheld when the
/// owner's privacy settings say so.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub bio: String,
    pub website: String,
    pub friends_count: i64,
    pub posts_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub friends_count: i64,
    pub friend_request_sent: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub username: String,
    pub bio: String,
    pub website: String,
    pub birthday: String,
}

const SUGGESTION_LIMIT: usize = 20;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    friends: FriendService,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, friends: FriendService) -> Self {
        Self { store, friends }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let data = self
            .store
            .get(USERS, &user_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
        Ok(serde_json::from_value(data)?)
    }

    /// Looks a profile up by its (lowercase, unique) username.
    pub async fn profile_by_username(&self, username: &str) -> Result<ProfileView> {
        let username = username.trim().to_lowercase();
        let docs = self
            .store
            .query(
                USERS,
                Query::new().filter("username", json!(username)).limit(1),
            )
            .await?;
        let doc = docs
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("user {username}")))?;
        let id = Uuid::parse_str(&doc.id)
            .map_err(|_| AppError::Internal(format!("invalid user doc id {}", doc.id)))?;
        let user: User = serde_json::from_value(doc.data)?;
        let mut view = profile_view(id, user);
        // the edge subcollection is the source of truth, the counter on the
        // user doc is best-effort
        view.friends_count = self.friends.friend_count(id).await? as i64;
        Ok(view)
    }

    /// Applies an edit to the caller's own profile. A username change is
    /// checked against the rest of the collection first; the check and the
    /// write are not atomic, which matches how the uniqueness rule is
    /// enforced everywhere else.
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
        let display_name = update.display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation(
                messages::EMPTY_DISPLAY_NAME.to_string(),
            ));
        }
        let username = fold_username(&update.username);
        validate_username(&username)?;
        let bio = update.bio.trim();
        validate_bio(bio)?;

        let current = self.get_user(user_id).await?;
        if username != current.username {
            let taken = self
                .store
                .query(
                    USERS,
                    Query::new().filter("username", json!(username)).limit(1),
                )
                .await?;
            if taken.iter().any(|d| d.id != user_id.to_string()) {
                return Err(AppError::Conflict(format!(
                    "username {username} is already taken"
                )));
            }
        }

        self.store
            .update(
                USERS,
                &user_id.to_string(),
                vec![
                    FieldOp::set("displayName", json!(display_name)),
                    FieldOp::set("username", json!(username)),
                    FieldOp::set("bio", json!(bio)),
                    FieldOp::set("website", json!(update.website.trim())),
                    FieldOp::set("birthday", json!(update.birthday.trim())),
                ],
            )
            .await?;
        self.get_user(user_id).await
    }

    pub async fn set_photo(&self, user_id: Uuid, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(AppError::BadRequest("url is required".to_string()));
        }
        self.store
            .update(
                USERS,
                &user_id.to_string(),
                vec![FieldOp::set("profilePicUrl", json!(url.trim()))],
            )
            .await?;
        Ok(())
    }

    /// Candidate friends for the viewer, most-connected first. The viewer
    /// themselves and existing friends are excluded; each remaining
    /// candidate is annotated with whether the viewer already has a pending
    /// request to them.
    pub async fn suggestions(&self, viewer: Uuid) -> Result<Vec<Suggestion>> {
        let friend_ids = self.friends.friend_ids_of(viewer).await?;
        let docs = self
            .store
            .query(
                USERS,
                Query::new()
                    .order_by_desc("friendsCount")
                    .limit(SUGGESTION_LIMIT),
            )
            .await?;

        let mut suggestions = Vec::new();
        for doc in docs {
            let candidate_id = match Uuid::parse_str(&doc.id) {
                Ok(id) => id,
                Err(_) => continue,
            };
            if candidate_id == viewer || friend_ids.contains(&candidate_id) {
                continue;
            }
            let user: User = match serde_json::from_value(doc.data) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!("skipping malformed user {}: {}", doc.id, e);
                    continue;
                }
            };
            let friend_request_sent = self.friends.request_sent(viewer, candidate_id).await?;
            suggestions.push(Suggestion {
                id: candidate_id,
                photo_url: user.photo_url(),
                username: user.username,
                display_name: user.display_name,
                friends_count: user.friends_count,
                friend_request_sent,
            });
        }
        Ok(suggestions)
    }
}

fn profile_view(id: Uuid, user: User) -> ProfileView {
    let photo_url = user.photo_url();
    ProfileView {
        id,
        email: user.privacy_settings.show_email.then_some(user.email),
        username: user.username,
        display_name: user.display_name,
        photo_url,
        bio: user.bio,
        website: user.website,
        friends_count: user.friends_count,
        posts_count: user.posts_count,
    }
}
