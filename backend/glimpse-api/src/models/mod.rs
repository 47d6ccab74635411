//! Persisted document shapes.
//!
//! Field names on the wire are camelCase, matching the documents the store
//! holds. Writes are composed with `serde_json::json!` at the service layer;
//! these types cover the read side and tolerate partially-populated
//! documents via defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder applied wherever a profile photo URL is absent.
pub const DEFAULT_AVATAR_URL: &str = "/static/default-avatar.png";

/// Top-level collections and subcollection paths.
pub mod collections {
    use uuid::Uuid;

    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
    pub const AUTH: &str = "auth";

    pub fn friends_of(user_id: Uuid) -> String {
        format!("users/{user_id}/friends")
    }

    pub fn friend_requests_of(user_id: Uuid) -> String {
        format!("users/{user_id}/friendRequests")
    }

    pub fn comments_of(post_id: &str) -> String {
        format!("posts/{post_id}/comments")
    }
}

/// Per-post audience. Closed enumeration; values the store holds that are
/// not recognized deserialize to `Unknown`, which the visibility rules treat
/// as not visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrivacyMode {
    Public,
    Private,
    #[serde(rename = "Friends Only")]
    FriendsOnly,
    #[serde(other)]
    #[default]
    Unknown,
}

/// User document (`users/{uid}`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub profile_pic_url: Option<String>,
    pub bio: String,
    pub website: String,
    pub birthday: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub linked_accounts: LinkedAccounts,
    pub friends_count: i64,
    pub posts_count: i64,
    pub privacy_settings: PrivacySettings,
}

impl User {
    /// Photo URL with the placeholder fallback applied.
    pub fn photo_url(&self) -> String {
        self.profile_pic_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedAccounts {
    pub google: bool,
    pub facebook: bool,
    pub github: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    pub default_post_privacy: String,
    pub show_email: bool,
    pub show_activity_status: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            default_post_privacy: "public".to_string(),
            show_email: true,
            show_activity_status: true,
        }
    }
}

/// Post document (`posts/{id}`)
///
/// Invariant: `likes_count == liked_by.len()`, maintained by the like
/// workflow through single-document atomic ops.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub user_id: Uuid,
    pub username: String,
    pub image_url: String,
    pub caption: String,
    pub privacy_mode: PrivacyMode,
    pub likes_count: i64,
    pub liked_by: Vec<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Friend request document (`users/{recipient}/friendRequests/{senderId}`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FriendRequest {
    pub sender_id: Uuid,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub status: String,
}

/// One-directional friend edge (`users/{owner}/friends/{friendId}`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FriendEdge {
    pub friend_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Comment document (`posts/{id}/comments/{cid}`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Comment {
    pub user_id: Uuid,
    pub username: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Credential record backing the identity provider (`auth/{uid}`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthAccount {
    pub email: String,
    pub password_hash: Option<String>,
    pub user_id: Uuid,
    pub reset_token: Option<String>,
}
