#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use doc_store::{server_timestamp, DocumentStore, MemoryStore};
use glimpse_api::app_state::AppState;
use glimpse_api::config::{AppConfig, AuthConfig, Config, MediaConfig, StoreConfig};
use glimpse_api::error::Result;
use glimpse_api::models::collections::POSTS;
use glimpse_api::models::{collections::USERS, PrivacyMode};
use glimpse_api::security::jwt;
use glimpse_api::services::media::{MediaHost, MediaUrl};

pub fn test_store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryStore::new())
}

pub fn init_jwt() {
    jwt::initialize("test-secret").unwrap();
}

pub struct StubMedia;

#[async_trait]
impl MediaHost for StubMedia {
    async fn upload(&self, _bytes: Vec<u8>, filename: &str) -> Result<MediaUrl> {
        Ok(MediaUrl {
            url: format!("https://media.test/{filename}"),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origin: None,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
        },
        store: StoreConfig { url: None },
        media: MediaConfig {
            base_url: "https://media.test".to_string(),
            cloud_name: "test".to_string(),
            upload_preset: "TestImages".to_string(),
        },
    }
}

pub fn test_app_state(store: Arc<dyn DocumentStore>) -> AppState {
    init_jwt();
    AppState {
        store,
        media: Arc::new(StubMedia),
        config: Arc::new(test_config()),
    }
}

/// Writes a complete user document directly, bypassing sign-up.
pub async fn seed_user(store: &Arc<dyn DocumentStore>, username: &str, email: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    store
        .create(
            USERS,
            &user_id.to_string(),
            json!({
                "username": username,
                "displayName": username,
                "email": email,
                "bio": "",
                "website": "",
                "birthday": "",
                "linkedAccounts": { "google": false, "facebook": false, "github": false },
                "friendsCount": 0,
                "postsCount": 0,
                "privacySettings": {
                    "defaultPostPrivacy": "public",
                    "showEmail": true,
                    "showActivityStatus": true,
                },
                "createdAt": server_timestamp(),
                "lastLoginAt": server_timestamp(),
            }),
        )
        .await
        .unwrap();
    user_id
}

/// Writes a post document directly, bypassing the service layer.
pub async fn seed_post(
    store: &Arc<dyn DocumentStore>,
    author: Uuid,
    username: &str,
    privacy: PrivacyMode,
    caption: &str,
) -> String {
    store
        .insert(
            POSTS,
            json!({
                "userId": author.to_string(),
                "username": username,
                "imageUrl": format!("https://media.test/{caption}.jpg"),
                "caption": caption,
                "privacyMode": privacy,
                "likesCount": 0,
                "likedBy": [],
                "createdAt": server_timestamp(),
            }),
        )
        .await
        .unwrap()
}
