/// Configuration management for the Glimpse API
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Document store configuration
    pub store: StoreConfig,
    /// Media host configuration
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Allowed CORS origin; any origin when unset
    pub cors_origin: Option<String>,
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted document store; in-memory store when unset
    pub url: Option<String>,
}

/// Media host configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Upload API base URL
    pub base_url: String,
    /// Tenant/cloud identifier in the upload URL
    pub cloud_name: String,
    /// Unsigned upload preset name
    pub upload_preset: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };

        let store = StoreConfig {
            url: std::env::var("STORE_URL").ok(),
        };

        let media = MediaConfig {
            base_url: std::env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
            cloud_name: std::env::var("MEDIA_CLOUD_NAME").unwrap_or_else(|_| "demo".to_string()),
            upload_preset: std::env::var("MEDIA_UPLOAD_PRESET")
                .unwrap_or_else(|_| "PostImages".to_string()),
        };

        Ok(Config {
            app,
            auth,
            store,
            media,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production" || self.app.env == "prod"
    }
}
