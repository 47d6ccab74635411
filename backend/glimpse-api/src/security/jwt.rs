use anyhow::{anyhow, Result};
/// JWT token generation and validation using HS256
/// Access tokens: 1-hour expiry
/// Refresh tokens: 30-day expiry
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
}

/// Access token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

use std::sync::RwLock;

// Thread-safe storage for the signing secret loaded at startup
lazy_static! {
    static ref JWT_KEYS: RwLock<Option<(EncodingKey, DecodingKey)>> = RwLock::new(None);
}

/// Initialize the signing secret.
/// Must be called during application startup before any JWT operations.
pub fn initialize(secret: &str) -> Result<()> {
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut keys = JWT_KEYS
        .write()
        .map_err(|e| anyhow!("Failed to acquire write lock on JWT keys: {}", e))?;
    *keys = Some((encoding_key, decoding_key));

    Ok(())
}

fn get_encoding_key() -> Result<EncodingKey> {
    let keys = JWT_KEYS
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT keys: {}", e))?;

    keys.as_ref()
        .map(|(enc, _)| enc.clone())
        .ok_or_else(|| anyhow!("JWT keys not initialized. Call initialize() during startup"))
}

fn get_decoding_key() -> Result<DecodingKey> {
    let keys = JWT_KEYS
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT keys: {}", e))?;

    keys.as_ref()
        .map(|(_, dec)| dec.clone())
        .ok_or_else(|| anyhow!("JWT keys not initialized. Call initialize() during startup"))
}

fn generate_token(
    user_id: Uuid,
    email: &str,
    username: &str,
    token_type: &str,
    lifetime: Duration,
) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        token_type: token_type.to_string(),
        email: email.to_string(),
        username: username.to_string(),
    };

    let encoding_key = get_encoding_key()?;
    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| anyhow!("Failed to generate {} token: {}", token_type, e))
}

/// Generate a new access token
pub fn generate_access_token(user_id: Uuid, email: &str, username: &str) -> Result<String> {
    generate_token(
        user_id,
        email,
        username,
        "access",
        Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS),
    )
}

/// Generate a new refresh token
pub fn generate_refresh_token(user_id: Uuid, email: &str, username: &str) -> Result<String> {
    generate_token(
        user_id,
        email,
        username,
        "refresh",
        Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
    )
}

/// Generate the access/refresh token pair returned on sign-in
pub fn token_pair(user_id: Uuid, email: &str, username: &str) -> Result<TokenResponse> {
    Ok(TokenResponse {
        access_token: generate_access_token(user_id, email, username)?,
        refresh_token: generate_refresh_token(user_id, email, username)?,
        token_type: "Bearer".to_string(),
        expires_in: ACCESS_TOKEN_EXPIRY_HOURS * 3600,
    })
}

/// Validate a token and return its decoded claims
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let decoding_key = get_decoding_key()?;
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| anyhow!("Token validation failed: {}", e))
}
