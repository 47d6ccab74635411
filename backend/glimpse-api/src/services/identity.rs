//! Account lifecycle against the `auth` collection: email/password sign-up
//! and sign-in, federated sign-in, password reset and password change.
//!
//! Credentials are stored separately from profile documents; the two are
//! linked by the user id, which doubles as the document id in both
//! collections.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use doc_store::{server_timestamp, DocumentStore, FieldOp, Query};

use crate::error::{AppError, Result};
use crate::models::collections::{AUTH, USERS};
use crate::models::AuthAccount;
use crate::security::jwt::{self, TokenResponse};
use crate::validators::{fold_username, validate_email, validate_password};

pub const FEDERATED_PROVIDERS: [&str; 3] = ["google", "facebook", "github"];

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub tokens: TokenResponse,
}

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn DocumentStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Registers an email/password account and its profile document. The
    /// generated display name is `User-` plus six hex characters, and the
    /// username is derived from it.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;
        validate_password(password)?;

        if self.account_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "an account already exists for {email}"
            )));
        }

        let user_id = Uuid::new_v4();
        let display_name = format!("User-{}", &Uuid::new_v4().simple().to_string()[..6]);
        let username = self.reserve_username(&display_name, user_id).await?;

        let password_hash = hash_password(password)?;
        self.store
            .create(
                AUTH,
                &user_id.to_string(),
                json!({
                    "email": email,
                    "passwordHash": password_hash,
                    "userId": user_id.to_string(),
                }),
            )
            .await?;
        self.store
            .create(
                USERS,
                &user_id.to_string(),
                new_user_doc(&username, &display_name, &email, None),
            )
            .await?;

        tracing::info!("account created for {} ({})", username, user_id);
        let tokens = jwt::token_pair(user_id, &email, &username)?;
        Ok(Session {
            user_id,
            username,
            tokens,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let (user_id, account) = self
            .account_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Authentication("invalid email or password".to_string()))?;
        let stored = account
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::Authentication("invalid email or password".to_string()))?;
        verify_password(password, stored)?;

        let username = self.touch_last_login(user_id).await?;
        let tokens = jwt::token_pair(user_id, &email, &username)?;
        Ok(Session {
            user_id,
            username,
            tokens,
        })
    }

    /// Sign-in through an external provider, trusted to have verified the
    /// email. Creates the account and profile on first sight, otherwise
    /// links the provider to the existing account.
    pub async fn federated_sign_in(
        &self,
        provider: &str,
        email: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Session> {
        if !FEDERATED_PROVIDERS.contains(&provider) {
            return Err(AppError::BadRequest(format!(
                "unsupported provider {provider}"
            )));
        }
        let email = email.trim().to_lowercase();
        validate_email(&email)?;

        let user_id = match self.account_by_email(&email).await? {
            Some((user_id, _)) => user_id,
            None => {
                let user_id = Uuid::new_v4();
                let display_name = display_name
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        format!("User-{}", &Uuid::new_v4().simple().to_string()[..6])
                    });
                let username = self.reserve_username(&display_name, user_id).await?;
                self.store
                    .create(
                        AUTH,
                        &user_id.to_string(),
                        json!({
                            "email": email,
                            "passwordHash": null,
                            "userId": user_id.to_string(),
                        }),
                    )
                    .await?;
                self.store
                    .create(
                        USERS,
                        &user_id.to_string(),
                        new_user_doc(&username, &display_name, &email, photo_url),
                    )
                    .await?;
                user_id
            }
        };

        let data = self
            .store
            .get(USERS, &user_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
        let user: crate::models::User = serde_json::from_value(data)?;
        let mut linked = user.linked_accounts.clone();
        match provider {
            "google" => linked.google = true,
            "facebook" => linked.facebook = true,
            _ => linked.github = true,
        }
        self.store
            .update(
                USERS,
                &user_id.to_string(),
                vec![
                    FieldOp::set("linkedAccounts", serde_json::to_value(&linked)?),
                    FieldOp::server_timestamp("lastLoginAt"),
                ],
            )
            .await?;

        let username = user.username;
        let tokens = jwt::token_pair(user_id, &email, &username)?;
        Ok(Session {
            user_id,
            username,
            tokens,
        })
    }

    /// Stores a single-use reset token on the account. Delivery is the
    /// mailer's concern; here it only lands in the log.
    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let (user_id, _) = self
            .account_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no account for {email}")))?;
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        self.store
            .update(
                AUTH,
                &user_id.to_string(),
                vec![FieldOp::set("resetToken", json!(token))],
            )
            .await?;
        tracing::info!("password reset issued for {}", email);
        Ok(())
    }

    pub async fn change_password(&self, user_id: Uuid, current: &str, new: &str) -> Result<()> {
        let data = self
            .store
            .get(AUTH, &user_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("account {user_id}")))?;
        let account: AuthAccount = serde_json::from_value(data)?;
        let stored = account
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("account has no password set".to_string()))?;
        verify_password(current, stored)?;
        validate_password(new)?;

        let password_hash = hash_password(new)?;
        self.store
            .update(
                AUTH,
                &user_id.to_string(),
                vec![FieldOp::set("passwordHash", json!(password_hash))],
            )
            .await?;
        tracing::info!("password changed for {}", user_id);
        Ok(())
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<(Uuid, AuthAccount)>> {
        let docs = self
            .store
            .query(AUTH, Query::new().filter("email", json!(email)).limit(1))
            .await?;
        match docs.into_iter().next() {
            Some(doc) => {
                let user_id = Uuid::parse_str(&doc.id)
                    .map_err(|_| AppError::Internal(format!("invalid auth doc id {}", doc.id)))?;
                let account: AuthAccount = serde_json::from_value(doc.data)?;
                Ok(Some((user_id, account)))
            }
            None => Ok(None),
        }
    }

    // Derives a username from the display name and suffixes it with part of
    // the user id when the plain form is taken.
    async fn reserve_username(&self, display_name: &str, user_id: Uuid) -> Result<String> {
        let base = fold_username(display_name);
        let base = if base.len() >= 3 {
            base
        } else {
            format!("user-{}", &user_id.simple().to_string()[..6])
        };
        if !self.username_taken(&base).await? {
            return Ok(base);
        }
        let suffixed = format!("{}-{}", base, &user_id.simple().to_string()[..6]);
        if self.username_taken(&suffixed).await? {
            return Err(AppError::Conflict(format!(
                "username {suffixed} is already taken"
            )));
        }
        Ok(suffixed)
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        let docs = self
            .store
            .query(
                USERS,
                Query::new().filter("username", json!(username)).limit(1),
            )
            .await?;
        Ok(!docs.is_empty())
    }

    async fn touch_last_login(&self, user_id: Uuid) -> Result<String> {
        self.store
            .update(
                USERS,
                &user_id.to_string(),
                vec![FieldOp::server_timestamp("lastLoginAt")],
            )
            .await?;
        self.username_of(user_id).await
    }

    async fn username_of(&self, user_id: Uuid) -> Result<String> {
        let data = self
            .store
            .get(USERS, &user_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
        let user: crate::models::User = serde_json::from_value(data)?;
        Ok(user.username)
    }
}

fn new_user_doc(
    username: &str,
    display_name: &str,
    email: &str,
    photo_url: Option<&str>,
) -> serde_json::Value {
    json!({
        "username": username,
        "displayName": display_name,
        "email": email,
        "profilePicUrl": photo_url,
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
    })
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored: &str) -> Result<()> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AppError::Internal(format!("stored password hash is invalid: {e}")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Authentication("invalid email or password".to_string()))
}
