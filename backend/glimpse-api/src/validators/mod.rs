/// Centralized input validation: all checks run locally, before any store
/// write, and map to `AppError::Validation`.
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidateEmail;

use crate::error::{AppError, Result};

pub const CAPTION_MAX_LENGTH: usize = 2200;
pub const BIO_MAX_LENGTH: usize = 150;

/// Centralized validation error messages
pub mod messages {
    pub const INVALID_EMAIL: &str = "Email must be a valid address";
    pub const INVALID_USERNAME: &str =
        "Username must be 3-32 characters, lowercase alphanumeric with - or _";
    pub const WEAK_PASSWORD: &str =
        "Password must be 8+ chars with uppercase, lowercase and a number";
    pub const CAPTION_TOO_LONG: &str = "Caption exceeds 2200 characters";
    pub const BIO_TOO_LONG: &str = "Bio exceeds 150 characters";
    pub const EMPTY_DISPLAY_NAME: &str = "Display name cannot be empty";
}

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-z0-9_-]{3,32}$").expect("valid regex");
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(AppError::Validation(messages::INVALID_EMAIL.to_string()))
    }
}

/// Lowercases a requested username and drops every character outside the
/// allowed alphabet. Validation still applies to the folded result.
pub fn fold_username(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Usernames are case-folded to lowercase before this check.
pub fn validate_username(username: &str) -> Result<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AppError::Validation(messages::INVALID_USERNAME.to_string()))
    }
}

pub fn validate_password(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(AppError::Validation(messages::WEAK_PASSWORD.to_string()))
    }
}

pub fn validate_caption(caption: &str) -> Result<()> {
    if caption.chars().count() <= CAPTION_MAX_LENGTH {
        Ok(())
    } else {
        Err(AppError::Validation(messages::CAPTION_TOO_LONG.to_string()))
    }
}

pub fn validate_bio(bio: &str) -> Result<()> {
    if bio.chars().count() <= BIO_MAX_LENGTH {
        Ok(())
    } else {
        Err(AppError::Validation(messages::BIO_TOO_LONG.to_string()))
    }
}
