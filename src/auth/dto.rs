use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::User;
use crate::error::{ApiError, FieldError};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for user registration. All fields are optional at the
/// deserialization layer so that missing ones surface as field errors
/// instead of a body-level rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Validated registration data, ready for the store.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    /// Checks required fields before any store mutation. Username and
    /// password are mandatory; the profile fields default to empty.
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let mut errors = Vec::new();

        let username = self.username.map(|u| u.trim().to_string());
        match &username {
            Some(u) if !u.is_empty() => {}
            _ => errors.push(FieldError::required("username")),
        }
        match &self.password {
            Some(p) if !p.is_empty() => {}
            _ => errors.push(FieldError::required("password")),
        }

        // Email is optional, but if given it must look like one.
        let email = self.email.map(|e| e.trim().to_lowercase());
        if let Some(e) = email.as_deref() {
            if !e.is_empty() && !is_valid_email(e) {
                errors.push(FieldError::new("email", "Enter a valid email address."));
            }
        }

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        Ok(NewUser {
            username: username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            email: email.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        })
    }
}

/// Public part of the user returned to the client. Never carries the
/// password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

/// Request body for token issuance.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl TokenRequest {
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let mut errors = Vec::new();
        if self.username.as_deref().unwrap_or("").is_empty() {
            errors.push(FieldError::required("username"));
        }
        if self.password.as_deref().unwrap_or("").is_empty() {
            errors.push(FieldError::required("password"));
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        Ok((
            self.username.unwrap_or_default(),
            self.password.unwrap_or_default(),
        ))
    }
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Response returned by the token endpoint.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Response returned by the refresh endpoint.
#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}
