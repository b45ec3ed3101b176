/// User record owned by the user store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::hash_token;
use crate::error::ValidationError;

/// Authorization role carried in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Standard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Standard => "standard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "standard" => Ok(Role::Standard),
            _ => Err(ValidationError::InvalidFormat("role".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    /// SHA-256 digest of the one refresh token currently accepted for rotation
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            password_hash,
            role,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the stored refresh token, superseding any earlier one.
    pub fn set_refresh_token(&mut self, token: &str) {
        self.refresh_token_hash = Some(hash_token(token));
        self.touch();
    }

    /// A presented token matches only if one is stored and it is the same token.
    pub fn refresh_token_matches(&self, presented: &str) -> bool {
        match &self.refresh_token_hash {
            Some(stored) if !stored.is_empty() => *stored == hash_token(presented),
            _ => false,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "u1@example.com".to_string(),
            "User One".to_string(),
            "$2b$12$hash".to_string(),
            Role::Standard,
        )
    }

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("standard".parse::<Role>().unwrap(), Role::Standard);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Standard).unwrap(), "\"standard\"");
    }

    #[test]
    fn test_new_user_has_no_refresh_token() {
        let user = user();
        assert!(user.refresh_token_hash.is_none());
        assert!(!user.refresh_token_matches(""));
        assert!(!user.refresh_token_matches("anything"));
    }

    #[test]
    fn test_refresh_token_is_stored_as_digest() {
        let mut user = user();
        user.set_refresh_token("token-a");

        assert_ne!(user.refresh_token_hash.as_deref(), Some("token-a"));
        assert!(user.refresh_token_matches("token-a"));
        assert!(!user.refresh_token_matches("token-b"));
    }

    #[test]
    fn test_new_refresh_token_supersedes_old_one() {
        let mut user = user();
        user.set_refresh_token("token-a");
        user.set_refresh_token("token-b");

        assert!(!user.refresh_token_matches("token-a"));
        assert!(user.refresh_token_matches("token-b"));
    }

    #[test]
    fn test_empty_stored_digest_matches_nothing() {
        let mut user = user();
        user.refresh_token_hash = Some(String::new());
        assert!(!user.refresh_token_matches(""));
    }
}
