//! User Entity
//!
//! The stored account. Only [`UserProfile`] crosses the HTTP boundary; it
//! has no password field at all.

use chrono::{DateTime, Utc};
use kernel::id::{RoleId, UserId};
use serde::Serialize;

use crate::domain::value_object::{email::Email, user_password::UserPassword};

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password: UserPassword,
    pub role_id: RoleId,
    /// Joined from `roles` when loaded
    pub role_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Outward-facing projection
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.as_str().to_string(),
            role_id: self.role_id,
            role_name: self.role_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public user projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role_id: RoleId,
    pub role_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for user creation
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password: UserPassword,
    pub role_id: RoleId,
}

/// Validated input for user update; a `None` password keeps the old hash
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: String,
    pub email: Email,
    pub password: Option<UserPassword>,
    pub role_id: RoleId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_has_no_password() {
        let user = User {
            id: UserId::new(7),
            name: "Alice".to_string(),
            email: Email::from_db("alice@example.com"),
            password: UserPassword::from_db("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            role_id: RoleId::new(3),
            role_name: Some("User".to_string()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role_id"], 3);
        assert_eq!(json["email"], "alice@example.com");
        assert!(json.get("password").is_none());
        assert!(!json.to_string().contains("argon2"));
    }
}
