//! API DTOs (Data Transfer Objects)
//!
//! snake_case on the wire. Request fields are optional so that missing
//! values surface as validation messages rather than JSON rejections.

use kernel::id::{PermissionId, RoleId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::{RoleInput, UserInput};
use crate::domain::entity::{permission::Permission, role::Role, user::UserProfile};
use crate::error::{RbacError, RbacResult};

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Both fields must be present and non-blank
    pub fn into_credentials(self) -> RbacResult<(String, String)> {
        let email = self.email.filter(|e| !e.trim().is_empty());
        let password = self.password.filter(|p| !p.is_empty());

        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            (email, password) => {
                let mut errors = Vec::new();
                if email.is_none() {
                    errors.push("Email is required".to_string());
                }
                if password.is_none() {
                    errors.push("Password is required".to_string());
                }
                Err(RbacError::ValidationFailed(errors))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

// ============================================================================
// Users
// ============================================================================

/// Body of both create and update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<RoleId>,
}

impl From<UserRequest> for UserInput {
    fn from(req: UserRequest) -> Self {
        UserInput {
            name: req.name,
            email: req.email,
            password: req.password,
            role_id: req.role_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub user: UserProfile,
}

// ============================================================================
// Roles & Permissions
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleRequest {
    pub name: Option<String>,
    #[serde(alias = "permission_ids")]
    pub permissions: Option<Vec<PermissionId>>,
}

impl From<RoleRequest> for RoleInput {
    fn from(req: RoleRequest) -> Self {
        RoleInput {
            name: req.name,
            permission_ids: req.permissions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleCreatedResponse {
    pub message: String,
    pub role_id: RoleId,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleUpdatedResponse {
    pub message: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionsResponse {
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_requires_both_fields() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":"  "}"#).unwrap();
        match req.into_credentials() {
            Err(RbacError::ValidationFailed(errors)) => {
                assert_eq!(errors, vec!["Email is required", "Password is required"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_role_request_accepts_both_keys() {
        let a: RoleRequest = serde_json::from_str(r#"{"name":"Editor","permissions":[1,2]}"#).unwrap();
        let b: RoleRequest =
            serde_json::from_str(r#"{"name":"Editor","permission_ids":[1,2]}"#).unwrap();
        assert_eq!(a.permissions, b.permissions);
        assert_eq!(
            a.permissions,
            Some(vec![PermissionId::new(1), PermissionId::new(2)])
        );
    }

    #[test]
    fn test_user_request_defaults_missing_fields() {
        let req: UserRequest = serde_json::from_str(r#"{"name":"Bob"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Bob"));
        assert!(req.role_id.is_none());
    }
}
