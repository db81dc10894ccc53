//! Permission Entity
//!
//! Immutable catalog entry attached to roles through `role_has_permissions`.

use chrono::{DateTime, Utc};
use kernel::id::PermissionId;
use serde::Serialize;

pub const PERMISSION_CREATE_USERS: &str = "create-users";
pub const PERMISSION_UPDATE_USERS: &str = "update-users";
pub const PERMISSION_DELETE_USERS: &str = "delete-users";
pub const PERMISSION_VIEW_ALL_USERS: &str = "view-all-users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
