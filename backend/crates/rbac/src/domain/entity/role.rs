//! Role Entity
//!
//! A named bundle of permissions. Two names are distinguished and grant
//! every user-management capability regardless of the attached set; see
//! [`RoleKind`].

use chrono::{DateTime, Utc};
use kernel::id::{PermissionId, RoleId};
use serde::Serialize;

use crate::domain::entity::permission::Permission;

pub const ROLE_SUPER_ADMIN: &str = "SuperAdmin";
pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_USER: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Classify by exact (case-sensitive) name
    pub fn kind(&self) -> RoleKind<'_> {
        match self.name.as_str() {
            ROLE_SUPER_ADMIN => RoleKind::SuperAdmin,
            ROLE_ADMIN => RoleKind::Admin,
            _ => RoleKind::Custom(&self.permissions),
        }
    }

    /// Whether the permission is explicitly attached to this role
    pub fn has_permission(&self, permission_name: &str) -> bool {
        self.permissions.iter().any(|p| p.name == permission_name)
    }

    pub fn permission_ids(&self) -> Vec<PermissionId> {
        self.permissions.iter().map(|p| p.id).collect()
    }
}

/// Role classification used by authorization checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind<'a> {
    SuperAdmin,
    Admin,
    Custom(&'a [Permission]),
}

impl RoleKind<'_> {
    #[inline]
    pub fn is_super_admin(&self) -> bool {
        matches!(self, RoleKind::SuperAdmin)
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, RoleKind::Admin)
    }

    #[inline]
    pub fn is_privileged(&self) -> bool {
        matches!(self, RoleKind::SuperAdmin | RoleKind::Admin)
    }

    /// Privileged roles pass; custom roles need the named permission
    pub fn grants(&self, permission_name: &str) -> bool {
        match self {
            RoleKind::SuperAdmin | RoleKind::Admin => true,
            RoleKind::Custom(permissions) => permissions.iter().any(|p| p.name == permission_name),
        }
    }
}

/// Input for role creation
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub permission_ids: Vec<PermissionId>,
}

/// Input for role update; `None` leaves the permission set untouched
#[derive(Debug, Clone)]
pub struct RoleChanges {
    pub name: String,
    pub permission_ids: Option<Vec<PermissionId>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(id: i64, name: &str) -> Permission {
        Permission {
            id: PermissionId::new(id),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn role(name: &str, permissions: Vec<Permission>) -> Role {
        Role {
            id: RoleId::new(1),
            name: name.to_string(),
            permissions,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_kind_uses_exact_names() {
        assert!(role("SuperAdmin", vec![]).kind().is_super_admin());
        assert!(role("Admin", vec![]).kind().is_admin());
        assert!(matches!(role("User", vec![]).kind(), RoleKind::Custom(_)));

        // Near misses are ordinary roles
        for name in ["superadmin", "SUPERADMIN", "Super Admin", "admin", " Admin"] {
            let r = role(name, vec![]);
            assert!(!r.kind().is_privileged(), "{name} must not be privileged");
        }
    }

    #[test]
    fn test_custom_role_grants_only_attached_permissions() {
        let r = role("Editor", vec![permission(1, "update-users")]);
        assert!(r.kind().grants("update-users"));
        assert!(!r.kind().grants("delete-users"));
        assert!(r.has_permission("update-users"));
    }

    #[test]
    fn test_privileged_role_grants_without_attachments() {
        let r = role("Admin", vec![]);
        assert!(r.kind().grants("delete-users"));
        assert!(!r.has_permission("delete-users"));
    }

    #[test]
    fn test_permission_ids() {
        let r = role("X", vec![permission(3, "a"), permission(5, "b")]);
        assert_eq!(
            r.permission_ids(),
            vec![PermissionId::new(3), PermissionId::new(5)]
        );
    }
}
