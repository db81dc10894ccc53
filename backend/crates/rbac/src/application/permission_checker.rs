//! Permission Checker
//!
//! Decides whether a role may perform an action. Every check loads the role
//! once, fresh, and fails closed: a missing role grants nothing.
//!
//! | Capability | Granted to |
//! |---|---|
//! | `ManageRoles` | `SuperAdmin` only |
//! | `CreateUsers` | `SuperAdmin`, `Admin`, or `create-users` |
//! | `UpdateUsers` | `SuperAdmin`, `Admin`, or `update-users` |
//! | `DeleteUsers` | `SuperAdmin`, `Admin`, or `delete-users` |
//! | `ViewAllUsers` | `SuperAdmin`, `Admin`, or `view-all-users` |

use std::sync::Arc;

use derive_more::Display;
use kernel::id::{RoleId, UserId};

use crate::domain::entity::{
    claims::Claims,
    permission::{
        PERMISSION_CREATE_USERS, PERMISSION_DELETE_USERS, PERMISSION_UPDATE_USERS,
        PERMISSION_VIEW_ALL_USERS,
    },
    role::{Role, RoleKind},
};
use crate::domain::repository::RoleRepository;
use crate::error::{RbacError, RbacResult};

/// Actions gated by the checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Capability {
    #[display("manage-roles")]
    ManageRoles,
    #[display("create-users")]
    CreateUsers,
    #[display("update-users")]
    UpdateUsers,
    #[display("delete-users")]
    DeleteUsers,
    #[display("view-all-users")]
    ViewAllUsers,
}

impl Capability {
    /// Named permission that grants this capability to a custom role
    pub const fn permission_name(&self) -> Option<&'static str> {
        match self {
            Capability::ManageRoles => None,
            Capability::CreateUsers => Some(PERMISSION_CREATE_USERS),
            Capability::UpdateUsers => Some(PERMISSION_UPDATE_USERS),
            Capability::DeleteUsers => Some(PERMISSION_DELETE_USERS),
            Capability::ViewAllUsers => Some(PERMISSION_VIEW_ALL_USERS),
        }
    }

    fn granted_by(&self, kind: RoleKind<'_>) -> bool {
        match self.permission_name() {
            None => kind.is_super_admin(),
            Some(permission) => kind.grants(permission),
        }
    }
}

pub struct PermissionChecker<R>
where
    R: RoleRepository + Send + Sync + 'static,
{
    roles: Arc<R>,
}

impl<R> PermissionChecker<R>
where
    R: RoleRepository + Send + Sync + 'static,
{
    pub fn new(roles: Arc<R>) -> Self {
        Self { roles }
    }

    async fn load(&self, role_id: RoleId) -> RbacResult<Option<Role>> {
        self.roles.find_by_id(role_id).await
    }

    /// Whether the permission is explicitly attached to the role
    pub async fn has_permission(&self, role_id: RoleId, permission_name: &str) -> RbacResult<bool> {
        Ok(self
            .load(role_id)
            .await?
            .is_some_and(|role| role.has_permission(permission_name)))
    }

    pub async fn is_super_admin(&self, role_id: RoleId) -> RbacResult<bool> {
        Ok(self
            .load(role_id)
            .await?
            .is_some_and(|role| role.kind().is_super_admin()))
    }

    pub async fn is_admin(&self, role_id: RoleId) -> RbacResult<bool> {
        Ok(self
            .load(role_id)
            .await?
            .is_some_and(|role| role.kind().is_admin()))
    }

    /// Evaluate a capability with a single role lookup
    pub async fn can(&self, role_id: RoleId, capability: Capability) -> RbacResult<bool> {
        Ok(self
            .load(role_id)
            .await?
            .is_some_and(|role| capability.granted_by(role.kind())))
    }

    pub async fn can_manage_roles(&self, role_id: RoleId) -> RbacResult<bool> {
        self.can(role_id, Capability::ManageRoles).await
    }

    pub async fn can_create_users(&self, role_id: RoleId) -> RbacResult<bool> {
        self.can(role_id, Capability::CreateUsers).await
    }

    pub async fn can_update_users(&self, role_id: RoleId) -> RbacResult<bool> {
        self.can(role_id, Capability::UpdateUsers).await
    }

    pub async fn can_delete_users(&self, role_id: RoleId) -> RbacResult<bool> {
        self.can(role_id, Capability::DeleteUsers).await
    }

    pub async fn can_view_all_users(&self, role_id: RoleId) -> RbacResult<bool> {
        self.can(role_id, Capability::ViewAllUsers).await
    }

    /// True iff the caller is neither SuperAdmin nor Admin and targets itself
    ///
    /// A missing role is treated as unprivileged, so the self-service path
    /// stays open to it.
    pub async fn can_only_edit_own_profile(
        &self,
        role_id: RoleId,
        target_id: UserId,
        current_id: UserId,
    ) -> RbacResult<bool> {
        if target_id != current_id {
            return Ok(false);
        }
        let privileged = self
            .load(role_id)
            .await?
            .is_some_and(|role| role.kind().is_privileged());
        Ok(!privileged)
    }

    /// Handler-facing check against validated claims
    pub async fn authorize(&self, claims: &Claims, capability: Capability) -> RbacResult<bool> {
        self.can(claims.role_id, capability).await
    }

    /// Like [`authorize`](Self::authorize), but a denial is `Forbidden`
    pub async fn require(&self, claims: &Claims, capability: Capability) -> RbacResult<()> {
        if self.authorize(claims, capability).await? {
            Ok(())
        } else {
            tracing::info!(
                user_id = %claims.user_id,
                role_id = %claims.role_id,
                %capability,
                "Capability denied"
            );
            Err(RbacError::Forbidden)
        }
    }
}
