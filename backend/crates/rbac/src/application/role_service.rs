//! Role Management Use Cases
//!
//! Permission sets are replaced wholesale; the repository applies each write
//! inside one transaction.

use std::sync::Arc;

use kernel::id::RoleId;

use crate::application::role_validator::{RoleInput, RoleValidator};
use crate::domain::entity::{
    permission::Permission,
    role::{NewRole, Role, RoleChanges},
};
use crate::domain::repository::{PermissionRepository, RoleRepository};
use crate::error::{RbacError, RbacResult};

pub struct RoleService<R, P>
where
    R: RoleRepository + Send + Sync + 'static,
    P: PermissionRepository + Send + Sync + 'static,
{
    roles: Arc<R>,
    permissions: Arc<P>,
}

impl<R, P> RoleService<R, P>
where
    R: RoleRepository + Send + Sync + 'static,
    P: PermissionRepository + Send + Sync + 'static,
{
    pub fn new(roles: Arc<R>, permissions: Arc<P>) -> Self {
        Self { roles, permissions }
    }

    fn validator(&self) -> RoleValidator<'_, R, P> {
        RoleValidator::new(self.roles.as_ref(), self.permissions.as_ref())
    }

    pub async fn list_roles(&self) -> RbacResult<Vec<Role>> {
        self.roles.find_all().await
    }

    pub async fn get_role(&self, id: RoleId) -> RbacResult<Role> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or(RbacError::NotFound("Role"))
    }

    pub async fn create_role(&self, input: RoleInput) -> RbacResult<RoleId> {
        let validated = self.validator().validate(input, None).await?;

        let new_role = NewRole {
            name: validated.name,
            permission_ids: validated.permission_ids.unwrap_or_default(),
        };
        let id = self.roles.create(&new_role).await?;

        tracing::info!(
            role_id = %id,
            permissions = new_role.permission_ids.len(),
            "Role created"
        );
        Ok(id)
    }

    pub async fn update_role(&self, id: RoleId, input: RoleInput) -> RbacResult<Role> {
        if self.roles.find_by_id(id).await?.is_none() {
            return Err(RbacError::NotFound("Role"));
        }

        let validated = self.validator().validate(input, Some(id)).await?;
        let changes = RoleChanges {
            name: validated.name,
            permission_ids: validated.permission_ids,
        };

        if !self.roles.update(id, &changes).await? {
            return Err(RbacError::NotFound("Role"));
        }

        tracing::info!(role_id = %id, "Role updated");
        self.get_role(id).await
    }

    /// Conflict while users still reference the role
    pub async fn delete_role(&self, id: RoleId) -> RbacResult<()> {
        if !self.roles.delete(id).await? {
            return Err(RbacError::NotFound("Role"));
        }

        tracing::info!(role_id = %id, "Role deleted");
        Ok(())
    }

    pub async fn list_permissions(&self) -> RbacResult<Vec<Permission>> {
        self.permissions.find_all().await
    }
}
