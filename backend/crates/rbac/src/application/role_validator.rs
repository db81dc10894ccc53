//! Role Input Validation

use std::collections::BTreeSet;

use kernel::id::{PermissionId, RoleId};

use crate::domain::repository::{PermissionRepository, RoleRepository};
use crate::error::{RbacError, RbacResult};

pub const ROLE_NAME_MIN_LENGTH: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct RoleInput {
    pub name: Option<String>,
    /// `None` on update keeps the current set; on create it means "no permissions"
    pub permission_ids: Option<Vec<PermissionId>>,
}

#[derive(Debug, Clone)]
pub struct ValidatedRole {
    pub name: String,
    /// Deduplicated, ascending
    pub permission_ids: Option<Vec<PermissionId>>,
}

pub struct RoleValidator<'a, R, P> {
    roles: &'a R,
    permissions: &'a P,
}

impl<'a, R, P> RoleValidator<'a, R, P>
where
    R: RoleRepository + Send + Sync,
    P: PermissionRepository + Send + Sync,
{
    pub fn new(roles: &'a R, permissions: &'a P) -> Self {
        Self { roles, permissions }
    }

    /// `excluding` is the role being updated, if any
    pub async fn validate(
        &self,
        input: RoleInput,
        excluding: Option<RoleId>,
    ) -> RbacResult<ValidatedRole> {
        let mut errors = Vec::new();

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            errors.push("Role name is required".to_string());
        } else if name.chars().count() < ROLE_NAME_MIN_LENGTH {
            errors.push(format!(
                "Role name must be at least {} characters",
                ROLE_NAME_MIN_LENGTH
            ));
        } else if self.roles.name_exists(&name, excluding).await? {
            errors.push("Role name is already taken".to_string());
        }

        let permission_ids = match input.permission_ids {
            None => None,
            Some(ids) => {
                let requested: BTreeSet<PermissionId> = ids.into_iter().collect();
                if !requested.is_empty() {
                    let known: BTreeSet<PermissionId> = self
                        .permissions
                        .find_all()
                        .await?
                        .into_iter()
                        .map(|p| p.id)
                        .collect();
                    for missing in requested.difference(&known) {
                        errors.push(format!("Permission {} does not exist", missing));
                    }
                }
                Some(requested.into_iter().collect())
            }
        };

        if errors.is_empty() {
            Ok(ValidatedRole {
                name,
                permission_ids,
            })
        } else {
            Err(RbacError::ValidationFailed(errors))
        }
    }
}
