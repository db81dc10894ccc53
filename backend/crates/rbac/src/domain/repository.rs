//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{RoleId, UserId};

use crate::domain::entity::{
    permission::Permission,
    role::{NewRole, Role, RoleChanges},
    user::{NewUser, User, UserChanges},
};
use crate::domain::value_object::email::Email;
use crate::error::RbacResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// All users with their role names, ordered by id
    async fn find_all(&self) -> RbacResult<Vec<User>>;

    async fn find_by_id(&self, id: UserId) -> RbacResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> RbacResult<Option<User>>;

    /// Insert and return the assigned id
    async fn create(&self, user: &NewUser) -> RbacResult<UserId>;

    /// Returns false when no such user exists
    async fn update(&self, id: UserId, changes: &UserChanges) -> RbacResult<bool>;

    /// Returns false when no such user exists
    async fn delete(&self, id: UserId) -> RbacResult<bool>;

    /// Whether another user (other than `excluding`) already has this email
    async fn email_exists(&self, email: &Email, excluding: Option<UserId>) -> RbacResult<bool>;
}

/// Role repository trait
///
/// Roles are always loaded together with their permission set.
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    async fn find_all(&self) -> RbacResult<Vec<Role>>;

    async fn find_by_id(&self, id: RoleId) -> RbacResult<Option<Role>>;

    async fn find_by_name(&self, name: &str) -> RbacResult<Option<Role>>;

    /// Insert the role and attach its permissions atomically
    async fn create(&self, role: &NewRole) -> RbacResult<RoleId>;

    /// Rename and (optionally) replace the permission set atomically
    async fn update(&self, id: RoleId, changes: &RoleChanges) -> RbacResult<bool>;

    /// Detach permissions and delete the role atomically
    async fn delete(&self, id: RoleId) -> RbacResult<bool>;

    async fn name_exists(&self, name: &str, excluding: Option<RoleId>) -> RbacResult<bool>;
}

/// Permission catalog (read-only)
#[trait_variant::make(PermissionRepository: Send)]
pub trait LocalPermissionRepository {
    async fn find_all(&self) -> RbacResult<Vec<Permission>>;
}

/// Everything the HTTP layer needs from one store handle
pub trait RbacStore:
    UserRepository + RoleRepository + PermissionRepository + Clone + Send + Sync + 'static
{
}

impl<T> RbacStore for T where
    T: UserRepository + RoleRepository + PermissionRepository + Clone + Send + Sync + 'static
{
}
