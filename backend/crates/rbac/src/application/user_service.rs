//! User Management Use Cases

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::user_validator::{UserInput, UserValidator, ValidatedUser};
use crate::domain::entity::{
    role::ROLE_SUPER_ADMIN,
    user::{NewUser, UserChanges, UserProfile},
};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{RbacError, RbacResult};

pub struct UserService<U, R>
where
    U: UserRepository + Send + Sync + 'static,
    R: RoleRepository + Send + Sync + 'static,
{
    users: Arc<U>,
    roles: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<U, R> UserService<U, R>
where
    U: UserRepository + Send + Sync + 'static,
    R: RoleRepository + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, roles: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            users,
            roles,
            config,
        }
    }

    fn validator(&self) -> UserValidator<'_, U, R> {
        UserValidator::new(
            self.users.as_ref(),
            self.roles.as_ref(),
            self.config.password_policy(),
        )
    }

    fn hash(&self, password: &RawPassword) -> RbacResult<UserPassword> {
        Ok(UserPassword::from_raw(password, self.config.pepper())?)
    }

    pub async fn list_users(&self) -> RbacResult<Vec<UserProfile>> {
        let users = self.users.find_all().await?;
        Ok(users.iter().map(|u| u.profile()).collect())
    }

    pub async fn get_user(&self, id: UserId) -> RbacResult<UserProfile> {
        self.users
            .find_by_id(id)
            .await?
            .map(|u| u.profile())
            .ok_or(RbacError::NotFound("User"))
    }

    pub async fn create_user(&self, input: UserInput) -> RbacResult<UserId> {
        let ValidatedUser {
            name,
            email,
            password,
            role_id,
        } = self.validator().validate_create(input).await?;

        let password = password
            .ok_or_else(|| RbacError::Internal("validated create without password".into()))?;

        let new_user = NewUser {
            name,
            email,
            password: self.hash(&password)?,
            role_id,
        };
        let id = self.users.create(&new_user).await?;

        tracing::info!(user_id = %id, role_id = %role_id, "User created");
        Ok(id)
    }

    /// Re-hashes only when a new password is supplied
    pub async fn update_user(&self, id: UserId, input: UserInput) -> RbacResult<UserProfile> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(RbacError::NotFound("User"));
        }

        let validated = self.validator().validate_update(id, input).await?;

        let password = match &validated.password {
            Some(raw) => Some(self.hash(raw)?),
            None => None,
        };
        let changes = UserChanges {
            name: validated.name,
            email: validated.email,
            password,
            role_id: validated.role_id,
        };

        if !self.users.update(id, &changes).await? {
            return Err(RbacError::NotFound("User"));
        }

        tracing::info!(user_id = %id, "User updated");
        self.get_user(id).await
    }

    /// Create the initial SuperAdmin account unless the email is already taken
    ///
    /// Returns whether an account was created.
    pub async fn ensure_super_admin(&self, email: &str, password: String) -> RbacResult<bool> {
        let Ok(normalized) = Email::new(email) else {
            return Err(RbacError::validation("Bootstrap admin email is invalid"));
        };
        if self.users.email_exists(&normalized, None).await? {
            return Ok(false);
        }

        let role = self
            .roles
            .find_by_name(ROLE_SUPER_ADMIN)
            .await?
            .ok_or(RbacError::NotFound("Role"))?;

        let input = UserInput {
            name: Some("Super Admin".to_string()),
            email: Some(normalized.into_db()),
            password: Some(password),
            role_id: Some(role.id),
        };
        self.create_user(input).await?;
        Ok(true)
    }

    /// `acting_user` may not delete its own account
    pub async fn delete_user(&self, id: UserId, acting_user: UserId) -> RbacResult<()> {
        if id == acting_user {
            return Err(RbacError::validation("You cannot delete your own account"));
        }

        if !self.users.delete(id).await? {
            return Err(RbacError::NotFound("User"));
        }

        tracing::info!(user_id = %id, deleted_by = %acting_user, "User deleted");
        Ok(())
    }
}
