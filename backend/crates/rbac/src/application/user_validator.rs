//! User Input Validation
//!
//! Collects every violated rule instead of stopping at the first one.

use kernel::id::{RoleId, UserId};
use platform::password::PasswordPolicy;
use unicode_normalization::UnicodeNormalization;

use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{RbacError, RbacResult};

pub const NAME_MIN_LENGTH: usize = 3;

/// Unvalidated user fields as submitted
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<RoleId>,
}

/// Fields that passed every rule
#[derive(Debug)]
pub struct ValidatedUser {
    pub name: String,
    pub email: Email,
    /// `None` only on update when no new password was given
    pub password: Option<RawPassword>,
    pub role_id: RoleId,
}

pub struct UserValidator<'a, U, R> {
    users: &'a U,
    roles: &'a R,
    policy: PasswordPolicy,
}

impl<'a, U, R> UserValidator<'a, U, R>
where
    U: UserRepository + Send + Sync,
    R: RoleRepository + Send + Sync,
{
    pub fn new(users: &'a U, roles: &'a R, policy: PasswordPolicy) -> Self {
        Self {
            users,
            roles,
            policy,
        }
    }

    pub async fn validate_create(&self, input: UserInput) -> RbacResult<ValidatedUser> {
        self.validate(input, None, true).await
    }

    /// `id` is excluded from the email uniqueness check
    pub async fn validate_update(&self, id: UserId, input: UserInput) -> RbacResult<ValidatedUser> {
        self.validate(input, Some(id), false).await
    }

    async fn validate(
        &self,
        input: UserInput,
        excluding: Option<UserId>,
        password_required: bool,
    ) -> RbacResult<ValidatedUser> {
        let mut errors = Vec::new();

        let name = input.name.as_deref().map(normalize_name).unwrap_or_default();
        if name.is_empty() {
            errors.push("Name is required".to_string());
        } else if name.chars().count() < NAME_MIN_LENGTH {
            errors.push(format!(
                "Name must be at least {} characters",
                NAME_MIN_LENGTH
            ));
        }

        let email = match input.email.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Email is required".to_string());
                None
            }
            Some(raw) => match Email::new(raw) {
                Ok(email) => {
                    if self.users.email_exists(&email, excluding).await? {
                        errors.push("Email is already taken".to_string());
                    }
                    Some(email)
                }
                Err(e) => {
                    errors.push(e.message().to_string());
                    None
                }
            },
        };

        let password = match input.password.filter(|p| !p.is_empty()) {
            None => {
                if password_required {
                    errors.push("Password is required".to_string());
                }
                None
            }
            Some(raw) => match RawPassword::new(raw, &self.policy) {
                Ok(password) => Some(password),
                Err(e) => {
                    errors.push(e.message().to_string());
                    None
                }
            },
        };

        match input.role_id {
            None => errors.push("Role is required".to_string()),
            Some(role_id) => {
                if self.roles.find_by_id(role_id).await?.is_none() {
                    errors.push("Selected role does not exist".to_string());
                }
            }
        }

        match (email, input.role_id) {
            (Some(email), Some(role_id)) if errors.is_empty() => Ok(ValidatedUser {
                name,
                email,
                password,
                role_id,
            }),
            _ => Err(RbacError::ValidationFailed(errors)),
        }
    }
}

/// NFKC, trimmed
pub fn normalize_name(raw: &str) -> String {
    raw.nfkc().collect::<String>().trim().to_string()
}
