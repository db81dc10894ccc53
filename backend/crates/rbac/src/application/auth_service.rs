//! Auth Service
//!
//! Login (credential check + token issuance) and token validation.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::entity::{claims::Claims, user::UserProfile};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{RbacError, RbacResult};

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub token: String,
    pub user: UserProfile,
}

pub struct AuthService<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    users: Arc<U>,
    config: Arc<AuthConfig>,
    codec: TokenCodec,
}

impl<U> AuthService<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, config: Arc<AuthConfig>) -> Self {
        let codec = config.token_codec();
        Self {
            users,
            config,
            codec,
        }
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown email, malformed email and wrong password all yield
    /// [`RbacError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: String) -> RbacResult<LoginOutput> {
        let attempt = RawPassword::for_login(password);

        // Every rejection costs one Argon2id verification
        let Ok(email) = Email::new(email) else {
            attempt.verify_decoy(self.config.pepper());
            tracing::warn!("Login rejected: malformed email");
            return Err(RbacError::InvalidCredentials);
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            attempt.verify_decoy(self.config.pepper());
            tracing::warn!("Login rejected: unknown email");
            return Err(RbacError::InvalidCredentials);
        };

        if !user.password.verify(&attempt, self.config.pepper()) {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(RbacError::InvalidCredentials);
        }

        if user.password.needs_rehash() {
            tracing::info!(user_id = %user.id, "Stored password digest uses an outdated scheme");
        }

        let token = self.codec.issue(user.id, user.email.as_str(), user.role_id);

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutput {
            token,
            user: user.profile(),
        })
    }

    pub fn validate_token(&self, token: &str) -> RbacResult<Claims> {
        Ok(self.codec.validate(token)?)
    }

    /// `None` means the request carried no bearer token
    pub fn authenticate(&self, token: Option<&str>) -> RbacResult<Claims> {
        match token {
            Some(token) => self.validate_token(token),
            None => Err(RbacError::TokenMissing),
        }
    }

    /// Validate the token and re-fetch its user
    pub async fn current_user(&self, token: &str) -> RbacResult<UserProfile> {
        let claims = self.validate_token(token)?;
        self.current_user_for(&claims).await
    }

    /// Re-fetch the user behind already validated claims
    ///
    /// NotFound when the account was deleted after the token was issued.
    pub async fn current_user_for(&self, claims: &Claims) -> RbacResult<UserProfile> {
        self.users
            .find_by_id(claims.user_id)
            .await?
            .map(|user| user.profile())
            .ok_or(RbacError::NotFound("User"))
    }
}
