//! User Password Value Object
//!
//! Delegates to `platform::password` for hashing. A [`RawPassword`] is
//! either policy-checked (being set) or unchecked (login attempt); a
//! [`UserPassword`] is the stored Argon2id PHC string.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicy, PasswordPolicyError,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized when dropped
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a password that is about to be stored
    pub fn new(raw: String, policy: &PasswordPolicy) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw, policy).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => AppError::bad_request(format!(
                "Password must be at least {} characters",
                min
            )),
            PasswordPolicyError::TooLong { max, .. } => AppError::bad_request(format!(
                "Password must be at most {} characters",
                max
            )),
            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password is required")
            }
            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a login attempt; the setting policy does not apply
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    /// Spend a full verification without a stored digest to check against
    pub fn verify_decoy(&self, pepper: Option<&[u8]>) {
        self.0.verify_decoy(pepper);
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a validated raw password
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        let hashed = raw.inner().hash(pepper).map_err(|e| match e {
            PasswordHashError::HashingFailed(msg) => {
                AppError::internal(format!("Password hashing failed: {}", msg))
            }
            PasswordHashError::InvalidHashFormat => {
                AppError::internal("Unexpected error during password hashing")
            }
        })?;

        Ok(Self(hashed))
    }

    /// Load a stored digest; a malformed digest simply never verifies
    pub fn from_db(phc_string: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(phc_string))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification; false on mismatch or malformed digest
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}
