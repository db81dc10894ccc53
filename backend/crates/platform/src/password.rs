//! Password Hashing and Verification
//!
//! - Argon2id hashing in PHC string format (self-salted, adaptive)
//! - NFKC normalization of input
//! - Zeroization of clear text on drop
//! - Optional application-wide pepper
//!
//! The setting policy (length, control characters) is enforced only when a
//! password is chosen. Login attempts go through
//! [`ClearTextPassword::for_verification`] so that a policy change never locks
//! out existing accounts.

use std::fmt;
use std::hint::black_box;
use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Default minimum password length
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Control characters other than space, tab and newline
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Policy
// ============================================================================

/// Rules applied when a password is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_LENGTH,
            max_length: MAX_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Policy with a custom minimum; the maximum stays at [`MAX_PASSWORD_LENGTH`]
    pub fn with_min_length(min_length: usize) -> Self {
        Self {
            min_length: min_length.min(MAX_PASSWORD_LENGTH),
            max_length: MAX_PASSWORD_LENGTH,
        }
    }

    /// Check an already normalized password
    fn check(&self, normalized: &str) -> Result<(), PasswordPolicyError> {
        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Code points, not bytes
        let char_count = normalized.chars().count();

        if char_count < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
                actual: char_count,
            });
        }

        if char_count > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max: self.max_length,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(())
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`, and `Debug` output is redacted.
///
/// ```rust
/// use platform::password::{ClearTextPassword, PasswordPolicy};
///
/// let password = ClearTextPassword::new("secret1".to_string(), &PasswordPolicy::default()).unwrap();
/// let hashed = password.hash(None).unwrap();
/// assert!(hashed.verify(&password, None));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize and validate a password that is about to be stored
    pub fn new(raw: String, policy: &PasswordPolicy) -> Result<Self, PasswordPolicyError> {
        let password = Self::for_verification(raw);
        policy.check(&password.0)?;
        Ok(password)
    }

    /// Normalize without applying the policy (login attempts)
    pub fn for_verification(mut raw: String) -> Self {
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }

    /// Hash the password using Argon2id
    ///
    /// A fresh 128-bit salt is generated for every call, so hashing the same
    /// password twice yields different PHC strings.
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let mut password_bytes = self.peppered(pepper);
        let salt = SaltString::generate(OsRng);

        // OWASP recommended Argon2id parameters:
        // m=19456 (19 MiB), t=2, p=1
        let result = Argon2::default()
            .hash_password(&password_bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        password_bytes.zeroize();
        result
    }

    /// Run one full Argon2id verification against a fixed digest and discard the result
    ///
    /// Rejecting an attempt with no stored digest to check (unknown account,
    /// unparseable digest) then costs the same as a wrong password.
    pub fn verify_decoy(&self, pepper: Option<&[u8]>) {
        if let Some(decoy) = decoy_digest() {
            black_box(decoy.verify_parsed(self, pepper));
        }
    }
}

/// Digest of a fixed string, hashed once with the default parameters
fn decoy_digest() -> Option<&'static HashedPassword> {
    static DECOY: OnceLock<Option<HashedPassword>> = OnceLock::new();
    DECOY
        .get_or_init(|| {
            ClearTextPassword::for_verification("decoy-password".to_string())
                .hash(None)
                .ok()
        })
        .as_ref()
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string carries algorithm, version, parameters and salt, so
/// verification works across cost-parameter changes.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Wrap a stored digest without parsing it
    ///
    /// A digest that is not a valid PHC string never verifies.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// Returns false for a malformed digest instead of erroring.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        if PasswordHash::new(&self.hash).is_err() {
            password.verify_decoy(pepper);
            return false;
        }
        self.verify_parsed(password, pepper)
    }

    fn verify_parsed(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };

        let mut password_bytes = password.peppered(pepper);

        // Argon2 uses constant-time comparison internally
        let ok = Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok();

        password_bytes.zeroize();
        ok
    }

    /// True when the digest is not Argon2id (or not parseable at all)
    pub fn needs_rehash(&self) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => parsed.algorithm != argon2::Algorithm::Argon2id.ident(),
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::default()
    }

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("abc12".to_string(), &policy());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::TooShort { min: 6, actual: 5 })
        ));
    }

    #[test]
    fn test_password_min_length_is_configurable() {
        let strict = PasswordPolicy::with_min_length(10);
        assert!(ClearTextPassword::new("abcdef".to_string(), &strict).is_err());
        assert!(ClearTextPassword::new("abcdefghij".to_string(), &strict).is_ok());
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        let result = ClearTextPassword::new(long_password, &policy());
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string(), &policy());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("abc\u{0007}defg".to_string(), &policy());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_unicode_password_counts_code_points() {
        // 6 code points, 18 bytes
        let result = ClearTextPassword::new("パスワード!".to_string(), &policy());
        assert!(result.is_ok());
    }

    #[test]
    fn test_verification_skips_policy() {
        let password = ClearTextPassword::for_verification("x".to_string());
        assert_eq!(password.as_bytes(), b"x");
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::for_verification("TestPassword123!".to_string());
        let hashed = password.hash(None).unwrap();

        assert!(hashed.verify(&password, None));

        let wrong_password = ClearTextPassword::for_verification("WrongPassword123!".to_string());
        assert!(!hashed.verify(&wrong_password, None));
    }

    #[test]
    fn test_hash_is_salted() {
        let password = ClearTextPassword::for_verification("same-input".to_string());
        let first = password.hash(None).unwrap();
        let second = password.hash(None).unwrap();

        assert_ne!(first.as_phc_string(), second.as_phc_string());
        assert!(first.verify(&password, None));
        assert!(second.verify(&password, None));
    }

    #[test]
    fn test_hash_with_pepper() {
        let password = ClearTextPassword::for_verification("TestPassword123!".to_string());
        let pepper = b"my_secret_pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"wrong_pepper")));
    }

    #[test]
    fn test_nfkc_equivalent_inputs_verify() {
        // U+FF21 FULLWIDTH LATIN CAPITAL LETTER A normalizes to "A"
        let stored = ClearTextPassword::for_verification("\u{FF21}bcdef".to_string());
        let hashed = stored.hash(None).unwrap();
        let attempt = ClearTextPassword::for_verification("Abcdef".to_string());
        assert!(hashed.verify(&attempt, None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let password = ClearTextPassword::for_verification("TestPassword123!".to_string());
        let hashed = password.hash(None).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&password, None));
        assert!(!restored.needs_rehash());
    }

    #[test]
    fn test_malformed_digest_never_verifies() {
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());

        let stored = HashedPassword::from_stored("not_a_valid_hash");
        let password = ClearTextPassword::for_verification("anything".to_string());
        assert!(!stored.verify(&password, None));
        assert!(stored.needs_rehash());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::for_verification("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }

    #[test]
    fn test_decoy_digest_uses_default_parameters() {
        let decoy = decoy_digest().unwrap();
        assert!(decoy.as_phc_string().starts_with("$argon2id$"));
        assert!(decoy.as_phc_string().contains("m=19456,t=2,p=1"));
        assert!(!decoy.needs_rehash());

        // Never matches an ordinary attempt
        let attempt = ClearTextPassword::for_verification("secret1".to_string());
        assert!(!decoy.verify(&attempt, None));
        attempt.verify_decoy(None);
    }
}
