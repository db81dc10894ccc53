//! Application Configuration
//!
//! Token signing and password settings. Built once at startup and shared
//! behind `Arc`; never mutated afterwards.

use std::fmt;
use std::time::Duration;

use platform::password::{DEFAULT_MIN_PASSWORD_LENGTH, PasswordPolicy};

use crate::application::token::TokenCodec;

/// Default token lifetime (1 hour)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing secret
    pub token_secret: Vec<u8>,
    pub token_ttl: Duration,
    /// Minimum length enforced when a password is set
    pub password_min_length: usize,
    /// Optional application-wide secret mixed into password hashes
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; 32],
            token_ttl: DEFAULT_TOKEN_TTL,
            password_min_length: DEFAULT_MIN_PASSWORD_LENGTH,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Random secret and a 12 hour token lifetime for local work
    pub fn development() -> Self {
        Self {
            token_ttl: Duration::from_secs(12 * 3600),
            ..Self::with_random_secret()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::with_min_length(self.password_min_length)
    }

    /// Codec bound to this config's secret and lifetime
    pub fn token_codec(&self) -> TokenCodec {
        TokenCodec::new(&self.token_secret, self.token_ttl)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("password_min_length", &self.password_min_length)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.password_min_length, 6);
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_with_random_secret() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        assert_eq!(a.token_secret.len(), 32);
        assert_ne!(a.token_secret, b.token_secret);
    }

    #[test]
    fn test_development_config() {
        let config = AuthConfig::development();
        assert!(config.token_ttl > DEFAULT_TOKEN_TTL);
        assert_ne!(config.token_secret, vec![0u8; 32]);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig {
            token_secret: b"super-secret-value".to_vec(),
            password_pepper: Some(b"pepper-value".to_vec()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("pepper-value"));
    }
}
