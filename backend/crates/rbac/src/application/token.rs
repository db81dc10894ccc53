//! Bearer Token Codec
//!
//! Three base64url segments joined by `.`:
//!
//! ```text
//! b64url({"typ":"JWT","alg":"HS256"}) . b64url(claims) . b64url(HMAC-SHA256(secret, h.p))
//! ```
//!
//! Validation order: shape, signature (constant-time), header, payload, expiry.
//! Tokens are never revoked early; they only expire.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kernel::id::{RoleId, UserId};
use platform::crypto::{b64url_decode, b64url_encode, hmac_sha256, verify_hmac_sha256};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::domain::entity::claims::Claims;
use crate::error::RbacError;

const TOKEN_TYPE: &str = "JWT";
const ALGORITHM: &str = "HS256";

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
}

impl From<TokenError> for RbacError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => RbacError::TokenMalformed,
            TokenError::SignatureInvalid => RbacError::TokenSignatureInvalid,
            TokenError::Expired => RbacError::TokenExpired,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Header<'a> {
    typ: &'a str,
    alg: &'a str,
}

/// Issues and validates HS256 bearer tokens
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<[u8]>,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            secret: Arc::from(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token expiring `ttl` from now
    pub fn issue(&self, user_id: UserId, email: &str, role_id: RoleId) -> String {
        self.issue_at(user_id, email, role_id, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds)
    pub fn issue_at(&self, user_id: UserId, email: &str, role_id: RoleId, now: i64) -> String {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            user_id,
            email: email.to_string(),
            role_id,
            expires_at: now.saturating_add(ttl),
        };
        self.encode(&claims)
    }

    /// Sign arbitrary claims as-is
    pub fn encode(&self, claims: &Claims) -> String {
        let header = Header {
            typ: TOKEN_TYPE,
            alg: ALGORITHM,
        };
        // Both types serialize infallibly: plain strings and integers only
        let header_b64 = b64url_encode(serde_json::to_vec(&header).unwrap_or_default());
        let payload_b64 = b64url_encode(serde_json::to_vec(claims).unwrap_or_default());

        let signing_input = format!("{}.{}", header_b64, payload_b64);
        let signature = hmac_sha256(&self.secret, signing_input.as_bytes());

        format!("{}.{}", signing_input, b64url_encode(signature))
    }

    /// Validate against the current time
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate as if the current time were `now` (Unix seconds)
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = b64url_decode(signature_b64).map_err(|_| TokenError::SignatureInvalid)?;
        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
        if !verify_hmac_sha256(&self.secret, signing_input.as_bytes(), &signature) {
            return Err(TokenError::SignatureInvalid);
        }

        let header_bytes = decode_segment(header_b64)?;
        let header: Header<'_> =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::Malformed);
        }

        let claims: Claims = decode_json(payload_b64)?;

        if claims.expires_at < now {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    b64url_decode(segment).map_err(|_| TokenError::Malformed)
}

fn decode_json<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = decode_segment(segment)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::from_secs(3600))
    }

    fn sign_raw(secret: &[u8], header_json: &str, payload_json: &str) -> String {
        let input = format!(
            "{}.{}",
            b64url_encode(header_json),
            b64url_encode(payload_json)
        );
        let sig = hmac_sha256(secret, input.as_bytes());
        format!("{}.{}", input, b64url_encode(sig))
    }

    #[test]
    fn test_issue_then_validate() {
        let token = codec().issue_at(UserId::new(5), "u@example.com", RoleId::new(3), NOW);
        let claims = codec().validate_at(&token, NOW + 10).unwrap();

        assert_eq!(claims.user_id, UserId::new(5));
        assert_eq!(claims.email, "u@example.com");
        assert_eq!(claims.role_id, RoleId::new(3));
        assert_eq!(claims.expires_at, NOW + 3600);
    }

    #[test]
    fn test_wire_header() {
        let token = codec().issue_at(UserId::new(1), "a@b.io", RoleId::new(1), NOW);
        let header_b64 = token.split('.').next().unwrap();
        let header: serde_json::Value =
            serde_json::from_slice(&b64url_decode(header_b64).unwrap()).unwrap();
        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["alg"], "HS256");
        assert!(!token.contains('='));
    }

    #[test]
    fn test_valid_until_exactly_expiry() {
        let token = codec().issue_at(UserId::new(1), "a@b.io", RoleId::new(1), NOW);
        assert!(codec().validate_at(&token, NOW + 3600).is_ok());
        assert_eq!(
            codec().validate_at(&token, NOW + 3601),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_wrapping() {
        let codec = TokenCodec::new(b"test-secret", Duration::from_secs(u64::MAX));
        let token = codec.issue_at(UserId::new(1), "a@b.io", RoleId::new(1), NOW);
        let claims = codec.validate_at(&token, NOW).unwrap();
        assert_eq!(claims.expires_at, i64::MAX);
    }

    #[test]
    fn test_tampered_payload_is_signature_invalid() {
        let token = codec().issue_at(UserId::new(1), "a@b.io", RoleId::new(1), NOW);
        let dot = token.find('.').unwrap();
        let payload_len = token[dot + 1..].find('.').unwrap();

        for i in dot + 1..dot + 1 + payload_len {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert_eq!(
                codec().validate_at(&tampered, NOW),
                Err(TokenError::SignatureInvalid),
                "position {i}"
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_signature_invalid() {
        let token = codec().issue_at(UserId::new(1), "a@b.io", RoleId::new(1), NOW);
        let other = TokenCodec::new(b"other-secret", Duration::from_secs(3600));
        assert_eq!(
            other.validate_at(&token, NOW),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        assert_eq!(codec().validate_at("", NOW), Err(TokenError::Malformed));
        assert_eq!(codec().validate_at("a.b", NOW), Err(TokenError::Malformed));
        assert_eq!(
            codec().validate_at("a.b.c.d", NOW),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_garbage_signature_is_signature_invalid() {
        assert_eq!(
            codec().validate_at("a.b.!!!", NOW),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_signed_but_unparseable_payload_is_malformed() {
        let token = sign_raw(b"test-secret", r#"{"typ":"JWT","alg":"HS256"}"#, "not json");
        assert_eq!(codec().validate_at(&token, NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_exp_is_malformed() {
        let token = sign_raw(
            b"test-secret",
            r#"{"typ":"JWT","alg":"HS256"}"#,
            r#"{"user_id":1,"email":"a@b.io","role_id":1}"#,
        );
        assert_eq!(codec().validate_at(&token, NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn test_other_algorithm_is_malformed() {
        let token = sign_raw(
            b"test-secret",
            r#"{"typ":"JWT","alg":"none"}"#,
            r#"{"user_id":1,"email":"a@b.io","role_id":1,"exp":1800000000}"#,
        );
        assert_eq!(codec().validate_at(&token, NOW), Err(TokenError::Malformed));
    }

    #[test]
    fn test_maps_to_rbac_errors() {
        assert!(matches!(
            RbacError::from(TokenError::Expired),
            RbacError::TokenExpired
        ));
        assert!(matches!(
            RbacError::from(TokenError::SignatureInvalid),
            RbacError::TokenSignatureInvalid
        ));
        assert!(matches!(
            RbacError::from(TokenError::Malformed),
            RbacError::TokenMalformed
        ));
    }
}
