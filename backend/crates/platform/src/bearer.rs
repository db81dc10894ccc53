//! Bearer Token Extraction
//!
//! Parses `Authorization: Bearer <token>` request headers.

use axum::http::{HeaderMap, header};

const SCHEME: &str = "bearer";

/// Extract the bearer token from the `Authorization` header
///
/// The scheme is matched case-insensitively and may be followed by any run of
/// whitespace. Returns `None` when the header is absent, not valid ASCII, uses
/// another scheme, or carries an empty token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();

    let (scheme, rest) = value.split_at_checked(SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return None;
    }

    // At least one whitespace character must separate scheme and token
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let token = rest.trim_start();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(
            extract_bearer_token(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(
            extract_bearer_token(&headers_with("bEaReR tok")),
            Some("tok".to_string())
        );
    }

    #[test]
    fn test_whitespace_run_after_scheme() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer \t  tok")),
            Some("tok".to_string())
        );
    }

    #[test]
    fn test_rejects_other_schemes_and_empty_tokens() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer   ")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearertok")), None);
    }
}
