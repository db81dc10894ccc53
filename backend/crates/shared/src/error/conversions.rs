//! Error conversions
//!
//! Renders [`AppError`](super::app_error::AppError) as an HTTP response when the `axum` feature is on.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let mut body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
        });
        if !self.details().is_empty() {
            body["errors"] = serde_json::json!(self.details());
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_problem_body_includes_errors() {
        let response = AppError::bad_request("Validation failed")
            .with_details(vec!["Name is required".to_string()])
            .into_response();
        assert_eq!(response.status().as_u16(), 400);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["title"], "Bad Request");
        assert_eq!(body["detail"], "Validation failed");
        assert_eq!(body["errors"], serde_json::json!(["Name is required"]));
    }

    #[tokio::test]
    async fn test_problem_body_omits_empty_errors() {
        let response = AppError::not_found("Route not found").into_response();
        assert_eq!(response.status().as_u16(), 404);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body.get("errors").is_none());
    }
}
