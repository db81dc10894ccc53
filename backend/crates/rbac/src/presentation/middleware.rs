//! Auth Middleware
//!
//! Rejects requests without a valid bearer token and stores the decoded
//! [`Claims`] in request extensions for handlers (`Extension<Claims>`).

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::extract_bearer_token;
use std::sync::Arc;

use crate::application::AuthService;
use crate::application::config::AuthConfig;
use crate::domain::entity::claims::Claims;
use crate::domain::repository::UserRepository;
use crate::error::RbacResult;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// Middleware that requires a valid bearer token
pub async fn require_bearer_auth<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> RbacResult<Response>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let token = extract_bearer_token(req.headers());

    let service = AuthService::new(state.repo.clone(), state.config.clone());
    let claims: Claims = service.authenticate(token.as_deref())?;

    tracing::debug!(user_id = %claims.user_id, "Bearer token accepted");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
