//! RBAC Router
//!
//! Paths are relative; the binary nests the router under `/api`.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::RbacStore;
use crate::infra::postgres::PgRbacRepository;
use crate::presentation::handlers::{self, RbacAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_bearer_auth};

/// Create the RBAC router with PostgreSQL repository
pub fn rbac_router(repo: PgRbacRepository, config: AuthConfig) -> Router {
    rbac_router_generic(repo, config)
}

/// Create a generic RBAC router for any repository implementation
pub fn rbac_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: RbacStore,
{
    let state = RbacAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };
    let auth_state = AuthMiddlewareState {
        repo: state.repo.clone(),
        config: state.config.clone(),
    };

    let protected = Router::new()
        .route("/me", get(handlers::me::<R>))
        .route(
            "/users",
            get(handlers::list_users::<R>).post(handlers::create_user::<R>),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user::<R>)
                .put(handlers::update_user::<R>)
                .delete(handlers::delete_user::<R>),
        )
        .route(
            "/roles",
            get(handlers::list_roles::<R>).post(handlers::create_role::<R>),
        )
        .route(
            "/roles/{id}",
            get(handlers::get_role::<R>)
                .put(handlers::update_role::<R>)
                .delete(handlers::delete_role::<R>),
        )
        .route("/permissions", get(handlers::list_permissions::<R>))
        .route_layer(middleware::from_fn_with_state(
            auth_state,
            require_bearer_auth::<R>,
        ));

    Router::new()
        .route("/login", post(handlers::login::<R>))
        .merge(protected)
        .with_state(state)
}
