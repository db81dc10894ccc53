//! HTTP Handlers
//!
//! Every protected handler authorizes before it touches the target record,
//! so a caller without the capability cannot probe for existence.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use kernel::id::{RoleId, UserId};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthService, Capability, PermissionChecker, RoleService, UserInput, UserService,
};
use crate::domain::entity::claims::Claims;
use crate::domain::repository::RbacStore;
use crate::error::{RbacError, RbacResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, MessageResponse, PermissionsResponse, RoleCreatedResponse,
    RoleRequest, RoleResponse, RoleUpdatedResponse, RolesResponse, UserCreatedResponse,
    UserRequest, UserResponse, UserUpdatedResponse, UsersResponse,
};

/// Shared state for RBAC handlers
#[derive(Clone)]
pub struct RbacAppState<R>
where
    R: RbacStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> RbacAppState<R>
where
    R: RbacStore,
{
    fn auth(&self) -> AuthService<R> {
        AuthService::new(self.repo.clone(), self.config.clone())
    }

    fn checker(&self) -> PermissionChecker<R> {
        PermissionChecker::new(self.repo.clone())
    }

    fn users(&self) -> UserService<R, R> {
        UserService::new(self.repo.clone(), self.repo.clone(), self.config.clone())
    }

    fn roles(&self) -> RoleService<R, R> {
        RoleService::new(self.repo.clone(), self.repo.clone())
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// POST /api/login
pub async fn login<R>(
    State(state): State<RbacAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> RbacResult<Json<LoginResponse>>
where
    R: RbacStore,
{
    let (email, password) = req.into_credentials()?;
    let output = state.auth().login(&email, password).await?;

    Ok(Json(LoginResponse {
        token: output.token,
        user: output.user,
    }))
}

/// GET /api/me
pub async fn me<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
) -> RbacResult<Json<UserResponse>>
where
    R: RbacStore,
{
    let user = state.auth().current_user_for(&claims).await?;
    Ok(Json(UserResponse { user }))
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/users
pub async fn list_users<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
) -> RbacResult<Json<UsersResponse>>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::ViewAllUsers)
        .await?;

    let users = state.users().list_users().await?;
    Ok(Json(UsersResponse { users }))
}

/// GET /api/users/{id}
pub async fn get_user<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
) -> RbacResult<Json<UserResponse>>
where
    R: RbacStore,
{
    // Everyone may read their own record
    if id != claims.user_id {
        state
            .checker()
            .require(&claims, Capability::ViewAllUsers)
            .await?;
    }

    let user = state.users().get_user(id).await?;
    Ok(Json(UserResponse { user }))
}

/// POST /api/users
pub async fn create_user<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UserRequest>,
) -> RbacResult<(StatusCode, Json<UserCreatedResponse>)>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::CreateUsers)
        .await?;

    let user_id = state.users().create_user(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            message: "User created successfully".to_string(),
            user_id,
        }),
    ))
}

/// PUT /api/users/{id}
///
/// Holders of `update-users` may edit anyone. Other callers may edit only
/// themselves and may not change their own role.
pub async fn update_user<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
    Json(req): Json<UserRequest>,
) -> RbacResult<Json<UserUpdatedResponse>>
where
    R: RbacStore,
{
    let checker = state.checker();
    let users = state.users();

    let mut input: UserInput = req.into();

    if !checker.can_update_users(claims.role_id).await? {
        if !checker
            .can_only_edit_own_profile(claims.role_id, id, claims.user_id)
            .await?
        {
            return Err(RbacError::Forbidden);
        }

        let current = users.get_user(id).await?;
        match input.role_id {
            Some(role_id) if role_id != current.role_id => {
                tracing::info!(user_id = %claims.user_id, "Self-service role change denied");
                return Err(RbacError::Forbidden);
            }
            _ => input.role_id = Some(current.role_id),
        }
    }

    let user = users.update_user(id, input).await?;

    Ok(Json(UserUpdatedResponse {
        message: "User updated successfully".to_string(),
        user,
    }))
}

/// DELETE /api/users/{id}
pub async fn delete_user<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<UserId>,
) -> RbacResult<Json<MessageResponse>>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::DeleteUsers)
        .await?;

    state.users().delete_user(id, claims.user_id).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

// ============================================================================
// Roles
// ============================================================================

/// GET /api/roles
pub async fn list_roles<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
) -> RbacResult<Json<RolesResponse>>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::ManageRoles)
        .await?;

    let roles = state.roles().list_roles().await?;
    Ok(Json(RolesResponse { roles }))
}

/// GET /api/roles/{id}
pub async fn get_role<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<RoleId>,
) -> RbacResult<Json<RoleResponse>>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::ManageRoles)
        .await?;

    let role = state.roles().get_role(id).await?;
    Ok(Json(RoleResponse { role }))
}

/// POST /api/roles
pub async fn create_role<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RoleRequest>,
) -> RbacResult<(StatusCode, Json<RoleCreatedResponse>)>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::ManageRoles)
        .await?;

    let role_id = state.roles().create_role(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(RoleCreatedResponse {
            message: "Role created successfully".to_string(),
            role_id,
        }),
    ))
}

/// PUT /api/roles/{id}
pub async fn update_role<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<RoleId>,
    Json(req): Json<RoleRequest>,
) -> RbacResult<Json<RoleUpdatedResponse>>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::ManageRoles)
        .await?;

    let role = state.roles().update_role(id, req.into()).await?;

    Ok(Json(RoleUpdatedResponse {
        message: "Role updated successfully".to_string(),
        role,
    }))
}

/// DELETE /api/roles/{id}
pub async fn delete_role<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<RoleId>,
) -> RbacResult<Json<MessageResponse>>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::ManageRoles)
        .await?;

    state.roles().delete_role(id).await?;

    Ok(Json(MessageResponse::new("Role deleted successfully")))
}

/// GET /api/permissions
pub async fn list_permissions<R>(
    State(state): State<RbacAppState<R>>,
    Extension(claims): Extension<Claims>,
) -> RbacResult<Json<PermissionsResponse>>
where
    R: RbacStore,
{
    state
        .checker()
        .require(&claims, Capability::ManageRoles)
        .await?;

    let permissions = state.roles().list_permissions().await?;
    Ok(Json(PermissionsResponse { permissions }))
}
