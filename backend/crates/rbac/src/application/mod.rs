//! Application Layer
//!
//! Use cases and application services.

pub mod auth_service;
pub mod config;
pub mod permission_checker;
pub mod role_service;
pub mod role_validator;
pub mod token;
pub mod user_service;
pub mod user_validator;

// Re-exports
pub use auth_service::{AuthService, LoginOutput};
pub use config::AuthConfig;
pub use permission_checker::{Capability, PermissionChecker};
pub use role_service::RoleService;
pub use role_validator::RoleInput;
pub use token::{TokenCodec, TokenError};
pub use user_service::UserService;
pub use user_validator::UserInput;
