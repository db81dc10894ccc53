//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{claims::Claims, permission::Permission, role::Role, user::User};
pub use repository::{PermissionRepository, RbacStore, RoleRepository, UserRepository};
