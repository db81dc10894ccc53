//! RBAC (Role-Based Access Control) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Token codec, authentication, authorization, use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Email + password login issuing signed, expiring bearer tokens
//! - Users assigned exactly one role; roles carry a set of named permissions
//! - `SuperAdmin` and `Admin` roles implicitly hold every permission
//! - Role management restricted to `SuperAdmin`
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Tokens signed with HMAC-SHA256 and verified in constant time
//! - Login failures are indistinguishable (unknown email vs wrong password)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{RbacError, RbacResult};
pub use infra::postgres::PgRbacRepository;
pub use presentation::router::{rbac_router, rbac_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
