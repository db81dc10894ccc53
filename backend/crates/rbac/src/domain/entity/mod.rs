//! Entity Module

pub mod claims;
pub mod permission;
pub mod role;
pub mod user;
