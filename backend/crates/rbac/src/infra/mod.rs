//! Infrastructure Layer
//!
//! Database implementations.

pub mod postgres;

pub use postgres::PgRbacRepository;
