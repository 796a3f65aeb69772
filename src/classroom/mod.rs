//! Classroom module: creation with join codes, enrollment and listings.

pub mod handlers;

pub use handlers::generate_join_code;
