//! Database module for the SchoolHub server
//!
//! This module holds the row models and the data access layer
//! over the shared Postgres pool.

pub mod models;
pub mod operations;

pub use models::{NewUser, Role, User};
pub use operations::DbOperations;
