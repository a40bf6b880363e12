//! # Chirpy Shared Library
//!
//! The authentication and session core of Chirpy, plus the records and
//! storage seams the API server builds on.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, access/refresh tokens, sessions, ownership checks
//! - `models`: database records and their queries
//! - `store`: persistence traits with Postgres and in-memory backends
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Chirpy shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
