/// Database models for Chirpy
///
/// This module contains the persisted records and their Postgres queries.
///
/// # Models
///
/// - `user`: Accounts and their credential fields
/// - `refresh_token`: Long-lived, revocable session handles
/// - `chirp`: User posts
///
/// Handlers and the session manager reach these through the traits in
/// [`crate::store`], so the queries here are only called by
/// [`crate::store::postgres::PgStore`].

pub mod chirp;
pub mod refresh_token;
pub mod user;
