/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Session endpoints (login, refresh, revoke)
/// - `users`: Registration and credential changes
/// - `chirps`: Posting, listing and deleting chirps
/// - `webhooks`: Payment provider callbacks
/// - `admin`: Hit counter page and dev-only reset

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod health;
pub mod users;
pub mod webhooks;
