//! # Chirpy API Server Library
//!
//! HTTP surface for Chirpy: user registration, login with access and
//! refresh tokens, chirps with owner-only deletion, the payment webhook,
//! and the admin pages.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `metrics`: File server hit counter
//! - `middleware`: Request middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
