//! Middleware for the admin API.

pub mod auth;

pub use auth::require_bearer;
