//! Request middleware for the protected route group.
//!
//! Order: [`cookie::cookie_to_header`] runs first, then [`auth::require_jwt`].

pub mod auth;
pub mod cookie;
