//! Request handlers.

pub mod auth;
pub mod probes;
pub mod status;
