//! # cloudk8s_core
//!
//! Core domain logic for cloudk8s: environment configuration, identity and
//! claims models, JWT issuance/verification, authenticators and the
//! credential store, plus a thin PostgreSQL wrapper.

pub mod auth;
pub mod config;
pub mod db;
pub mod health;
pub mod metadata;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
