//! # cloudk8s_api
//!
//! HTTP API library for cloudk8s: login endpoints issuing JWTs, a protected
//! route group verified by middleware, and the probe/info endpoints.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use cloudk8s_core::auth::{Authenticator, JwtChecker};
use cloudk8s_core::config::AuthMode;
use cloudk8s_core::health::HealthCheck;
use cloudk8s_core::store::CredentialStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;
use crate::handlers::{auth, probes, status};

pub use cloudk8s_core::config::http::{APP_INFO_PATH, HEALTH_PATH, READINESS_PATH};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    /// Token issuer and verifier.
    pub jwt: Arc<JwtChecker>,
    pub authenticator: Arc<dyn Authenticator>,
    /// Credential store, present in employee mode.
    pub store: Option<Arc<dyn CredentialStore>>,
    pub readiness: Arc<dyn HealthCheck>,
    pub health: Arc<dyn HealthCheck>,
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let config = state.config.clone();

    // Public routes (no auth required). The trusted-header login needs the
    // employee store and a host allow-list.
    let trusted_header_login =
        config.auth_mode == AuthMode::Employee && config.allowed_hosts.is_some();
    let mut login_route = axum::routing::post(auth::login_handler);
    if trusted_header_login {
        login_route = login_route.get(auth::trusted_header_login_handler);
    }
    let public = Router::new()
        .route(&config.auth_path, login_route)
        .route(READINESS_PATH, get(probes::readiness_handler))
        .route(HEALTH_PATH, get(probes::health_handler))
        .route(APP_INFO_PATH, get(probes::app_info_handler));

    // Protected routes (require a valid JWT)
    let status_path = config.restricted_status_path();
    let protected = Router::new()
        .route(&status_path, get(status::status_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_jwt,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cookie::cookie_to_header,
        ));

    info!(
        auth_path = %config.auth_path,
        status_path = %status_path,
        trusted_header_login,
        "routes configured"
    );

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(probes::not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
