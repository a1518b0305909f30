//! Probe, app-info and fallback handlers.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, Uri};

use crate::AppState;
use crate::error::AppError;
use crate::models::{AppInfoResponse, StandardResponse};

fn probe(ok: bool, app: &str, state: &str) -> (StatusCode, Json<StandardResponse>) {
    if ok {
        (
            StatusCode::OK,
            Json(StandardResponse {
                status: state.to_string(),
                msg: format!("({app}) is {state}"),
                is_ok: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StandardResponse {
                status: "error".to_string(),
                msg: format!("({app}) is not {state}"),
                is_ok: false,
            }),
        )
    }
}

/// `GET /readiness`
pub async fn readiness_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<StandardResponse>) {
    let ok = state.readiness.is_ok().await;
    probe(ok, &state.config.info.app, "ready")
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<StandardResponse>) {
    let ok = state.health.is_ok().await;
    probe(ok, &state.config.info.app, "healthy")
}

/// `GET /goAppInfo`
pub async fn app_info_handler(State(state): State<AppState>) -> Json<AppInfoResponse> {
    let config = &state.config;
    Json(AppInfoResponse::new(
        &config.info,
        &config.auth_url,
        &config.restricted_status_path(),
    ))
}

/// JSON 404 for unknown routes.
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
