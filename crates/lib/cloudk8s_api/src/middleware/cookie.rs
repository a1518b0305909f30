//! Promotes the JWT cookie into an `Authorization: Bearer` header.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::AppState;

/// When the request has no `Authorization` header and carries the configured
/// cookie, sets `Authorization: Bearer <cookie value>`. Never rejects.
pub async fn cookie_to_header(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(AUTHORIZATION) {
        let jar = CookieJar::from_headers(request.headers());
        let bearer = jar
            .get(&state.config.cookie_name)
            .map(|c| format!("Bearer {}", c.value()))
            .and_then(|v| HeaderValue::from_str(&v).ok());
        if let Some(value) = bearer {
            debug!(cookie = %state.config.cookie_name, "authorization taken from cookie");
            request.headers_mut().insert(AUTHORIZATION, value);
        }
    }
    next.run(request).await
}
