//! Authentication middleware: bearer token extraction and JWT verification.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, header::SEC_WEBSOCKET_PROTOCOL},
    middleware::Next,
    response::Response,
};
use cloudk8s_core::models::auth::TokenClaims;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::AppError;

/// Verified claims, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

/// Reads the token from `Authorization`, or from `Sec-WebSocket-Protocol` for
/// websocket upgrades, verifies it and injects [`AuthenticatedUser`].
///
/// A missing header is a 400. An empty or unverifiable token is a 401.
pub async fn require_jwt(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(token) = bearer_token(request.headers()) else {
        warn!(%method, %path, %remote, "authorization header missing");
        return Err(AppError::Validation("Authorization header missing".into()));
    };

    let claims = state.jwt.parse_token(&token).map_err(|e| {
        warn!(%method, %path, %remote, error = %e, "invalid token");
        AppError::Unauthorized(format!("Invalid token: {e}"))
    })?;

    debug!(
        context_key = state.jwt.context_key(),
        login = %claims.user.login,
        jti = %claims.jti,
        "valid token"
    );
    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}

/// Token carried by the request, without its `Bearer ` or `Authorization, ` prefix.
///
/// `None` only when neither header is present. A present header with no
/// token yields an empty string, which verification rejects.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = [AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL]
        .iter()
        .find_map(|name| headers.get(name))?;
    let raw = value.to_str().unwrap_or_default().trim();
    let token = raw
        .strip_prefix("Authorization,")
        .map(str::trim_start)
        .unwrap_or(raw);
    let token = match token.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => token,
    };
    Some(token.to_string())
}
