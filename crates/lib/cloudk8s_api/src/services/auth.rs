//! Authentication service: login flows on top of `cloudk8s_core::auth`.

use axum::http::{HeaderMap, Uri, header::HOST};
use cloudk8s_core::auth::password::hash_password;
use cloudk8s_core::auth::validation::{validate_login, validate_password_hash};
use cloudk8s_core::auth::{AuthError, validate_host_allowed};
use cloudk8s_core::config::AuthMode;
use cloudk8s_core::models::auth::TokenClaims;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::LoginRequest;

/// Header set by the upstream proxy with the already authenticated login.
pub const TRUSTED_USER_HEADER: &str = "UserId";

/// Host the client addressed: the `Host` header, else the URI authority.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// Enforces the host allow-list when one is configured.
pub fn check_host(state: &AppState, headers: &HeaderMap, uri: &Uri) -> AppResult<()> {
    let Some(allowed) = state.config.allowed_hosts.as_deref() else {
        return Ok(());
    };
    let host = request_host(headers, uri);
    validate_host_allowed(&host, allowed).map_err(|e| {
        warn!(%host, error = %e, "host not allowed");
        AppError::from(AuthError::from(e))
    })
}

/// Password-hash login. Returns the signed token.
pub async fn login(state: &AppState, body: LoginRequest) -> AppResult<String> {
    let login = body.username.trim();
    let password_hash = body.password_hash.trim();
    validate_login(login)?;
    validate_password_hash(password_hash)?;

    if !state
        .authenticator
        .authenticate_user(login, password_hash)
        .await
    {
        return Err(AuthError::CredentialError.into());
    }
    let token = issue_for(state, login).await?;
    info!(login, "successful login");
    Ok(token)
}

/// Login asserted by the upstream proxy. The proof handed to the
/// authenticator is synthesized, since the proxy already checked the password.
pub async fn trusted_header_login(state: &AppState, headers: &HeaderMap) -> AppResult<String> {
    let login = headers
        .get(TRUSTED_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    if login.is_empty() {
        warn!("trusted header login without {TRUSTED_USER_HEADER} header");
        return Err(AppError::Unauthorized(format!(
            "failed to get login because {TRUSTED_USER_HEADER} header is missing"
        )));
    }
    validate_login(login)?;

    let proof = hash_password(&state.config.info.app);
    if !state.authenticator.authenticate_user(login, &proof).await {
        warn!(login, "trusted header login for unknown user");
        return Err(AppError::Unauthorized(format!(
            "user {login} does not exist"
        )));
    }
    let token = issue_for(state, login).await?;
    info!(login, "trusted header login successful, token set in cookie");
    Ok(token)
}

async fn issue_for(state: &AppState, login: &str) -> AppResult<String> {
    let user = state
        .authenticator
        .user_info_from_login(login)
        .await
        .map_err(|e| AppError::Internal(format!("error getting user info from login: {e}")))?;
    state
        .jwt
        .issue_token(&user)
        .map_err(|e| AppError::Internal(format!("error getting jwt token from user info: {e}")))
}

/// In employee mode, a non-admin caller must still exist in the store.
pub async fn ensure_caller_exists(state: &AppState, claims: &TokenClaims) -> AppResult<()> {
    if state.config.auth_mode != AuthMode::Employee || claims.user.is_admin {
        return Ok(());
    }
    let Some(store) = state.store.as_ref() else {
        return Ok(());
    };
    let exists = store
        .exists(&claims.user.login)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !exists {
        warn!(login = %claims.user.login, "calling user no longer exists");
        return Err(AuthError::UserNotFound(claims.user.login.clone()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn host_comes_from_header_then_uri() {
        let mut headers = HeaderMap::new();
        let uri: Uri = "http://fallback.example.org:8080/login".parse().unwrap();
        assert_eq!(request_host(&headers, &uri), "fallback.example.org:8080");

        headers.insert(HOST, HeaderValue::from_static("app.example.org"));
        assert_eq!(request_host(&headers, &uri), "app.example.org");

        let relative: Uri = "/login".parse().unwrap();
        assert_eq!(request_host(&HeaderMap::new(), &relative), "");
    }
}
