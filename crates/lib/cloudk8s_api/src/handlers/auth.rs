//! Login request handlers.

use axum::Json;
use axum::extract::{Form, FromRequest, Request, State};
use axum::http::{HeaderMap, Uri, header::CONTENT_TYPE};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{LoginForm, LoginRequest, MessageResponse, TokenResponse};
use crate::services::{auth, cookies};

/// `POST <auth path>`: form `login` + `hashed`, or JSON `username` +
/// `password_hash`. Answers with a bearer token.
pub async fn login_handler(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<TokenResponse>> {
    auth::check_host(&state, request.headers(), request.uri())?;
    let body = read_login(&state, request).await?;
    let token = auth::login(&state, body).await?;
    Ok(Json(TokenResponse {
        status: "success".to_string(),
        token,
    }))
}

/// `GET <auth path>`: login asserted by the upstream proxy through the
/// `UserId` header. The token is returned in the JWT cookie.
pub async fn trusted_header_login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    auth::check_host(&state, &headers, &uri)?;
    let token = auth::trusted_header_login(&state, &headers).await?;
    let jar = jar.add(cookies::jwt_cookie(&state.config.cookie_name, &token));
    Ok((
        jar,
        Json(MessageResponse {
            status: "success".to_string(),
            message: "login successful, token set in HTTP-only cookie".to_string(),
        }),
    ))
}

async fn read_login(state: &AppState, request: Request) -> AppResult<LoginRequest> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        let Json(body) = Json::<LoginRequest>::from_request(request, state)
            .await
            .map_err(|e| AppError::Validation(format!("invalid json login: {}", e.body_text())))?;
        Ok(body)
    } else {
        let Form(form) = Form::<LoginForm>::from_request(request, state)
            .await
            .map_err(|e| AppError::Validation(format!("invalid login form: {}", e.body_text())))?;
        Ok(form.into())
    }
}
