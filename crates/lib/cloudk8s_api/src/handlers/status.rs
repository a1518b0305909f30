//! Protected status handler.

use axum::http::{HeaderMap, Uri};
use axum::{Extension, Json, extract::State};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::StatusResponse;
use crate::services::auth;

/// `GET <restricted base><status url>`: the caller's decoded claims.
pub async fn status_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(claims)): Extension<AuthenticatedUser>,
    uri: Uri,
    headers: HeaderMap,
) -> AppResult<Json<StatusResponse>> {
    auth::check_host(&state, &headers, &uri)?;
    auth::ensure_caller_exists(&state, &claims).await?;
    Ok(Json(StatusResponse {
        status: "success".to_string(),
        claims,
    }))
}
