//! Request and response bodies.

use cloudk8s_core::models::auth::TokenClaims;
use serde::{Deserialize, Serialize};

use crate::config::AppInfo;

/// `application/x-www-form-urlencoded` login body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub hashed: String,
}

/// JSON login body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password_hash: String,
}

impl From<LoginForm> for LoginRequest {
    fn from(form: LoginForm) -> Self {
        Self {
            username: form.login,
            password_hash: form.hashed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub status: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub claims: TokenClaims,
}

/// Probe answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardResponse {
    pub status: String,
    pub msg: String,
    pub is_ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfoResponse {
    pub app: String,
    pub version: String,
    pub build_stamp: String,
    pub repository: String,
    pub revision: String,
    pub auth_url: String,
    pub status_url: String,
}

impl AppInfoResponse {
    pub fn new(info: &AppInfo, auth_url: &str, status_url: &str) -> Self {
        Self {
            app: info.app.clone(),
            version: info.version.clone(),
            build_stamp: info.build_stamp.clone(),
            repository: info.repository.clone(),
            revision: info.revision.clone(),
            auth_url: auth_url.to_string(),
            status_url: status_url.to_string(),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    pub message: String,
}
