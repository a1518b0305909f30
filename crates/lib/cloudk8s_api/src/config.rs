//! API server configuration.

use cloudk8s_core::config::{AuthMode, Settings};

/// Static build metadata served by `/goAppInfo`.
#[derive(Clone, Debug, Default)]
pub struct AppInfo {
    pub app: String,
    pub version: String,
    pub build_stamp: String,
    pub repository: String,
    pub revision: String,
}

/// Route and policy settings the HTTP layer needs.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub info: AppInfo,
    /// `JWT_AUTH_URL` as configured, echoed by `/goAppInfo`.
    pub auth_url: String,
    /// Path the login routes are mounted on.
    pub auth_path: String,
    /// Status path relative to `restricted_base_path`.
    pub status_url: String,
    /// Prefix of the JWT-protected route group. May be empty.
    pub restricted_base_path: String,
    /// Cookie promoted to the `Authorization` header.
    pub cookie_name: String,
    /// Host allow-list. `None` disables host checks and the trusted-header login.
    pub allowed_hosts: Option<Vec<String>>,
    pub auth_mode: AuthMode,
}

impl ApiConfig {
    pub fn from_settings(settings: &Settings, info: AppInfo) -> Self {
        Self {
            info,
            auth_url: settings.http.auth_url.clone(),
            auth_path: settings.http.auth_path.clone(),
            status_url: settings.http.status_url.clone(),
            restricted_base_path: settings.http.restricted_base_path.clone(),
            cookie_name: settings.http.cookie_name.clone(),
            allowed_hosts: settings.http.allowed_hosts.clone(),
            auth_mode: settings.auth.mode,
        }
    }

    /// Full path of the protected status route.
    pub fn restricted_status_path(&self) -> String {
        format!("{}{}", self.restricted_base_path, self.status_url)
    }
}
