//! Environment-driven configuration.
//!
//! Every config struct parses through a pure `from_lookup()` that takes the
//! variable source as a closure. `from_env()` binds it to the process
//! environment where a binary needs that.

pub mod admin;
pub mod auth;
pub mod db;
pub mod http;
pub mod jwt;
pub mod logging;

use std::str::FromStr;

use thiserror::Error;

pub use admin::AdminConfig;
pub use auth::{AuthConfig, AuthMode};
pub use db::DbConfig;
pub use http::{HttpConfig, TlsMode};
pub use jwt::JwtConfig;
pub use logging::{LogConfig, LogLevel, LogTarget};

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ENV {0} is required")]
    Missing(&'static str),

    #[error("ENV {var} is too short: minimum {min} characters, got {got}")]
    TooShort {
        var: &'static str,
        min: usize,
        got: usize,
    },

    #[error("ENV {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Reads a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Complete process configuration, assembled once in `main`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Application name, used as the JWT subject and default DB name/user.
    pub app_name: String,
    pub http: HttpConfig,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    pub auth: AuthConfig,
    pub db: DbConfig,
    pub log: LogConfig,
}

impl Settings {
    /// Reads the full configuration from the process environment.
    pub fn from_env(app_name: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(app_name, process_env)
    }

    /// Reads the full configuration from `lookup`.
    pub fn from_lookup<F>(app_name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http = HttpConfig::from_lookup(&lookup)?;
        if http.tls_mode != TlsMode::None {
            return Err(ConfigError::invalid(
                "TLS_MODE",
                "only 'none' is supported, terminate TLS at the ingress",
            ));
        }
        let auth = AuthConfig::from_lookup(&lookup)?;
        if auth.mode == AuthMode::Employee && http.allowed_hosts.is_none() {
            return Err(ConfigError::invalid(
                "ALLOWED_HOSTS",
                "required when AUTH_MODE=employee",
            ));
        }
        Ok(Self {
            app_name: app_name.to_string(),
            jwt: JwtConfig::from_lookup(app_name, &lookup)?,
            admin: AdminConfig::from_lookup(&lookup)?,
            db: DbConfig::from_lookup(&to_snake_case(app_name), &lookup)?,
            log: LogConfig::from_lookup(&lookup)?,
            http,
            auth,
        })
    }
}

pub(crate) fn char_count(s: &str) -> usize {
    s.chars().count()
}

pub(crate) fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::invalid(var, format!("must be a valid integer: {e}")))
}

pub(crate) fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(var, format!("'{other}' is not a boolean"))),
    }
}

/// Splits a comma-separated list, dropping blank entries.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `goCloudK8sExample` -> `go_cloud_k8s_example`.
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in s.chars() {
        if c == '-' || c == ' ' {
            out.push('_');
            prev_lower_or_digit = false;
        } else if c.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod test_env {
    use std::collections::HashMap;

    /// Builds a lookup closure over a fixed set of variables.
    pub fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    /// A minimal valid environment for `Settings`.
    pub fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("JWT_SECRET", "a-very-long-test-secret"),
            ("JWT_ISSUER_ID", "test-issuer-identifier"),
            ("JWT_CONTEXT_KEY", "jwtdata"),
            ("JWT_AUTH_URL", "/login"),
            ("ADMIN_PASSWORD", "Sup3r-Secret!"),
            ("DB_PASSWORD", "postgres"),
        ]
    }
}
