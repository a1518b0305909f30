//! Authenticator selection: `AUTH_MODE`, `ADMIN_IDS`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::{ConfigError, parse_number, split_list};

/// Which authenticator backs the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Only the configured administrator may log in.
    #[default]
    Admin,
    /// The administrator plus any active employee found in the store.
    Employee,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "simple" => Ok(AuthMode::Admin),
            "employee" | "employe" | "f5" => Ok(AuthMode::Employee),
            other => Err(ConfigError::invalid(
                "AUTH_MODE",
                format!("unknown mode '{other}', expected admin or employee"),
            )),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Admin => f.write_str("admin"),
            AuthMode::Employee => f.write_str("employee"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Store user ids that receive administrator rights.
    pub admin_ids: BTreeSet<i64>,
}

impl AuthConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("AUTH_MODE") {
            Some(v) => v.parse()?,
            None => AuthMode::default(),
        };
        let admin_ids = match lookup("ADMIN_IDS") {
            Some(v) => split_list(&v)
                .iter()
                .map(|id| parse_number::<i64>("ADMIN_IDS", id))
                .collect::<Result<BTreeSet<_>, _>>()?,
            None => BTreeSet::new(),
        };
        Ok(Self { mode, admin_ids })
    }
}
