//! PostgreSQL settings: `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`,
//! `DB_PASSWORD`, `DB_SSL_MODE`, `DB_RUN_MIGRATIONS`.

use std::fmt;
use std::net::IpAddr;

use url::Url;

use super::{ConfigError, parse_bool, parse_number};

pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_SSL_MODE: &str = "prefer";

const SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

#[derive(Clone)]
pub struct DbConfig {
    pub host: IpAddr,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: String,
    /// Apply embedded migrations at startup.
    pub run_migrations: bool,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl_mode", &self.ssl_mode)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl DbConfig {
    /// `default_name` is used for both `DB_NAME` and `DB_USER` when unset.
    pub fn from_lookup<F>(default_name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host_raw = lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
        let host: IpAddr = host_raw.trim().parse().map_err(|_| {
            ConfigError::invalid("DB_HOST", format!("'{host_raw}' is not a valid IP address"))
        })?;

        let port = match lookup("DB_PORT") {
            Some(v) => parse_number::<u16>("DB_PORT", &v)?,
            None => DEFAULT_DB_PORT,
        };
        if port == 0 {
            return Err(ConfigError::invalid("DB_PORT", "must be between 1 and 65535"));
        }

        let name = lookup("DB_NAME").unwrap_or_else(|| default_name.to_string());
        let user = lookup("DB_USER").unwrap_or_else(|| default_name.to_string());
        if name.is_empty() {
            return Err(ConfigError::Missing("DB_NAME"));
        }
        if user.is_empty() {
            return Err(ConfigError::Missing("DB_USER"));
        }

        let password = lookup("DB_PASSWORD").ok_or(ConfigError::Missing("DB_PASSWORD"))?;

        let ssl_mode = lookup("DB_SSL_MODE")
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_DB_SSL_MODE.to_string());
        if !SSL_MODES.contains(&ssl_mode.as_str()) {
            return Err(ConfigError::invalid(
                "DB_SSL_MODE",
                format!("'{ssl_mode}' is not one of {}", SSL_MODES.join(", ")),
            ));
        }

        let run_migrations = match lookup("DB_RUN_MIGRATIONS") {
            Some(v) => parse_bool("DB_RUN_MIGRATIONS", &v)?,
            None => true,
        };

        Ok(Self {
            host,
            port,
            name,
            user,
            password,
            ssl_mode,
            run_migrations,
        })
    }

    /// Connection URL with user and password percent-encoded.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        self.build_url(Some(&self.password))
    }

    /// Connection URL safe to log.
    pub fn redacted_url(&self) -> String {
        self.build_url(Some("xxxxx"))
            .unwrap_or_else(|_| format!("postgres://{}:{}/{}", self.host, self.port, self.name))
    }

    fn build_url(&self, password: Option<&str>) -> Result<String, ConfigError> {
        let host = match self.host {
            IpAddr::V4(ip) => ip.to_string(),
            IpAddr::V6(ip) => format!("[{ip}]"),
        };
        let base = format!("postgres://{host}:{}/", self.port);
        let mut url = Url::parse(&base)
            .map_err(|e| ConfigError::invalid("DB_HOST", e.to_string()))?;
        url.set_username(&self.user)
            .map_err(|_| ConfigError::invalid("DB_USER", "cannot be used in a URL"))?;
        url.set_password(password)
            .map_err(|_| ConfigError::invalid("DB_PASSWORD", "cannot be used in a URL"))?;
        url.path_segments_mut()
            .map_err(|_| ConfigError::invalid("DB_HOST", "cannot be used as a URL base"))?
            .clear()
            .push(&self.name);
        url.query_pairs_mut().append_pair("sslmode", &self.ssl_mode);
        Ok(url.to_string())
    }
}
