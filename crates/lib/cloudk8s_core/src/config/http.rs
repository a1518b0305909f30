//! HTTP listener and route settings: `SRV_IP`, `PORT`, `JWT_AUTH_URL`,
//! `JWT_STATUS_URL`, `JWT_COOKIE_NAME`, `RESTRICTED_URL_BASE_PATH`,
//! `ALLOWED_HOSTS`, `TLS_MODE`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use url::Url;

use super::{ConfigError, parse_number, split_list};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SRV_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_STATUS_URL: &str = "/status";
pub const DEFAULT_COOKIE_NAME: &str = "goJWT_token";
pub const DEFAULT_RESTRICTED_BASE_PATH: &str = "/goapi/v1";

pub const READINESS_PATH: &str = "/readiness";
pub const HEALTH_PATH: &str = "/health";
pub const APP_INFO_PATH: &str = "/goAppInfo";
const FIXED_PATHS: [&str; 3] = [READINESS_PATH, HEALTH_PATH, APP_INFO_PATH];

/// Where TLS terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    #[default]
    None,
    Manual,
    Autocert,
}

impl FromStr for TlsMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(TlsMode::None),
            "manual" => Ok(TlsMode::Manual),
            "autocert" => Ok(TlsMode::Autocert),
            other => Err(ConfigError::invalid(
                "TLS_MODE",
                format!("must be one of 'none', 'manual', or 'autocert', got '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub listen_ip: IpAddr,
    pub port: u16,
    /// `JWT_AUTH_URL` as configured.
    pub auth_url: String,
    /// Path component of `auth_url`; the login route.
    pub auth_path: String,
    pub status_url: String,
    pub cookie_name: String,
    /// Prefix of the JWT-protected route group. May be empty.
    pub restricted_base_path: String,
    /// Host allow-list. `None` disables host checks and the trusted-header login.
    pub allowed_hosts: Option<Vec<String>>,
    pub tls_mode: TlsMode,
}

impl HttpConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(v) => parse_number::<u16>("PORT", &v)?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::invalid(
                "PORT",
                "must be an integer between 1 and 65535",
            ));
        }

        let listen_ip = match lookup("SRV_IP") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("SRV_IP", "must be a valid IP address"))?,
            None => DEFAULT_SRV_IP,
        };

        let auth_url = lookup("JWT_AUTH_URL").ok_or(ConfigError::Missing("JWT_AUTH_URL"))?;
        let auth_path = auth_path_of(&auth_url)?;

        let status_url =
            lookup("JWT_STATUS_URL").unwrap_or_else(|| DEFAULT_STATUS_URL.to_string());
        if !status_url.starts_with('/') {
            return Err(ConfigError::invalid(
                "JWT_STATUS_URL",
                "must be a path starting with '/'",
            ));
        }

        let cookie_name =
            lookup("JWT_COOKIE_NAME").unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());
        if cookie_name.is_empty() {
            return Err(ConfigError::invalid("JWT_COOKIE_NAME", "must not be empty"));
        }

        let restricted_base_path = lookup("RESTRICTED_URL_BASE_PATH")
            .unwrap_or_else(|| DEFAULT_RESTRICTED_BASE_PATH.to_string());
        let restricted_base_path = restricted_base_path.trim_end_matches('/').to_string();
        if !restricted_base_path.is_empty() && !restricted_base_path.starts_with('/') {
            return Err(ConfigError::invalid(
                "RESTRICTED_URL_BASE_PATH",
                "must be empty or start with '/'",
            ));
        }

        let allowed_hosts = match lookup("ALLOWED_HOSTS") {
            Some(v) => {
                let hosts = split_list(&v);
                if hosts.is_empty() {
                    return Err(ConfigError::invalid(
                        "ALLOWED_HOSTS",
                        "must contain at least one valid host",
                    ));
                }
                Some(hosts)
            }
            None => None,
        };

        let tls_mode = match lookup("TLS_MODE") {
            Some(v) => v.parse()?,
            None => TlsMode::None,
        };

        let config = Self {
            listen_ip,
            port,
            auth_url,
            auth_path,
            status_url,
            cookie_name,
            restricted_base_path,
            allowed_hosts,
            tls_mode,
        };
        config.check_routes()?;
        Ok(config)
    }

    /// Login, status and the fixed routes must all be distinct paths.
    fn check_routes(&self) -> Result<(), ConfigError> {
        if FIXED_PATHS.contains(&self.auth_path.as_str()) {
            return Err(ConfigError::invalid(
                "JWT_AUTH_URL",
                format!("login route {} clashes with a built-in route", self.auth_path),
            ));
        }
        let status_path = self.restricted_status_path();
        if status_path == self.auth_path || FIXED_PATHS.contains(&status_path.as_str()) {
            return Err(ConfigError::invalid(
                "JWT_STATUS_URL",
                format!("status route {status_path} clashes with another route"),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_ip, self.port)
    }

    /// Full path of the protected status route.
    pub fn restricted_status_path(&self) -> String {
        format!("{}{}", self.restricted_base_path, self.status_url)
    }
}

/// Accepts an absolute `http(s)` URL or a path starting with `/`, and returns
/// the path the login route is mounted on.
fn auth_path_of(auth_url: &str) -> Result<String, ConfigError> {
    if auth_url.starts_with('/') {
        if auth_url.contains(['?', '#']) || auth_url.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid("JWT_AUTH_URL", "must be a valid URL"));
        }
        return Ok(auth_url.to_string());
    }
    let url = Url::parse(auth_url)
        .map_err(|e| ConfigError::invalid("JWT_AUTH_URL", format!("must be a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::invalid(
            "JWT_AUTH_URL",
            "must be an http(s) URL or a path starting with '/'",
        ));
    }
    Ok(url.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_env::lookup;

    #[test]
    fn defaults_with_relative_auth_url() {
        let cfg = HttpConfig::from_lookup(lookup(&[("JWT_AUTH_URL", "/login")])).expect("config");
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.listen_ip, DEFAULT_SRV_IP);
        assert_eq!(cfg.auth_path, "/login");
        assert_eq!(cfg.status_url, DEFAULT_STATUS_URL);
        assert_eq!(cfg.cookie_name, DEFAULT_COOKIE_NAME);
        assert_eq!(cfg.restricted_status_path(), "/goapi/v1/status");
        assert!(cfg.allowed_hosts.is_none());
        assert_eq!(cfg.tls_mode, TlsMode::None);
        assert_eq!(cfg.listen_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn absolute_auth_url_mounts_its_path() {
        let cfg = HttpConfig::from_lookup(lookup(&[(
            "JWT_AUTH_URL",
            "https://auth.example.org:8443/goapi/v1/login",
        )]))
        .expect("config");
        assert_eq!(cfg.auth_path, "/goapi/v1/login");
    }

    #[test]
    fn auth_url_is_required_and_validated() {
        assert_eq!(
            HttpConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("JWT_AUTH_URL")
        );
        for bad in ["login", "ftp://example.org/login", "/login?x=1", "not a url"] {
            assert!(
                HttpConfig::from_lookup(lookup(&[("JWT_AUTH_URL", bad)])).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn port_and_ip_are_validated() {
        for (k, v) in [("PORT", "0"), ("PORT", "65536"), ("PORT", "http"), ("SRV_IP", "localhost")] {
            assert!(
                HttpConfig::from_lookup(lookup(&[("JWT_AUTH_URL", "/login"), (k, v)])).is_err(),
                "{k}={v} should be rejected"
            );
        }
    }

    #[test]
    fn allowed_hosts_are_split_and_must_not_be_empty() {
        let cfg = HttpConfig::from_lookup(lookup(&[
            ("JWT_AUTH_URL", "/login"),
            ("ALLOWED_HOSTS", "localhost, app.example.org"),
        ]))
        .expect("config");
        assert_eq!(
            cfg.allowed_hosts,
            Some(vec!["localhost".to_string(), "app.example.org".to_string()])
        );

        assert!(
            HttpConfig::from_lookup(lookup(&[("JWT_AUTH_URL", "/login"), ("ALLOWED_HOSTS", " , ")]))
                .is_err()
        );
    }

    #[test]
    fn empty_restricted_base_path_is_allowed() {
        let cfg = HttpConfig::from_lookup(lookup(&[
            ("JWT_AUTH_URL", "/login"),
            ("RESTRICTED_URL_BASE_PATH", ""),
        ]))
        .expect("config");
        assert_eq!(cfg.restricted_status_path(), "/status");
    }

    #[test]
    fn overlapping_routes_are_rejected() {
        let err = HttpConfig::from_lookup(lookup(&[
            ("JWT_AUTH_URL", "/login"),
            ("JWT_STATUS_URL", "/login"),
            ("RESTRICTED_URL_BASE_PATH", ""),
            ("ALLOWED_HOSTS", "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "JWT_STATUS_URL", .. }));

        let err = HttpConfig::from_lookup(lookup(&[
            ("JWT_STATUS_URL", "/health"),
            ("JWT_AUTH_URL", "/login"),
            ("RESTRICTED_URL_BASE_PATH", "/"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "JWT_STATUS_URL", .. }));

        let err = HttpConfig::from_lookup(lookup(&[("JWT_AUTH_URL", "https://example.org/readiness")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "JWT_AUTH_URL", .. }));

        assert!(
            HttpConfig::from_lookup(lookup(&[
                ("JWT_AUTH_URL", "/login"),
                ("JWT_STATUS_URL", "/login"),
            ]))
            .is_ok()
        );
    }

    #[test]
    fn tls_modes() {
        assert_eq!("manual".parse::<TlsMode>(), Ok(TlsMode::Manual));
        assert_eq!("autocert".parse::<TlsMode>(), Ok(TlsMode::Autocert));
        assert!("letsencrypt".parse::<TlsMode>().is_err());
    }
}
