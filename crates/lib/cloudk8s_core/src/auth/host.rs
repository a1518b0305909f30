//! Host allow-list for routes that trust an upstream reverse proxy.

use std::net::IpAddr;

use thiserror::Error;

/// Allow-list entry accepting every host.
pub const ANY_HOST: &str = "*";
const LOCALHOST: &str = "localhost";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to find '{0}' in the list of allowed hostnames")]
pub struct HostError(pub String);

/// Accepts `host` (the request's `Host` value, port optional) when the
/// allow-list contains `*`, when it contains `localhost` and the host is a
/// loopback address, or when the host without its port equals an entry.
pub fn validate_host_allowed<S: AsRef<str>>(host: &str, allowed: &[S]) -> Result<(), HostError> {
    if allowed.iter().any(|h| h.as_ref() == ANY_HOST) {
        return Ok(());
    }
    let hostname = strip_port(host.trim());
    if allowed.iter().any(|h| h.as_ref() == LOCALHOST) && is_loopback(hostname) {
        return Ok(());
    }
    if allowed
        .iter()
        .any(|h| h.as_ref().eq_ignore_ascii_case(hostname))
    {
        return Ok(());
    }
    Err(HostError(hostname.to_string()))
}

/// `example.com:8080` -> `example.com`, `[::1]:8080` -> `::1`.
/// A bare IPv6 address is returned unchanged.
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(ip, _)| ip);
    }
    if host.parse::<IpAddr>().is_ok() {
        return host;
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

fn is_loopback(hostname: &str) -> bool {
    matches!(hostname.parse::<IpAddr>(), Ok(ip) if ip.is_loopback())
}
