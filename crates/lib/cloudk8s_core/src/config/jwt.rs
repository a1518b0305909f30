//! JWT settings: `JWT_SECRET`, `JWT_ISSUER_ID`, `JWT_CONTEXT_KEY`,
//! `JWT_DURATION_MINUTES`.

use std::fmt;

use super::{ConfigError, char_count, parse_number, process_env};

/// Token lifetime used when `JWT_DURATION_MINUTES` is not set.
pub const DEFAULT_JWT_DURATION_MINUTES: i64 = 60;

const MIN_SECRET_LENGTH: usize = 16;
const MIN_CONTEXT_KEY_LENGTH: usize = 6;
const MAX_JWT_DURATION_MINUTES: i64 = 1440;

/// Settings shared by the token issuer and verifier.
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret.
    pub secret: String,
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Value of the `sub` claim, the application name.
    pub audience: String,
    /// Label under which verified claims are attached to a request.
    pub context_key: String,
    /// Token lifetime in minutes.
    pub duration_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("context_key", &self.context_key)
            .field("duration_minutes", &self.duration_minutes)
            .finish()
    }
}

impl JwtConfig {
    pub fn from_env(audience: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(audience, process_env)
    }

    pub fn from_lookup<F>(audience: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        require_min_len("JWT_SECRET", &secret, MIN_SECRET_LENGTH)?;

        let issuer = lookup("JWT_ISSUER_ID").ok_or(ConfigError::Missing("JWT_ISSUER_ID"))?;
        require_min_len("JWT_ISSUER_ID", &issuer, MIN_SECRET_LENGTH)?;

        let context_key =
            lookup("JWT_CONTEXT_KEY").ok_or(ConfigError::Missing("JWT_CONTEXT_KEY"))?;
        require_min_len("JWT_CONTEXT_KEY", &context_key, MIN_CONTEXT_KEY_LENGTH)?;
        if !context_key.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::invalid(
                "JWT_CONTEXT_KEY",
                "must contain only letters (a-z, A-Z)",
            ));
        }

        let duration_minutes = match lookup("JWT_DURATION_MINUTES") {
            Some(v) => parse_number::<i64>("JWT_DURATION_MINUTES", &v)?,
            None => DEFAULT_JWT_DURATION_MINUTES,
        };
        if !(1..=MAX_JWT_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(ConfigError::invalid(
                "JWT_DURATION_MINUTES",
                format!("must be between 1 and {MAX_JWT_DURATION_MINUTES}"),
            ));
        }

        Ok(Self {
            secret,
            issuer,
            audience: audience.to_string(),
            context_key,
            duration_minutes,
        })
    }
}

fn require_min_len(var: &'static str, value: &str, min: usize) -> Result<(), ConfigError> {
    let got = char_count(value);
    if got < min {
        return Err(ConfigError::TooShort { var, min, got });
    }
    Ok(())
}
