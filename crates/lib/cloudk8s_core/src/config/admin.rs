//! Administrator account settings: `ADMIN_USER`, `ADMIN_EMAIL`, `ADMIN_ID`,
//! `ADMIN_EXTERNAL_ID`, `ADMIN_PASSWORD`.

use std::fmt;

use super::{ConfigError, char_count, parse_number, process_env};

pub const DEFAULT_ADMIN_USER: &str = "goadmin";
pub const DEFAULT_ADMIN_EMAIL: &str = "goadmin@yourdomain.org";
pub const DEFAULT_ADMIN_ID: i64 = 960901;
pub const DEFAULT_ADMIN_EXTERNAL_ID: i64 = 99999;

const MIN_USER_NAME_LENGTH: usize = 5;
const MIN_USER_EMAIL_LENGTH: usize = 12;
const MIN_USER_PASSWORD_LENGTH: usize = 8;

/// The single administrator known to every authenticator.
#[derive(Clone)]
pub struct AdminConfig {
    pub user_id: i64,
    pub external_id: i64,
    pub login: String,
    pub email: String,
    /// Plaintext password; only its SHA-256 digest is kept after startup.
    pub password: String,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("user_id", &self.user_id)
            .field("external_id", &self.external_id)
            .field("login", &self.login)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let login = lookup("ADMIN_USER").unwrap_or_else(|| DEFAULT_ADMIN_USER.to_string());
        let got = char_count(&login);
        if got < MIN_USER_NAME_LENGTH {
            return Err(ConfigError::TooShort {
                var: "ADMIN_USER",
                min: MIN_USER_NAME_LENGTH,
                got,
            });
        }

        let email = lookup("ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());
        validate_email(&email)?;

        let user_id = match lookup("ADMIN_ID") {
            Some(v) => parse_number("ADMIN_ID", &v)?,
            None => DEFAULT_ADMIN_ID,
        };
        let external_id = match lookup("ADMIN_EXTERNAL_ID") {
            Some(v) => parse_number("ADMIN_EXTERNAL_ID", &v)?,
            None => DEFAULT_ADMIN_EXTERNAL_ID,
        };

        let password = lookup("ADMIN_PASSWORD").ok_or(ConfigError::Missing("ADMIN_PASSWORD"))?;
        let got = char_count(&password);
        if got < MIN_USER_PASSWORD_LENGTH {
            return Err(ConfigError::TooShort {
                var: "ADMIN_PASSWORD",
                min: MIN_USER_PASSWORD_LENGTH,
                got,
            });
        }
        if !verify_password_complexity(&password) {
            return Err(ConfigError::invalid(
                "ADMIN_PASSWORD",
                "must contain lowercase, uppercase, digit, and special character. No whitespace, #, |, or '",
            ));
        }

        Ok(Self {
            user_id,
            external_id,
            login,
            email,
            password,
        })
    }
}

fn validate_email(email: &str) -> Result<(), ConfigError> {
    let got = char_count(email);
    if got < MIN_USER_EMAIL_LENGTH {
        return Err(ConfigError::TooShort {
            var: "ADMIN_EMAIL",
            min: MIN_USER_EMAIL_LENGTH,
            got,
        });
    }
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(ConfigError::invalid(
            "ADMIN_EMAIL",
            "must be a valid email address",
        ));
    }
    if let Some(c) = email
        .chars()
        .find(|c| c.is_ascii_punctuation() && !matches!(c, '@' | '.' | '_' | '-'))
    {
        return Err(ConfigError::invalid(
            "ADMIN_EMAIL",
            format!("contains invalid special character '{c}'"),
        ));
    }
    Ok(())
}

/// At least one lowercase letter, one uppercase letter, one digit and one
/// special character; no whitespace, `#`, `|` or `'`.
pub fn verify_password_complexity(s: &str) -> bool {
    let (mut number, mut upper, mut lower, mut special) = (false, false, false, false);
    for c in s.chars() {
        if c.is_numeric() {
            number = true;
        } else if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c == '#' || c == '|' || c == '\'' || c.is_whitespace() {
            return false;
        } else if !c.is_alphanumeric() {
            special = true;
        }
    }
    number && upper && lower && special
}
