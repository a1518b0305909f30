//! Log settings: `LOG_LEVEL`, `LOG_FILE`.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, char_count};

const MIN_LOG_FILE_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            // tracing has no level above error
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "0" => Ok(LogLevel::Debug),
            "info" | "1" => Ok(LogLevel::Info),
            "warn" | "warning" | "2" => Ok(LogLevel::Warn),
            "error" | "3" => Ok(LogLevel::Error),
            "fatal" | "4" => Ok(LogLevel::Fatal),
            _ => Err(ConfigError::invalid(
                "LOG_LEVEL",
                format!("'{s}' (accepted: debug, info, warn, error, fatal or 0-4)"),
            )),
        }
    }
}

/// Destination of log output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    Stdout,
    #[default]
    Stderr,
    Discard,
    /// Appended to, created if missing.
    File(PathBuf),
}

impl FromStr for LogTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let got = char_count(s);
        if got < MIN_LOG_FILE_LENGTH {
            return Err(ConfigError::TooShort {
                var: "LOG_FILE",
                min: MIN_LOG_FILE_LENGTH,
                got,
            });
        }
        Ok(match s {
            "stdout" => LogTarget::Stdout,
            "stderr" => LogTarget::Stderr,
            "DISCARD" => LogTarget::Discard,
            path => LogTarget::File(PathBuf::from(path)),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub target: LogTarget,
}

impl LogConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = match lookup("LOG_LEVEL") {
            Some(v) if !v.trim().is_empty() => v.parse()?,
            _ => LogLevel::default(),
        };
        let target = match lookup("LOG_FILE") {
            Some(v) => v.parse()?,
            None => LogTarget::default(),
        };
        Ok(Self { level, target })
    }
}
