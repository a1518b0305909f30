use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cloudk8s", version, about = "cloudk8s operator tools")]
pub struct Cli {
    /// Application the tokens are issued for (JWT subject).
    #[arg(long, global = true, env = "APP_NAME", default_value = "cloudk8s_server")]
    pub app_name: String,

    /// Environment file loaded before reading the configuration.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version.
    Version,

    /// Print the login hash (SHA-256 hex) of a password.
    HashPassword {
        password: String,
    },

    /// Issue a token for the configured administrator.
    IssueToken,

    /// Verify a token and print its claims.
    VerifyToken {
        token: String,
    },
}
