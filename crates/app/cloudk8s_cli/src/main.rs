// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use cloudk8s_core::auth::password::hash_password;
use cloudk8s_core::auth::{AdminAccount, JwtChecker};
use cloudk8s_core::config::{AdminConfig, JwtConfig};

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();
    if let Some(path) = &args.env_file {
        dotenvy::from_path(path)
            .map_err(|e| Error::Custom(format!("cannot load {}: {e}", path.display())))?;
    }

    match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), cloudk8s_core::version());
        }
        Commands::HashPassword { password } => {
            println!("{}", hash_password(password));
        }
        Commands::IssueToken => {
            let jwt = JwtChecker::new(&JwtConfig::from_env(&args.app_name)?);
            let admin = AdminAccount::from_config(&AdminConfig::from_env()?);
            let token = jwt.issue_token(&admin.identity())?;
            log::info!("token issued for {} by {}", admin.login, jwt.issuer());
            println!("{token}");
        }
        Commands::VerifyToken { token } => {
            let jwt = JwtChecker::new(&JwtConfig::from_env(&args.app_name)?);
            let claims = jwt.parse_token(token.trim())?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
    }

    Ok(())
}
