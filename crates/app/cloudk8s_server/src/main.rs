//! cloudk8s API server binary.
//!
//! Reads its configuration from the environment (optionally seeded from a
//! `.env` file), connects to PostgreSQL, registers its version in the
//! schema metadata table and serves the JWT-protected API until SIGINT or
//! SIGTERM.

mod logging;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cloudk8s_api::config::{ApiConfig, AppInfo};
use cloudk8s_api::{AppState, router};
use cloudk8s_core::auth::{
    AdminAccount, AdminAuthenticator, Authenticator, JwtChecker, StoreAuthenticator,
};
use cloudk8s_core::config::{AuthMode, LogConfig, Settings};
use cloudk8s_core::db::Database;
use cloudk8s_core::metadata::MetadataService;
use cloudk8s_core::store::{CredentialStore, PgEmployeeStore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "cloudk8s_server", version, about = "cloudk8s JWT API server")]
struct Args {
    /// Application name: JWT subject, metadata service name and default DB name.
    #[arg(long, env = "APP_NAME", default_value = env!("CARGO_PKG_NAME"))]
    app_name: String,

    /// Environment file loaded before reading the configuration.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let env_loaded = dotenvy::from_path(&args.env_file).is_ok();

    let settings = match Settings::from_env(&args.app_name) {
        Ok(settings) => settings,
        Err(e) => {
            let log_guard = logging::init(&LogConfig::default())?;
            error!(error = %e, "invalid configuration");
            drop(log_guard);
            std::process::exit(1);
        }
    };
    let _log_guard = logging::init(&settings.log)?;

    let info = app_info(&settings.app_name);
    info!(
        app = %info.app,
        version = %info.version,
        revision = %info.revision,
        build = %info.build_stamp,
        repository = %info.repository,
        "starting"
    );
    if !env_loaded {
        info!(path = %args.env_file.display(), "no env file loaded");
    }

    let db = Database::connect(&settings.db).await?;
    if settings.db.run_migrations {
        cloudk8s_core::migrate::migrate(db.pool()).await?;
    }
    let metadata = MetadataService::new(db.clone());
    metadata.create_metadata_table().await?;
    metadata
        .set_service_version(&info.app, &info.version)
        .await?;

    let admin = AdminAccount::from_config(&settings.admin);
    let (authenticator, store) = match settings.auth.mode {
        AuthMode::Admin => {
            let authenticator: Arc<dyn Authenticator> = Arc::new(AdminAuthenticator::new(admin));
            (authenticator, None)
        }
        AuthMode::Employee => {
            let store: Arc<dyn CredentialStore> =
                Arc::new(PgEmployeeStore::new(db.pool().clone()).await?);
            let authenticator: Arc<dyn Authenticator> = Arc::new(StoreAuthenticator::new(
                admin,
                store.clone(),
                settings.auth.admin_ids.clone(),
            ));
            (authenticator, Some(store))
        }
    };
    info!(mode = %settings.auth.mode, "authenticator selected");

    let health = Arc::new(db.clone());
    let state = AppState {
        config: Arc::new(ApiConfig::from_settings(&settings, info)),
        jwt: Arc::new(JwtChecker::new(&settings.jwt)),
        authenticator,
        store,
        readiness: health.clone(),
        health,
    };
    let app = router(state);

    let addr = settings.http.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await;

    db.close().await;
    served?;
    info!("server stopped");
    Ok(())
}

fn app_info(app: &str) -> AppInfo {
    AppInfo {
        app: app.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_stamp: option_env!("CLOUDK8S_BUILD_STAMP")
            .unwrap_or("unknown")
            .to_string(),
        repository: env!("CARGO_PKG_REPOSITORY").to_string(),
        revision: option_env!("CLOUDK8S_REVISION")
            .unwrap_or("unknown")
            .to_string(),
    }
}

/// Cancels `token` on the first SIGINT or SIGTERM.
async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "unable to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
    token.cancel();
}
