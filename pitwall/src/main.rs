//! Pitwall Server Entry Point

use clap::Parser;
use pitwall::cli::{Cli, Commands};
use pitwall::common::error::PitwallError;
use pitwall::config::{DatabaseConfig, ServerConfig};
use pitwall::{api, auth, db, logging, AppState};
use sqlx::SqlitePool;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match cli.command {
        Some(Commands::Migrate) => migrate().await,
        Some(Commands::Serve(args)) => run_server(ServerConfig::from(args)).await,
        None => run_server(ServerConfig::from_env()).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn init_db() -> Result<SqlitePool, PitwallError> {
    let config = DatabaseConfig::from_env();
    info!(max_connections = config.max_connections, "Connecting to database");
    let pool = db::init_pool(&config).await?;
    db::run_migrations(&pool).await?;
    Ok(pool)
}

async fn migrate() -> Result<(), PitwallError> {
    let pool = init_db().await?;
    pool.close().await;
    Ok(())
}

async fn run_server(config: ServerConfig) -> Result<(), PitwallError> {
    info!("Pitwall v{}", env!("CARGO_PKG_VERSION"));

    let pool = init_db().await?;
    if let Some(username) = auth::bootstrap::ensure_admin_from_env(&pool).await? {
        info!(username = %username, "Admin account ready");
    }

    let app = api::create_app(AppState::new(pool.clone()));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| PitwallError::Internal(format!("Failed to bind to {}: {}", bind_addr, e)))?;
    info!("Pitwall server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PitwallError::Internal(format!("Server error: {}", e)))?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// シャットダウンシグナルを待機
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}
