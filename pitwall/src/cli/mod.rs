//! CLI module for pitwall
//!
//! Provides the command-line interface for the statistics server.

pub mod serve;

use clap::{Parser, Subcommand};

/// Pitwall - motorsport statistics dashboards and reports over a JSON API
#[derive(Parser, Debug)]
#[command(name = "pitwall")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    PITWALL_HOST                Bind address (default: 0.0.0.0)
    PITWALL_PORT                Listen port (default: 3000)
    PITWALL_LOG_LEVEL           Log level (default: info)
    PITWALL_LOG_FORMAT          Log format: text or json (default: text)
    PITWALL_DATABASE_URL        Database URL (default: sqlite:~/.pitwall/pitwall.db)
    PITWALL_DB_MAX_CONNECTIONS  Connection pool size (default: 10)
    PITWALL_MAX_UPLOAD_BYTES    Maximum CSV upload size (default: 5 MiB)
    PITWALL_ADMIN_USERNAME      Initial admin username (default: admin)
    PITWALL_ADMIN_PASSWORD      Initial admin password (admin is created when set)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve(serve::ServeArgs),
    /// Apply database migrations and exit
    Migrate,
}
