//! serve サブコマンド
//!
//! HTTPサーバーを起動します。

use crate::config::ServerConfig;
use clap::Args;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, default_value = "3000", env = "PITWALL_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "PITWALL_HOST")]
    pub host: String,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        ServerConfig::from_args(args.host, args.port)
    }
}
