//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to legacy variable names with warning logs.

/// デフォルトの待ち受けポート
pub const DEFAULT_PORT: u16 = 3000;

/// デフォルトの最大DB接続数
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// CSVアップロードの最大ボディサイズ（バイト）
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the old (legacy) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use pitwall::config::get_env_with_fallback;
///
/// let url = get_env_with_fallback("PITWALL_DATABASE_URL", "DATABASE_URL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// HTTPサーバー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート
    pub port: u16,
}

impl ServerConfig {
    /// 環境変数から読み込む
    pub fn from_env() -> Self {
        let host = get_env_with_fallback_or("PITWALL_HOST", "HOST", "0.0.0.0");
        let port = get_env_with_fallback_parse("PITWALL_PORT", "PORT", DEFAULT_PORT);
        Self { host, port }
    }

    /// CLI引数から構築する
    pub fn from_args(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// データベース設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// sqlx接続URL（例: `sqlite:data/pitwall.db`）
    pub url: String,
    /// プールの最大接続数
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// 環境変数から読み込む
    ///
    /// `PITWALL_DATABASE_URL`（旧: `DATABASE_URL`）が未設定の場合は
    /// `~/.pitwall/pitwall.db` を使用する。
    pub fn from_env() -> Self {
        let url = get_env_with_fallback("PITWALL_DATABASE_URL", "DATABASE_URL")
            .unwrap_or_else(default_database_url);
        let max_connections = get_env_with_fallback_parse(
            "PITWALL_DB_MAX_CONNECTIONS",
            "DB_MAX_CONNECTIONS",
            DEFAULT_DB_MAX_CONNECTIONS,
        );
        Self {
            url,
            max_connections,
        }
    }
}

fn default_database_url() -> String {
    match std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        Ok(home) => format!("sqlite:{}/.pitwall/pitwall.db", home),
        Err(_) => "sqlite:pitwall.db".to_string(),
    }
}

/// CSVアップロードの最大サイズを取得
pub fn get_max_upload_bytes() -> usize {
    get_env_with_fallback_parse(
        "PITWALL_MAX_UPLOAD_BYTES",
        "MAX_UPLOAD_BYTES",
        DEFAULT_MAX_UPLOAD_BYTES,
    )
}
