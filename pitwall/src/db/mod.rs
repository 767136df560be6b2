//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化。接続プールの作成とマイグレーション、
//! 機能ごとのクエリモジュールを提供する。

use crate::common::error::PitwallError;
use crate::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Instant;

/// ユーザー管理・ログイン履歴
pub mod users;

/// コンストラクター（チーム）
pub mod constructors;

/// ドライバー（登録・検索・CSVインポート）
pub mod drivers;

/// 操作ログ（admin_log / team_log）
pub mod audit;

/// ダッシュボード集計
pub mod dashboard;

/// レポート集計
pub mod reports;

/// データベース接続プールを作成
///
/// ファイルDBの場合は親ディレクトリを作成してから接続する。
/// `sqlite::memory:` は接続ごとに別DBになるため、接続数を1に固定し
/// アイドル切断も無効にする。
pub async fn init_pool(config: &DatabaseConfig) -> Result<SqlitePool, PitwallError> {
    let in_memory = is_memory_url(&config.url);
    if !in_memory {
        ensure_parent_dir(&config.url)?;
    }

    let connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| PitwallError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new();
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(config.max_connections.max(1))
    };

    pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to connect to database: {}", e)))
}

/// マイグレーションを実行（sqlx::migrate!マクロを使用）
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), PitwallError> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// 接続確認の結果
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    /// DBの現在時刻（`CURRENT_TIMESTAMP`）
    pub timestamp: String,
    /// 往復時間（ミリ秒）
    pub latency_ms: u128,
}

/// DB接続を確認する
pub async fn ping(pool: &SqlitePool) -> Result<ConnectionStatus, PitwallError> {
    let start = Instant::now();
    let timestamp: String = sqlx::query_scalar("SELECT CURRENT_TIMESTAMP")
        .fetch_one(pool)
        .await?;
    let latency_ms = start.elapsed().as_millis();
    tracing::debug!(latency_ms, "Database ping succeeded");
    Ok(ConnectionStatus {
        timestamp,
        latency_ms,
    })
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn ensure_parent_dir(database_url: &str) -> Result<(), PitwallError> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    // `sqlite://` 形式に備えてスラッシュを除去し、クエリ部分を除外
    let normalized = path.trim_start_matches("//");
    let path_without_params = normalized.split('?').next().unwrap_or(normalized);
    if let Some(parent) = std::path::Path::new(path_without_params).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PitwallError::Internal(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// SQLiteの `LIKE` 用にワイルドカードをエスケープした部分一致パターンを作る
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped.to_lowercase())
}

/// UNIQUE制約違反かどうか
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
