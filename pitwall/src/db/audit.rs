//! 操作ログ（admin_log / team_log）
//!
//! 書き込み系の処理と同じトランザクション内で呼び出す。

use crate::common::error::PitwallError;
use serde_json::Value;
use sqlx::SqliteConnection;

/// admin_log に操作を記録する
pub async fn log_admin_action(
    conn: &mut SqliteConnection,
    action: &str,
    table_name: &str,
    record_id: i64,
    details: &Value,
) -> Result<(), PitwallError> {
    sqlx::query(
        "INSERT INTO admin_log (action, table_name, record_id, details) VALUES (?, ?, ?, ?)",
    )
    .bind(action)
    .bind(table_name)
    .bind(record_id)
    .bind(details.to_string())
    .execute(conn)
    .await
    .map_err(|e| PitwallError::Database(format!("Failed to insert admin_log: {}", e)))?;
    Ok(())
}

/// team_log に操作を記録する
pub async fn log_team_action(
    conn: &mut SqliteConnection,
    constructor_id: i64,
    action: &str,
    details: &Value,
) -> Result<(), PitwallError> {
    sqlx::query("INSERT INTO team_log (constructor_id, action, details) VALUES (?, ?, ?)")
        .bind(constructor_id)
        .bind(action)
        .bind(details.to_string())
        .execute(conn)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to insert team_log: {}", e)))?;
    Ok(())
}
