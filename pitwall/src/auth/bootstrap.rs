//! 初回起動時の管理者アカウント作成
//!
//! 環境変数で指定された管理者が存在しなければ作成する

use crate::auth::password::hash_password;
use crate::common::auth::UserType;
use crate::common::error::PitwallError;
use crate::config::get_env_with_fallback;
use crate::db;
use sqlx::SqlitePool;

/// 環境変数から管理者を作成
///
/// # Environment Variables
/// * `PITWALL_ADMIN_USERNAME` - 管理者ユーザー名（省略時: "admin"）
/// * `PITWALL_ADMIN_PASSWORD` - 管理者パスワード（未設定なら何もしない）
///
/// # Returns
/// * `Ok(Some(username))` - 管理者が存在する（作成済み、または既存）
/// * `Ok(None)` - パスワード未設定のためスキップ
/// * `Err(PitwallError)` - 作成失敗
pub async fn ensure_admin_from_env(pool: &SqlitePool) -> Result<Option<String>, PitwallError> {
    let password = match get_env_with_fallback("PITWALL_ADMIN_PASSWORD", "ADMIN_PASSWORD") {
        Some(p) if !p.is_empty() => p,
        _ => {
            tracing::debug!("PITWALL_ADMIN_PASSWORD not set, skipping admin creation");
            return Ok(None);
        }
    };
    let username = get_env_with_fallback("PITWALL_ADMIN_USERNAME", "ADMIN_USERNAME")
        .unwrap_or_else(|| "admin".to_string());

    if db::users::find_by_username(pool, &username).await?.is_some() {
        tracing::info!("Admin user {} already exists, skipping creation", username);
        return Ok(Some(username));
    }

    let password_hash = hash_password(&password)?;
    db::users::create(
        pool,
        &db::users::NewUser {
            username: &username,
            password: &password_hash,
            user_type: UserType::Admin,
            name: "Administrator",
            constructor_id: None,
            driver_id: None,
        },
    )
    .await?;

    tracing::info!("Created admin user from env: username={}", username);
    Ok(Some(username))
}
