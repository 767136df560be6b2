// ユーザー操作とログイン履歴

use crate::common::auth::{User, UserType};
use crate::common::error::PitwallError;
use sqlx::SqlitePool;

/// データベース行からの読み取り用構造体
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    user_type: String,
    name: String,
    constructor_id: Option<i64>,
    driver_id: Option<i64>,
}

impl UserRow {
    fn into_user(self) -> Result<User, PitwallError> {
        let user_type = self
            .user_type
            .parse::<UserType>()
            .map_err(PitwallError::Database)?;
        Ok(User {
            id: self.id,
            username: self.username,
            password: self.password,
            user_type,
            name: self.name,
            constructor_id: self.constructor_id,
            driver_id: self.driver_id,
        })
    }
}

/// ユーザー作成パラメータ
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    /// ユーザー名
    pub username: &'a str,
    /// パスワード（bcryptハッシュ推奨）
    pub password: &'a str,
    /// ユーザー種別
    pub user_type: UserType,
    /// 表示名
    pub name: &'a str,
    /// 所属コンストラクターID
    pub constructor_id: Option<i64>,
    /// ドライバーID
    pub driver_id: Option<i64>,
}

/// ユーザーを作成
///
/// # Returns
/// * `Ok(i64)` - 作成されたユーザーID
/// * `Err(PitwallError)` - 作成失敗（ユーザー名重複は `Conflict`）
pub async fn create(pool: &SqlitePool, user: &NewUser<'_>) -> Result<i64, PitwallError> {
    let result = sqlx::query(
        "INSERT INTO users (username, password, user_type, name, constructor_id, driver_id)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user.username)
    .bind(user.password)
    .bind(user.user_type.as_str())
    .bind(user.name)
    .bind(user.constructor_id)
    .bind(user.driver_id)
    .execute(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            PitwallError::Conflict(format!("Username '{}' already exists", user.username))
        } else {
            PitwallError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(result.last_insert_rowid())
}

/// ユーザー名でユーザーを検索
///
/// # Returns
/// * `Ok(Some(User))` - ユーザーが見つかった
/// * `Ok(None)` - ユーザーが見つからなかった
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, PitwallError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password, user_type, name, constructor_id, driver_id
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| PitwallError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::into_user).transpose()
}

/// ログインを記録する
///
/// users_log への追記と last_login の更新を1トランザクションで行う。
pub async fn record_login(
    pool: &SqlitePool,
    user_id: i64,
    ip_address: &str,
) -> Result<(), PitwallError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to begin transaction: {}", e)))?;

    sqlx::query("INSERT INTO users_log (user_id, action, ip_address) VALUES (?, 'login', ?)")
        .bind(user_id)
        .bind(ip_address)
        .execute(&mut *tx)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to insert users_log: {}", e)))?;

    sqlx::query("UPDATE users SET last_login = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to update last login: {}", e)))?;

    tx.commit()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to commit transaction: {}", e)))?;

    Ok(())
}
