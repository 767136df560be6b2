// コンストラクター（チーム）の登録・参照

use crate::common::error::PitwallError;
use crate::db::{audit, is_unique_violation};
use serde::Serialize;
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};

/// コンストラクター作成パラメータ
#[derive(Debug, Clone)]
pub struct NewConstructor<'a> {
    /// 一意な参照キー
    pub constructor_ref: &'a str,
    /// 名称
    pub name: &'a str,
    /// 国籍
    pub nationality: Option<&'a str>,
    /// WikipediaなどのURL
    pub url: Option<&'a str>,
}

/// 選択リスト用のコンストラクター
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ConstructorSummary {
    /// コンストラクターID
    pub id: i64,
    /// 名称
    pub name: String,
}

/// コンストラクターを作成し admin_log に記録する
///
/// 参照キーの重複確認・挿入・ログ記録を1トランザクションで行う。
///
/// # Returns
/// * `Ok(i64)` - 作成されたコンストラクターID
/// * `Err(PitwallError::Conflict)` - 参照キーが既に存在する
pub async fn create(pool: &SqlitePool, constructor: &NewConstructor<'_>) -> Result<i64, PitwallError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to begin transaction: {}", e)))?;

    if find_id_by_ref(&mut tx, constructor.constructor_ref)
        .await?
        .is_some()
    {
        return Err(PitwallError::Conflict(
            "Constructor reference already exists".to_string(),
        ));
    }

    let constructor_id = insert(&mut tx, constructor).await?;

    audit::log_admin_action(
        &mut tx,
        "create",
        "constructors",
        constructor_id,
        &json!({
            "constructorRef": constructor.constructor_ref,
            "name": constructor.name,
            "nationality": constructor.nationality,
        }),
    )
    .await?;

    tx.commit()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to commit transaction: {}", e)))?;

    tracing::info!(
        constructor_id,
        constructor_ref = constructor.constructor_ref,
        "Constructor created"
    );
    Ok(constructor_id)
}

async fn insert(
    conn: &mut SqliteConnection,
    constructor: &NewConstructor<'_>,
) -> Result<i64, PitwallError> {
    let result = sqlx::query("INSERT INTO constructors (ref, name, nationality, url) VALUES (?, ?, ?, ?)")
        .bind(constructor.constructor_ref)
        .bind(constructor.name)
        .bind(constructor.nationality)
        .bind(constructor.url)
        .execute(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PitwallError::Conflict("Constructor reference already exists".to_string())
            } else {
                PitwallError::Database(format!("Failed to insert constructor: {}", e))
            }
        })?;
    Ok(result.last_insert_rowid())
}

/// 参照キーからIDを取得する
pub async fn find_id_by_ref(
    conn: &mut SqliteConnection,
    constructor_ref: &str,
) -> Result<Option<i64>, PitwallError> {
    sqlx::query_scalar("SELECT id FROM constructors WHERE ref = ?")
        .bind(constructor_ref)
        .fetch_optional(conn)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to find constructor: {}", e)))
}

/// IDのコンストラクターが存在するか
pub async fn exists(conn: &mut SqliteConnection, constructor_id: i64) -> Result<bool, PitwallError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM constructors WHERE id = ?")
        .bind(constructor_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to find constructor: {}", e)))?;
    Ok(found.is_some())
}

/// 全コンストラクターを名前順で取得する
pub async fn list(pool: &SqlitePool) -> Result<Vec<ConstructorSummary>, PitwallError> {
    sqlx::query_as::<_, ConstructorSummary>("SELECT id, name FROM constructors ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to list constructors: {}", e)))
}

/// IDから名称を取得する
pub async fn name_by_id(pool: &SqlitePool, constructor_id: i64) -> Result<Option<String>, PitwallError> {
    sqlx::query_scalar("SELECT name FROM constructors WHERE id = ?")
        .bind(constructor_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to find constructor: {}", e)))
}

/// 名称（大文字小文字を区別しない）からIDを取得する
pub async fn find_id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<i64>, PitwallError> {
    sqlx::query_scalar("SELECT id FROM constructors WHERE LOWER(name) = LOWER(?) ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to find constructor: {}", e)))
}
