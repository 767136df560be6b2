// ドライバーの登録・検索・CSVインポート

use crate::common::error::PitwallError;
use crate::db::{audit, constructors, contains_pattern, is_unique_violation};
use crate::import::ParsedDrivers;
use serde::Serialize;
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};

/// 検索結果の最大件数
pub const SEARCH_LIMIT: i64 = 10;

/// ドライバー作成パラメータ
#[derive(Debug, Clone)]
pub struct NewDriver<'a> {
    /// 一意な参照キー
    pub driver_ref: &'a str,
    /// カーナンバー
    pub number: Option<i64>,
    /// 3文字コード
    pub code: Option<&'a str>,
    /// 名
    pub forename: &'a str,
    /// 姓
    pub surname: &'a str,
    /// 生年月日（YYYY-MM-DD）
    pub dob: Option<&'a str>,
    /// 国籍
    pub nationality: Option<&'a str>,
}

/// ドライバーとコンストラクターの所属（年単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Association {
    /// コンストラクターID
    pub constructor_id: i64,
    /// シーズン
    pub year: i32,
}

/// 検索結果
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DriverMatch {
    /// ドライバーID
    pub id: i64,
    /// フルネーム
    pub name: String,
    /// 国籍
    pub nationality: Option<String>,
    /// 生年月日
    pub dob: Option<String>,
}

/// インポート結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// 新規登録した件数
    pub count: usize,
    /// 既存だった件数（所属のみ追加）
    pub existing_count: usize,
}

/// ドライバーを作成し admin_log に記録する
///
/// `association` が指定された場合は同じトランザクションで所属も登録する。
///
/// # Returns
/// * `Ok(i64)` - 作成されたドライバーID
/// * `Err(PitwallError::Conflict)` - 参照キーが既に存在する
/// * `Err(PitwallError::NotFound)` - 所属先のコンストラクターが存在しない
pub async fn create(
    pool: &SqlitePool,
    driver: &NewDriver<'_>,
    association: Option<Association>,
) -> Result<i64, PitwallError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to begin transaction: {}", e)))?;

    if find_id_by_ref(&mut tx, driver.driver_ref).await?.is_some() {
        return Err(PitwallError::Conflict(
            "Driver reference already exists".to_string(),
        ));
    }

    let driver_id = insert(
        &mut tx,
        driver.driver_ref,
        driver.number,
        driver.code,
        driver.forename,
        driver.surname,
        driver.dob,
        driver.nationality,
    )
    .await?;

    audit::log_admin_action(
        &mut tx,
        "create",
        "drivers",
        driver_id,
        &json!({
            "driverRef": driver.driver_ref,
            "number": driver.number,
            "code": driver.code,
            "forename": driver.forename,
            "surname": driver.surname,
            "nationality": driver.nationality,
        }),
    )
    .await?;

    if let Some(association) = association {
        if !constructors::exists(&mut tx, association.constructor_id).await? {
            return Err(PitwallError::NotFound("Constructor not found".to_string()));
        }
        associate(&mut tx, driver_id, association.constructor_id, association.year).await?;
    }

    tx.commit()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to commit transaction: {}", e)))?;

    tracing::info!(driver_id, driver_ref = driver.driver_ref, "Driver created");
    Ok(driver_id)
}

/// 参照キーからIDを取得する
pub async fn find_id_by_ref(
    conn: &mut SqliteConnection,
    driver_ref: &str,
) -> Result<Option<i64>, PitwallError> {
    sqlx::query_scalar("SELECT id FROM drivers WHERE ref = ?")
        .bind(driver_ref)
        .fetch_optional(conn)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to find driver: {}", e)))
}

/// 名前の部分一致で検索する（大文字小文字を区別しない）
///
/// 名・姓・「名 姓」のいずれかに一致したものを姓・名の順で最大10件返す。
pub async fn search(pool: &SqlitePool, name: &str) -> Result<Vec<DriverMatch>, PitwallError> {
    let pattern = contains_pattern(name);
    sqlx::query_as::<_, DriverMatch>(
        r#"
        SELECT id, forename || ' ' || surname AS name, nationality, dob
        FROM drivers
        WHERE LOWER(forename) LIKE ?1 ESCAPE '\'
           OR LOWER(surname) LIKE ?1 ESCAPE '\'
           OR LOWER(forename || ' ' || surname) LIKE ?1 ESCAPE '\'
        ORDER BY surname, forename
        LIMIT ?2
        "#,
    )
    .bind(pattern)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await
    .map_err(|e| PitwallError::Database(format!("Failed to search drivers: {}", e)))
}

/// IDからフルネームを取得する
pub async fn name_by_id(pool: &SqlitePool, driver_id: i64) -> Result<Option<String>, PitwallError> {
    sqlx::query_scalar("SELECT forename || ' ' || surname FROM drivers WHERE id = ?")
        .bind(driver_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to find driver: {}", e)))
}

/// CSVから読み込んだドライバーをコンストラクターに一括登録する
///
/// 1トランザクションで実行し、途中でDBエラーが起きた場合は全件ロールバックする。
/// 参照キーが既存のドライバーは新規登録せず、所属のみ追加する。
pub async fn import_drivers(
    pool: &SqlitePool,
    constructor_id: i64,
    parsed: &ParsedDrivers,
    year: i32,
) -> Result<ImportOutcome, PitwallError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to begin transaction: {}", e)))?;

    if !constructors::exists(&mut tx, constructor_id).await? {
        return Err(PitwallError::NotFound("Constructor not found".to_string()));
    }

    let mut outcome = ImportOutcome {
        count: 0,
        existing_count: 0,
    };
    for record in &parsed.records {
        let driver_id = match find_id_by_ref(&mut tx, &record.driver_ref).await? {
            Some(id) => {
                outcome.existing_count += 1;
                id
            }
            None => {
                let id = insert(
                    &mut tx,
                    &record.driver_ref,
                    record.number,
                    record.code.as_deref(),
                    &record.forename,
                    &record.surname,
                    record.dob.as_deref(),
                    record.nationality.as_deref(),
                )
                .await?;
                outcome.count += 1;
                id
            }
        };
        associate(&mut tx, driver_id, constructor_id, year).await?;
    }

    audit::log_team_action(
        &mut tx,
        constructor_id,
        "import_drivers",
        &json!({
            "count": outcome.count,
            "existing": outcome.existing_count,
            "errors": parsed.errors.len(),
        }),
    )
    .await?;

    tx.commit()
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to commit transaction: {}", e)))?;

    tracing::info!(
        constructor_id,
        imported = outcome.count,
        existing = outcome.existing_count,
        errors = parsed.errors.len(),
        "Drivers imported"
    );
    Ok(outcome)
}

#[allow(clippy::too_many_arguments)]
async fn insert(
    conn: &mut SqliteConnection,
    driver_ref: &str,
    number: Option<i64>,
    code: Option<&str>,
    forename: &str,
    surname: &str,
    dob: Option<&str>,
    nationality: Option<&str>,
) -> Result<i64, PitwallError> {
    let result = sqlx::query(
        "INSERT INTO drivers (ref, number, code, forename, surname, dob, nationality)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(driver_ref)
    .bind(number)
    .bind(code)
    .bind(forename)
    .bind(surname)
    .bind(dob)
    .bind(nationality)
    .execute(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            PitwallError::Conflict("Driver reference already exists".to_string())
        } else {
            PitwallError::Database(format!("Failed to insert driver: {}", e))
        }
    })?;
    Ok(result.last_insert_rowid())
}

async fn associate(
    conn: &mut SqliteConnection,
    driver_id: i64,
    constructor_id: i64,
    year: i32,
) -> Result<(), PitwallError> {
    sqlx::query(
        "INSERT INTO driver_constructor (driver_id, constructor_id, year) VALUES (?, ?, ?)
         ON CONFLICT (driver_id, constructor_id, year) DO NOTHING",
    )
    .bind(driver_id)
    .bind(constructor_id)
    .bind(year)
    .execute(conn)
    .await
    .map_err(|e| PitwallError::Database(format!("Failed to associate driver: {}", e)))?;
    Ok(())
}
