//! チームアクションAPI
//!
//! ドライバー検索とCSVによるドライバー一括登録

use super::error::AppError;
use super::params::{current_year, required_id};
use crate::common::error::PitwallError;
use crate::common::types::ApiResponse;
use crate::db::drivers::DriverMatch;
use crate::import::{parse_driver_csv, ImportRowError};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// ドライバー検索クエリ
#[derive(Debug, Default, Deserialize)]
pub struct SearchDriverQuery {
    /// 名前（部分一致）
    pub name: Option<String>,
}

/// ドライバー検索レスポンス
#[derive(Debug, Serialize)]
pub struct SearchDriverResponse {
    /// 一致したドライバー（最大10件）
    pub drivers: Vec<DriverMatch>,
}

/// インポート結果レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDriversResponse {
    /// 新規登録した件数
    pub count: usize,
    /// 既に登録済みだった件数
    pub existing_count: usize,
    /// 取り込めなかった行
    pub errors: Vec<ImportRowError>,
}

/// GET /api/actions/team/search-driver - ドライバー検索
pub async fn search_driver(
    State(state): State<AppState>,
    query: Result<Query<SearchDriverQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<SearchDriverResponse>>, AppError> {
    let Query(query) = query?;
    let name = query.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Ok(Json(ApiResponse::ok(SearchDriverResponse { drivers: vec![] })));
    }

    let drivers = crate::db::drivers::search(&state.db_pool, name).await?;
    Ok(Json(ApiResponse::ok(SearchDriverResponse { drivers })))
}

/// POST /api/actions/team/import-drivers - CSVからドライバーを一括登録
///
/// multipartの `file`（CSV）と `constructorId` を受け取る。
///
/// # Returns
/// * `200 OK` - 取り込み完了（新規件数・既存件数・エラー行）
/// * `400 Bad Request` - 項目不足、CSV不正、データ行なし
/// * `404 Not Found` - コンストラクターが存在しない
/// * `500 Internal Server Error` - DBエラー（全件ロールバック）
pub async fn import_drivers(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<ImportDriversResponse>>, AppError> {
    let mut multipart = multipart?;
    let mut file_data: Option<Vec<u8>> = None;
    let mut constructor_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => file_data = Some(field.bytes().await?.to_vec()),
            "constructorId" => constructor_id = Some(field.text().await?),
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown multipart field");
            }
        }
    }

    let (Some(file_data), Some(constructor_id)) = (file_data, constructor_id) else {
        return Err(PitwallError::Validation(
            "File and constructorId are required".to_string(),
        )
        .into());
    };
    let constructor_id = required_id(Some(&constructor_id), "constructorId")?;

    let parsed = parse_driver_csv(&file_data)?;
    let outcome =
        crate::db::drivers::import_drivers(&state.db_pool, constructor_id, &parsed, current_year())
            .await?;

    let message = format!(
        "{} drivers imported, {} already registered, {} errors",
        outcome.count,
        outcome.existing_count,
        parsed.errors.len()
    );
    Ok(Json(ApiResponse::with_message(
        ImportDriversResponse {
            count: outcome.count,
            existing_count: outcome.existing_count,
            errors: parsed.errors,
        },
        message,
    )))
}
