//! 管理者アクションAPI
//!
//! コンストラクター・ドライバーの登録とコンストラクター一覧

use super::error::AppError;
use super::params::{optional_int, required_text};
use crate::common::error::PitwallError;
use crate::common::types::ApiResponse;
use crate::db::constructors::{ConstructorSummary, NewConstructor};
use crate::db::drivers::{Association, NewDriver};
use crate::import::validate_dob;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// コンストラクター登録リクエスト
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConstructorRequest {
    /// 一意な参照キー
    #[serde(default)]
    pub constructor_ref: Option<String>,
    /// 名称
    #[serde(default)]
    pub name: Option<String>,
    /// 国籍
    #[serde(default)]
    pub nationality: Option<String>,
    /// URL
    #[serde(default)]
    pub url: Option<String>,
}

/// コンストラクター登録レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConstructorResponse {
    /// 作成されたID
    pub constructor_id: i64,
}

/// ドライバー登録リクエスト
///
/// 数値項目はフォームから文字列で届くことがあるため `Value` で受ける。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    /// 一意な参照キー
    #[serde(default)]
    pub driver_ref: Option<String>,
    /// カーナンバー
    #[serde(default)]
    pub number: Option<Value>,
    /// 3文字コード
    #[serde(default)]
    pub code: Option<String>,
    /// 名
    #[serde(default)]
    pub forename: Option<String>,
    /// 姓
    #[serde(default)]
    pub surname: Option<String>,
    /// 生年月日（YYYY-MM-DD）
    #[serde(default)]
    pub dob: Option<String>,
    /// 国籍
    #[serde(default)]
    pub nationality: Option<String>,
    /// 所属させるコンストラクター
    #[serde(default)]
    pub constructor_id: Option<Value>,
    /// 所属年
    #[serde(default)]
    pub year: Option<Value>,
}

/// ドライバー登録レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverResponse {
    /// 作成されたID
    pub driver_id: i64,
}

/// コンストラクター一覧レスポンス
#[derive(Debug, Serialize)]
pub struct ConstructorListResponse {
    /// 名前順のコンストラクター
    pub constructors: Vec<ConstructorSummary>,
}

/// POST /api/actions/admin/create-constructor - コンストラクター登録
pub async fn create_constructor(
    State(state): State<AppState>,
    payload: Result<Json<CreateConstructorRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CreateConstructorResponse>>, AppError> {
    let Json(request) = payload?;
    let constructor_ref = required_text(request.constructor_ref.as_deref(), "constructorRef")?;
    let name = required_text(request.name.as_deref(), "name")?;

    let constructor_id = crate::db::constructors::create(
        &state.db_pool,
        &NewConstructor {
            constructor_ref,
            name,
            nationality: non_empty(&request.nationality),
            url: non_empty(&request.url),
        },
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        CreateConstructorResponse { constructor_id },
        "Constructor created successfully",
    )))
}

/// POST /api/actions/admin/create-driver - ドライバー登録
///
/// `constructorId` と `year` が両方指定された場合は所属も登録する。
pub async fn create_driver(
    State(state): State<AppState>,
    payload: Result<Json<CreateDriverRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CreateDriverResponse>>, AppError> {
    let Json(request) = payload?;
    let driver_ref = required_text(request.driver_ref.as_deref(), "driverRef")?;
    let forename = required_text(request.forename.as_deref(), "forename")?;
    let surname = required_text(request.surname.as_deref(), "surname")?;
    let dob = non_empty(&request.dob);
    if let Some(dob) = dob {
        validate_dob(dob).map_err(PitwallError::Validation)?;
    }
    let number = optional_int(request.number.as_ref(), "number")?;

    let constructor_id = optional_int(request.constructor_id.as_ref(), "constructorId")?;
    let year = optional_int(request.year.as_ref(), "year")?;
    let association = match (constructor_id, year) {
        (Some(constructor_id), Some(year)) => Some(Association {
            constructor_id,
            year: i32::try_from(year)
                .map_err(|_| PitwallError::Validation("year is out of range".to_string()))?,
        }),
        _ => None,
    };

    let driver_id = crate::db::drivers::create(
        &state.db_pool,
        &NewDriver {
            driver_ref,
            number,
            code: non_empty(&request.code),
            forename,
            surname,
            dob,
            nationality: non_empty(&request.nationality),
        },
        association,
    )
    .await?;

    Ok(Json(ApiResponse::with_message(
        CreateDriverResponse { driver_id },
        "Driver created successfully",
    )))
}

/// GET /api/actions/admin/get-constructors - コンストラクター一覧
pub async fn list_constructors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ConstructorListResponse>>, AppError> {
    let constructors = crate::db::constructors::list(&state.db_pool).await?;
    Ok(Json(ApiResponse::ok(ConstructorListResponse { constructors })))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
