//! ダッシュボードAPI
//!
//! 管理者・チーム・ドライバーの各ダッシュボード向け集計

use super::error::AppError;
use super::params::{
    current_year, required_id, required_text, year_or, ConstructorIdQuery, DriverIdQuery, YearQuery,
};
use crate::common::error::PitwallError;
use crate::common::types::ApiResponse;
use crate::db::dashboard::{AdminDashboard, DriverDashboard, TeamDashboard};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// アクティブドライバー数のクエリ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDriversQuery {
    /// コンストラクター名（大文字小文字を区別しない）
    pub constructor_name: Option<String>,
    /// 対象年（省略時は前年）
    pub year: Option<String>,
}

/// アクティブドライバー数
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDriversResponse {
    /// 対象年に結果を残したドライバー数
    pub active_drivers: i64,
}

/// ドライバーの所属チームのクエリ
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTeamQuery {
    /// フルネーム（"名 姓"）
    pub driver_name: Option<String>,
    /// 対象年（省略時は前年）
    pub year: Option<String>,
}

/// ドライバーの所属チーム
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTeamResponse {
    /// コンストラクター名
    pub team_name: String,
}

/// GET /api/dashboard/admin - 管理者ダッシュボード
///
/// `year` を省略した場合は今年を集計する。
pub async fn admin(
    State(state): State<AppState>,
    query: Result<Query<YearQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<AdminDashboard>>, AppError> {
    let Query(query) = query?;
    let year = year_or(query.year.as_deref(), current_year())?;
    let today = Utc::now().date_naive();
    let dashboard = crate::db::dashboard::admin(&state.db_pool, year, today).await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}

/// GET /api/dashboard/team - チームダッシュボード
pub async fn team(
    State(state): State<AppState>,
    query: Result<Query<ConstructorIdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TeamDashboard>>, AppError> {
    let Query(query) = query?;
    let constructor_id = required_id(query.constructor_id.as_deref(), "constructorId")?;
    let dashboard = crate::db::dashboard::team(&state.db_pool, constructor_id).await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}

/// GET /api/dashboard/team/active-drivers - 前年のアクティブドライバー数
pub async fn team_active_drivers(
    State(state): State<AppState>,
    query: Result<Query<ActiveDriversQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ActiveDriversResponse>>, AppError> {
    let Query(query) = query?;
    let constructor_name = required_text(query.constructor_name.as_deref(), "constructorName")?;
    let year = year_or(query.year.as_deref(), current_year() - 1)?;

    let constructor_id = crate::db::constructors::find_id_by_name(&state.db_pool, constructor_name)
        .await?
        .ok_or_else(|| PitwallError::NotFound("Constructor not found".to_string()))?;
    let active_drivers =
        crate::db::dashboard::active_drivers(&state.db_pool, constructor_id, year).await?;

    Ok(Json(ApiResponse::ok(ActiveDriversResponse { active_drivers })))
}

/// GET /api/dashboard/driver - ドライバーダッシュボード
pub async fn driver(
    State(state): State<AppState>,
    query: Result<Query<DriverIdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DriverDashboard>>, AppError> {
    let Query(query) = query?;
    let driver_id = required_id(query.driver_id.as_deref(), "driverId")?;
    let dashboard = crate::db::dashboard::driver(&state.db_pool, driver_id).await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}

/// GET /api/dashboard/driver/team - ドライバーの前年の所属チーム
pub async fn driver_team(
    State(state): State<AppState>,
    query: Result<Query<DriverTeamQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DriverTeamResponse>>, AppError> {
    let Query(query) = query?;
    let driver_name = required_text(query.driver_name.as_deref(), "driverName")?;
    let year = year_or(query.year.as_deref(), current_year() - 1)?;

    let team_name = crate::db::dashboard::driver_team(&state.db_pool, driver_name, year)
        .await?
        .ok_or_else(|| PitwallError::NotFound("Driver not found or without a team".to_string()))?;

    Ok(Json(ApiResponse::ok(DriverTeamResponse { team_name })))
}
