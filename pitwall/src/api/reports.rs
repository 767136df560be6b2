//! レポートAPI
//!
//! すべて `{title, description, rows}` 形式で返す。

use super::error::AppError;
use super::params::{required_id, required_text, ConstructorIdQuery, DriverIdQuery};
use crate::common::types::{ApiResponse, Report};
use crate::db::reports::{
    AirportDistance, ConstructorRaces, DriverWins, ResultScope, StatusCount, YearPoints,
    AIRPORT_RADIUS_KM,
};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

/// コンストラクター名が取れない場合の表示名
const CONSTRUCTOR_FALLBACK: &str = "Constructor";

/// ドライバー名が取れない場合の表示名
const DRIVER_FALLBACK: &str = "Driver";

type ReportResponse<T> = Result<Json<ApiResponse<Report<T>>>, AppError>;

/// 空港レポートのクエリ
#[derive(Debug, Default, Deserialize)]
pub struct AirportsQuery {
    /// 都市名（geocities15k.name）
    pub city: Option<String>,
}

fn report<T>(title: impl Into<String>, description: impl Into<String>, rows: Vec<T>) -> Json<ApiResponse<Report<T>>> {
    Json(ApiResponse::ok(Report {
        title: title.into(),
        description: description.into(),
        rows,
    }))
}

/// GET /api/reports/admin/status-results - ステータス別の結果件数
pub async fn admin_status_results(State(state): State<AppState>) -> ReportResponse<StatusCount> {
    let rows = crate::db::reports::status_counts(&state.db_pool, ResultScope::All).await?;
    Ok(report(
        "Results by status",
        "Number of results for each status, with the status name and its count.",
        rows,
    ))
}

/// GET /api/reports/admin/constructors-races - コンストラクター別のレース集計
pub async fn admin_constructors_races(
    State(state): State<AppState>,
) -> ReportResponse<ConstructorRaces> {
    let rows = crate::db::reports::constructors_races(&state.db_pool).await?;
    Ok(report(
        "Constructors and races",
        "All registered constructors with their number of drivers, races and wins, broken down by circuit.",
        rows,
    ))
}

/// GET /api/reports/admin/airports - 都市周辺の空港
pub async fn admin_airports(
    State(state): State<AppState>,
    query: Result<Query<AirportsQuery>, QueryRejection>,
) -> ReportResponse<AirportDistance> {
    let Query(query) = query?;
    let city = required_text(query.city.as_deref(), "city")?;
    let rows = crate::db::reports::airports_near(&state.db_pool, city).await?;
    Ok(report(
        format!("Airports near {}", city),
        format!("Airports up to {} km from {}.", AIRPORT_RADIUS_KM, city),
        rows,
    ))
}

/// GET /api/reports/team/status-results - コンストラクターのステータス別件数
pub async fn team_status_results(
    State(state): State<AppState>,
    query: Result<Query<ConstructorIdQuery>, QueryRejection>,
) -> ReportResponse<StatusCount> {
    let Query(query) = query?;
    let constructor_id = required_id(query.constructor_id.as_deref(), "constructorId")?;
    let rows =
        crate::db::reports::status_counts(&state.db_pool, ResultScope::Constructor(constructor_id))
            .await?;
    let name = constructor_name(&state, constructor_id).await?;
    Ok(report(
        format!("Results by status - {}", name),
        "Number of results for each status, limited to the constructor.",
        rows,
    ))
}

/// GET /api/reports/team/drivers-wins - コンストラクター所属ドライバーの優勝数
pub async fn team_drivers_wins(
    State(state): State<AppState>,
    query: Result<Query<ConstructorIdQuery>, QueryRejection>,
) -> ReportResponse<DriverWins> {
    let Query(query) = query?;
    let constructor_id = required_id(query.constructor_id.as_deref(), "constructorId")?;
    let rows = crate::db::reports::driver_wins(&state.db_pool, constructor_id).await?;
    let name = constructor_name(&state, constructor_id).await?;
    Ok(report(
        format!("Drivers of {}", name),
        "Drivers of the constructor with their number of wins.",
        rows,
    ))
}

/// GET /api/reports/driver/status-results - ドライバーのステータス別件数
pub async fn driver_status_results(
    State(state): State<AppState>,
    query: Result<Query<DriverIdQuery>, QueryRejection>,
) -> ReportResponse<StatusCount> {
    let Query(query) = query?;
    let driver_id = required_id(query.driver_id.as_deref(), "driverId")?;
    let rows =
        crate::db::reports::status_counts(&state.db_pool, ResultScope::Driver(driver_id)).await?;
    let name = driver_name(&state, driver_id).await?;
    Ok(report(
        format!("Results by status - {}", name),
        "Number of results for each status in the races the driver took part in.",
        rows,
    ))
}

/// GET /api/reports/driver/points-by-year - ドライバーの年ごとのポイント
pub async fn driver_points_by_year(
    State(state): State<AppState>,
    query: Result<Query<DriverIdQuery>, QueryRejection>,
) -> ReportResponse<YearPoints> {
    let Query(query) = query?;
    let driver_id = required_id(query.driver_id.as_deref(), "driverId")?;
    let rows = crate::db::reports::points_by_year(&state.db_pool, driver_id).await?;
    let name = driver_name(&state, driver_id).await?;
    Ok(report(
        format!("Points by year - {}", name),
        "Total points scored in each season the driver took part in.",
        rows,
    ))
}

async fn constructor_name(state: &AppState, constructor_id: i64) -> Result<String, AppError> {
    Ok(crate::db::constructors::name_by_id(&state.db_pool, constructor_id)
        .await?
        .unwrap_or_else(|| CONSTRUCTOR_FALLBACK.to_string()))
}

async fn driver_name(state: &AppState, driver_id: i64) -> Result<String, AppError> {
    Ok(crate::db::drivers::name_by_id(&state.db_pool, driver_id)
        .await?
        .unwrap_or_else(|| DRIVER_FALLBACK.to_string()))
}
