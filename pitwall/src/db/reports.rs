//! レポート集計
//!
//! 各レポートの行データを返す。タイトルと説明は `api::reports` が付ける。

use crate::common::error::PitwallError;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// 空港検索の半径（km）
pub const AIRPORT_RADIUS_KM: f64 = 100.0;

/// 地球の平均半径（km）
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// 緯度1度あたりの距離（km）
const KM_PER_LAT_DEGREE: f64 = 111.32;

/// ステータス別の結果件数
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    /// ステータス名
    pub status: String,
    /// 件数
    pub count: i64,
}

/// サーキット別の周回数統計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapStats {
    /// 最小周回数
    pub min: Option<i64>,
    /// 平均周回数
    pub avg: Option<f64>,
    /// 最大周回数
    pub max: Option<i64>,
}

/// コンストラクターのサーキット別成績
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitLaps {
    /// サーキット名
    pub name: String,
    /// 出走レース数
    pub races: i64,
    /// 周回数統計
    pub lap_stats: LapStats,
}

/// コンストラクター別のドライバー数・レース数・優勝数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorRaces {
    /// 名称
    pub name: String,
    /// 在籍ドライバー数
    pub drivers: i64,
    /// 出走レース数
    pub races: i64,
    /// 優勝回数
    pub wins: i64,
    /// サーキット別の内訳
    pub circuits: Vec<CircuitLaps>,
}

#[derive(Debug, sqlx::FromRow)]
struct ConstructorRacesRow {
    id: i64,
    name: String,
    drivers: i64,
    races: i64,
    wins: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CircuitLapsRow {
    constructor_id: i64,
    name: String,
    races: i64,
    min_laps: Option<i64>,
    avg_laps: Option<f64>,
    max_laps: Option<i64>,
}

/// ドライバーの優勝数とポイント
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DriverWins {
    /// フルネーム
    pub name: String,
    /// 優勝回数
    pub wins: i64,
    /// ポイント
    pub points: f64,
}

/// 年ごとのポイント
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct YearPoints {
    /// 年
    pub year: i64,
    /// ポイント
    pub points: f64,
}

/// 都市からの距離付き空港
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportDistance {
    /// 空港名
    pub name: String,
    /// 所在都市
    pub city: Option<String>,
    /// IATAコード
    pub iata: Option<String>,
    /// 種別（large_airport など）
    #[serde(rename = "type")]
    pub airport_type: String,
    /// 距離（km）
    pub distance: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct AirportRow {
    name: String,
    city: Option<String>,
    iata_code: Option<String>,
    airport_type: String,
    lat_deg: f64,
    lng_deg: f64,
}

/// 結果の絞り込み条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultScope {
    /// 全結果
    All,
    /// コンストラクターの結果
    Constructor(i64),
    /// ドライバーの結果
    Driver(i64),
}

/// ステータス別の結果件数（多い順）
pub async fn status_counts(pool: &SqlitePool, scope: ResultScope) -> Result<Vec<StatusCount>, PitwallError> {
    let (filter, id) = match scope {
        ResultScope::All => ("1 = 1", None),
        ResultScope::Constructor(id) => ("r.constructor_id = ?", Some(id)),
        ResultScope::Driver(id) => ("r.driver_id = ?", Some(id)),
    };
    let sql = format!(
        r#"
        SELECT s.status AS status, COUNT(*) AS count
        FROM results r
        JOIN status s ON r.status_id = s.id
        WHERE {}
        GROUP BY s.id
        ORDER BY count DESC, s.status
        "#,
        filter
    );

    let mut query = sqlx::query_as::<_, StatusCount>(&sql);
    if let Some(id) = id {
        query = query.bind(id);
    }
    query
        .fetch_all(pool)
        .await
        .map_err(|e| PitwallError::Database(format!("Failed to count results by status: {}", e)))
}

/// 全コンストラクターのドライバー数・レース数・優勝数とサーキット別内訳
pub async fn constructors_races(pool: &SqlitePool) -> Result<Vec<ConstructorRaces>, PitwallError> {
    let rows = sqlx::query_as::<_, ConstructorRacesRow>(
        r#"
        SELECT
            c.id,
            c.name,
            (SELECT COUNT(DISTINCT driver_id) FROM results WHERE constructor_id = c.id) AS drivers,
            COUNT(DISTINCT r.race_id) AS races,
            COALESCE(SUM(CASE WHEN r.position = 1 THEN 1 ELSE 0 END), 0) AS wins
        FROM constructors c
        LEFT JOIN results r ON r.constructor_id = c.id
        GROUP BY c.id
        ORDER BY c.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let circuit_rows = sqlx::query_as::<_, CircuitLapsRow>(
        r#"
        SELECT
            r.constructor_id,
            ci.name,
            COUNT(DISTINCT ra.id) AS races,
            MIN(r.laps) AS min_laps,
            AVG(r.laps) AS avg_laps,
            MAX(r.laps) AS max_laps
        FROM results r
        JOIN races ra ON r.race_id = ra.id
        JOIN circuits ci ON ra.circuit_id = ci.id
        GROUP BY r.constructor_id, ci.id
        ORDER BY ci.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut circuits: HashMap<i64, Vec<CircuitLaps>> = HashMap::new();
    for row in circuit_rows {
        circuits.entry(row.constructor_id).or_default().push(CircuitLaps {
            name: row.name,
            races: row.races,
            lap_stats: LapStats {
                min: row.min_laps,
                avg: row.avg_laps,
                max: row.max_laps,
            },
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| ConstructorRaces {
            circuits: circuits.remove(&row.id).unwrap_or_default(),
            name: row.name,
            drivers: row.drivers,
            races: row.races,
            wins: row.wins,
        })
        .collect())
}

/// コンストラクター所属ドライバーの優勝数（優勝数・ポイントの多い順）
pub async fn driver_wins(pool: &SqlitePool, constructor_id: i64) -> Result<Vec<DriverWins>, PitwallError> {
    let rows = sqlx::query_as::<_, DriverWins>(
        r#"
        SELECT
            d.forename || ' ' || d.surname AS name,
            SUM(CASE WHEN r.position = 1 THEN 1 ELSE 0 END) AS wins,
            CAST(SUM(r.points) AS REAL) AS points
        FROM drivers d
        JOIN results r ON r.driver_id = d.id
        WHERE r.constructor_id = ?
        GROUP BY d.id
        ORDER BY wins DESC, points DESC
        "#,
    )
    .bind(constructor_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// ドライバーの年ごとのポイント
pub async fn points_by_year(pool: &SqlitePool, driver_id: i64) -> Result<Vec<YearPoints>, PitwallError> {
    let rows = sqlx::query_as::<_, YearPoints>(
        r#"
        SELECT ra.year AS year, CAST(SUM(r.points) AS REAL) AS points
        FROM results r
        JOIN races ra ON r.race_id = ra.id
        WHERE r.driver_id = ?
        GROUP BY ra.year
        ORDER BY ra.year
        "#,
    )
    .bind(driver_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// 都市から半径100km以内の空港を近い順に返す
///
/// 都市の座標は geocities15k から取得する。緯度で候補を絞ってから
/// ハーバサイン距離で判定する。
///
/// # Returns
/// * `Err(PitwallError::NotFound)` - 都市が見つからない
pub async fn airports_near(pool: &SqlitePool, city: &str) -> Result<Vec<AirportDistance>, PitwallError> {
    let (city_lat, city_lng): (f64, f64) =
        sqlx::query_as("SELECT lat_deg, lng_deg FROM geocities15k WHERE name = ? ORDER BY id LIMIT 1")
            .bind(city)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| PitwallError::NotFound(format!("City '{}' not found", city)))?;

    let lat_margin = AIRPORT_RADIUS_KM / KM_PER_LAT_DEGREE;
    let candidates = sqlx::query_as::<_, AirportRow>(
        r#"
        SELECT name, city, iata_code, type AS airport_type, lat_deg, lng_deg
        FROM airports
        WHERE lat_deg BETWEEN ? AND ?
        "#,
    )
    .bind(city_lat - lat_margin)
    .bind(city_lat + lat_margin)
    .fetch_all(pool)
    .await?;

    let mut airports: Vec<AirportDistance> = candidates
        .into_iter()
        .filter_map(|row| {
            let distance = haversine_km(city_lat, city_lng, row.lat_deg, row.lng_deg);
            (distance <= AIRPORT_RADIUS_KM).then(|| AirportDistance {
                name: row.name,
                city: row.city,
                iata: row.iata_code.filter(|code| !code.is_empty()),
                airport_type: row.airport_type,
                distance,
            })
        })
        .collect();
    airports.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    tracing::debug!(city, found = airports.len(), "Airports near city");
    Ok(airports)
}

/// 2点間の大円距離（km）
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
