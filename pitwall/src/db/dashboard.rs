//! ダッシュボード集計
//!
//! 管理者・チーム・ドライバーの各ダッシュボードが使う集計クエリ。
//! 年はすべて呼び出し側で決めてパラメータとして渡す。

use crate::common::error::PitwallError;
use crate::db::reports::{self, YearPoints};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

/// ダッシュボードの上位件数
const TOP_LIMIT: i64 = 5;

/// ポイント推移グラフに載せるコンストラクター数
const RACE_POINTS_CONSTRUCTORS: i64 = 4;

/// 管理者ダッシュボードの概要
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// 登録ドライバー数
    pub total_drivers: i64,
    /// 登録コンストラクター数
    pub total_constructors: i64,
    /// シーズン数
    pub total_seasons: i64,
    /// 対象年のレース数
    pub current_year_races: i64,
    /// 対象年の開催済みレース数
    pub completed_races: i64,
}

/// 対象年のレース
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSummary {
    /// レース名
    pub name: String,
    /// 周回数
    pub laps: Option<i64>,
    /// 最速タイム（結果が無ければ "N/A"）
    pub time: String,
    /// 開催日
    pub date: String,
    /// サーキット名
    pub circuit: String,
}

#[derive(Debug, sqlx::FromRow)]
struct RaceSummaryRow {
    name: String,
    laps: Option<i64>,
    time: Option<String>,
    date: String,
    circuit: String,
}

/// コンストラクターの年間ポイント
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ConstructorStanding {
    /// 名称
    pub name: String,
    /// ポイント
    pub points: f64,
    /// 国籍
    pub nationality: Option<String>,
}

/// ドライバーの年間ポイント
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DriverStanding {
    /// フルネーム
    pub name: String,
    /// ポイント
    pub points: f64,
    /// 所属コンストラクター
    pub constructor: String,
}

/// 管理者ダッシュボード
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    /// 概要
    pub stats: AdminStats,
    /// 対象年の最初の5レース
    pub races: Vec<RaceSummary>,
    /// ポイント上位のコンストラクター
    pub constructors: Vec<ConstructorStanding>,
    /// ポイント上位のドライバー
    pub drivers: Vec<DriverStanding>,
    /// レースごとの上位コンストラクターのポイント（`{name, <constructor>: points}`）
    pub race_points: Vec<Value>,
}

/// チームの通算成績
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    /// 名称
    pub name: String,
    /// 優勝回数
    pub total_wins: i64,
    /// 在籍ドライバー数
    pub total_drivers: i64,
    /// 参戦期間（"1950 - 2024"）
    pub period: String,
}

#[derive(Debug, sqlx::FromRow)]
struct TeamStatsRow {
    name: String,
    total_wins: i64,
    total_drivers: i64,
    first_year: i64,
    last_year: i64,
}

/// チーム所属ドライバーの成績
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TeamDriver {
    /// フルネーム
    pub name: String,
    /// 出走数
    pub races: i64,
    /// 優勝回数
    pub wins: i64,
    /// ポイント
    pub points: f64,
}

/// シーズンごとの選手権順位
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SeasonResult {
    /// 年
    pub year: i64,
    /// コンストラクター選手権順位
    pub position: i64,
    /// ポイント
    pub points: f64,
}

/// ステータス別の件数（グラフ用）
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StatusShare {
    /// ステータス名
    pub name: String,
    /// 件数
    pub value: i64,
}

/// チームダッシュボード
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamDashboard {
    /// 通算成績
    pub stats: TeamStats,
    /// 優勝回数上位のドライバー
    pub drivers: Vec<TeamDriver>,
    /// 直近5シーズンの順位
    pub results: Vec<SeasonResult>,
    /// 上位のステータス
    pub status: Vec<StatusShare>,
}

/// ドライバーの通算成績
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStats {
    /// フルネーム
    pub name: String,
    /// 優勝回数
    pub total_wins: i64,
    /// 出走数
    pub total_races: i64,
    /// 参戦期間
    pub period: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DriverStatsRow {
    name: String,
    total_wins: i64,
    total_races: i64,
    first_year: i64,
    last_year: i64,
}

/// 年ごとのキャリア成績
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CareerYear {
    /// 年
    pub year: i64,
    /// ポイント
    pub points: f64,
    /// 優勝回数
    pub wins: i64,
    /// 出走数
    pub races: i64,
}

/// サーキット別の成績
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CircuitPerformance {
    /// サーキット名
    pub circuit: String,
    /// 出走数
    pub races: i64,
    /// 優勝回数
    pub wins: i64,
    /// 平均順位（完走記録が無ければ null）
    pub avg_position: Option<f64>,
    /// ポイント
    pub points: f64,
}

/// ドライバーダッシュボード
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverDashboard {
    /// 通算成績
    pub stats: DriverStats,
    /// 年ごとの成績
    pub career: Vec<CareerYear>,
    /// 優勝回数上位のサーキット
    pub circuits: Vec<CircuitPerformance>,
    /// 年ごとのポイント
    pub points_by_year: Vec<YearPoints>,
}

/// 管理者ダッシュボードを集計する
///
/// `today` より前の日付のレースを開催済みとして数える。
pub async fn admin(pool: &SqlitePool, year: i32, today: NaiveDate) -> Result<AdminDashboard, PitwallError> {
    let today = today.format("%Y-%m-%d").to_string();

    let stats = sqlx::query_as::<_, AdminStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM drivers) AS total_drivers,
            (SELECT COUNT(*) FROM constructors) AS total_constructors,
            (SELECT COUNT(DISTINCT year) FROM races) AS total_seasons,
            (SELECT COUNT(*) FROM races WHERE year = ?1) AS current_year_races,
            (SELECT COUNT(*) FROM races WHERE year = ?1 AND date < ?2) AS completed_races
        "#,
    )
    .bind(year)
    .bind(today.as_str())
    .fetch_one(pool)
    .await?;

    let races = sqlx::query_as::<_, RaceSummaryRow>(
        r#"
        SELECT
            r.name,
            r.laps,
            (SELECT MIN(res.time) FROM results res WHERE res.race_id = r.id) AS time,
            r.date,
            c.name AS circuit
        FROM races r
        JOIN circuits c ON r.circuit_id = c.id
        WHERE r.year = ?
        ORDER BY r.date
        LIMIT ?
        "#,
    )
    .bind(year)
    .bind(TOP_LIMIT)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| RaceSummary {
        name: row.name,
        laps: row.laps,
        time: row.time.unwrap_or_else(|| "N/A".to_string()),
        date: row.date,
        circuit: row.circuit,
    })
    .collect();

    let constructors = sqlx::query_as::<_, ConstructorStanding>(
        r#"
        SELECT c.name, CAST(SUM(r.points) AS REAL) AS points, c.nationality
        FROM constructors c
        JOIN results r ON r.constructor_id = c.id
        JOIN races ra ON r.race_id = ra.id
        WHERE ra.year = ?
        GROUP BY c.id
        ORDER BY points DESC
        LIMIT ?
        "#,
    )
    .bind(year)
    .bind(TOP_LIMIT)
    .fetch_all(pool)
    .await?;

    let drivers = sqlx::query_as::<_, DriverStanding>(
        r#"
        SELECT
            d.forename || ' ' || d.surname AS name,
            CAST(SUM(r.points) AS REAL) AS points,
            c.name AS constructor
        FROM drivers d
        JOIN results r ON r.driver_id = d.id
        JOIN constructors c ON r.constructor_id = c.id
        JOIN races ra ON r.race_id = ra.id
        WHERE ra.year = ?
        GROUP BY d.id, c.id
        ORDER BY points DESC
        LIMIT ?
        "#,
    )
    .bind(year)
    .bind(TOP_LIMIT)
    .fetch_all(pool)
    .await?;

    let race_points = race_points(pool, year).await?;

    Ok(AdminDashboard {
        stats,
        races,
        constructors,
        drivers,
        race_points,
    })
}

/// レースごとに上位コンストラクターのポイントを横持ちにする
async fn race_points(pool: &SqlitePool, year: i32) -> Result<Vec<Value>, PitwallError> {
    let rows: Vec<(i64, String, String, f64)> = sqlx::query_as(
        r#"
        WITH top_constructors AS (
            SELECT c.id, c.name
            FROM constructors c
            JOIN results r ON r.constructor_id = c.id
            JOIN races ra ON r.race_id = ra.id
            WHERE ra.year = ?1
            GROUP BY c.id
            ORDER BY SUM(r.points) DESC
            LIMIT ?2
        )
        SELECT ra.id, ra.name, tc.name, CAST(SUM(r.points) AS REAL)
        FROM races ra
        JOIN results r ON r.race_id = ra.id
        JOIN top_constructors tc ON r.constructor_id = tc.id
        WHERE ra.year = ?1
        GROUP BY ra.id, tc.id
        ORDER BY ra.date, ra.id
        "#,
    )
    .bind(year)
    .bind(RACE_POINTS_CONSTRUCTORS)
    .fetch_all(pool)
    .await?;

    let mut races: Vec<(i64, Map<String, Value>)> = Vec::new();
    for (race_id, race_name, constructor, points) in rows {
        let index = match races.iter().position(|(id, _)| *id == race_id) {
            Some(index) => index,
            None => {
                let mut entry = Map::new();
                entry.insert("name".to_string(), Value::from(race_name));
                races.push((race_id, entry));
                races.len() - 1
            }
        };
        races[index].1.insert(constructor, Value::from(points));
    }

    Ok(races.into_iter().map(|(_, entry)| Value::Object(entry)).collect())
}

/// チームダッシュボードを集計する
///
/// 結果が1件も無いコンストラクターは `NotFound`。
pub async fn team(pool: &SqlitePool, constructor_id: i64) -> Result<TeamDashboard, PitwallError> {
    let stats = sqlx::query_as::<_, TeamStatsRow>(
        r#"
        SELECT
            c.name,
            (SELECT COUNT(*) FROM results w WHERE w.constructor_id = c.id AND w.position = 1) AS total_wins,
            COUNT(DISTINCT r.driver_id) AS total_drivers,
            MIN(ra.year) AS first_year,
            MAX(ra.year) AS last_year
        FROM constructors c
        JOIN results r ON r.constructor_id = c.id
        JOIN races ra ON r.race_id = ra.id
        WHERE c.id = ?
        GROUP BY c.id
        "#,
    )
    .bind(constructor_id)
    .fetch_optional(pool)
    .await?
    .map(|row| TeamStats {
        name: row.name,
        total_wins: row.total_wins,
        total_drivers: row.total_drivers,
        period: period(row.first_year, row.last_year),
    })
    .ok_or_else(|| PitwallError::NotFound("Constructor not found".to_string()))?;

    let drivers = sqlx::query_as::<_, TeamDriver>(
        r#"
        SELECT
            d.forename || ' ' || d.surname AS name,
            COUNT(DISTINCT r.race_id) AS races,
            SUM(CASE WHEN r.position = 1 THEN 1 ELSE 0 END) AS wins,
            CAST(SUM(r.points) AS REAL) AS points
        FROM drivers d
        JOIN results r ON r.driver_id = d.id
        WHERE r.constructor_id = ?
        GROUP BY d.id
        ORDER BY wins DESC, points DESC
        LIMIT 4
        "#,
    )
    .bind(constructor_id)
    .fetch_all(pool)
    .await?;

    // 順位は全コンストラクターの年間ポイントから求めてから絞り込む
    let results = sqlx::query_as::<_, SeasonResult>(
        r#"
        WITH season_points AS (
            SELECT ra.year AS year, r.constructor_id AS constructor_id, SUM(r.points) AS points
            FROM results r
            JOIN races ra ON r.race_id = ra.id
            GROUP BY ra.year, r.constructor_id
        ),
        ranked AS (
            SELECT
                year,
                constructor_id,
                points,
                RANK() OVER (PARTITION BY year ORDER BY points DESC) AS position
            FROM season_points
        )
        SELECT year, position, CAST(points AS REAL) AS points
        FROM ranked
        WHERE constructor_id = ?
        ORDER BY year DESC
        LIMIT ?
        "#,
    )
    .bind(constructor_id)
    .bind(TOP_LIMIT)
    .fetch_all(pool)
    .await?;

    let status = sqlx::query_as::<_, StatusShare>(
        r#"
        SELECT s.status AS name, COUNT(*) AS value
        FROM results r
        JOIN status s ON r.status_id = s.id
        WHERE r.constructor_id = ?
        GROUP BY s.id
        ORDER BY value DESC, name
        LIMIT 4
        "#,
    )
    .bind(constructor_id)
    .fetch_all(pool)
    .await?;

    Ok(TeamDashboard {
        stats,
        drivers,
        results,
        status,
    })
}

/// 指定年にコンストラクターで結果を残したドライバー数
pub async fn active_drivers(pool: &SqlitePool, constructor_id: i64, year: i32) -> Result<i64, PitwallError> {
    let count = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT r.driver_id)
        FROM results r
        JOIN races ra ON r.race_id = ra.id
        WHERE r.constructor_id = ? AND ra.year = ?
        "#,
    )
    .bind(constructor_id)
    .bind(year)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// ドライバーダッシュボードを集計する
///
/// 結果が1件も無いドライバーは `NotFound`。
pub async fn driver(pool: &SqlitePool, driver_id: i64) -> Result<DriverDashboard, PitwallError> {
    let stats = sqlx::query_as::<_, DriverStatsRow>(
        r#"
        SELECT
            d.forename || ' ' || d.surname AS name,
            (SELECT COUNT(*) FROM results w WHERE w.driver_id = d.id AND w.position = 1) AS total_wins,
            COUNT(DISTINCT r.race_id) AS total_races,
            MIN(ra.year) AS first_year,
            MAX(ra.year) AS last_year
        FROM drivers d
        JOIN results r ON r.driver_id = d.id
        JOIN races ra ON r.race_id = ra.id
        WHERE d.id = ?
        GROUP BY d.id
        "#,
    )
    .bind(driver_id)
    .fetch_optional(pool)
    .await?
    .map(|row| DriverStats {
        name: row.name,
        total_wins: row.total_wins,
        total_races: row.total_races,
        period: period(row.first_year, row.last_year),
    })
    .ok_or_else(|| PitwallError::NotFound("Driver not found".to_string()))?;

    let career = sqlx::query_as::<_, CareerYear>(
        r#"
        SELECT
            ra.year AS year,
            CAST(SUM(r.points) AS REAL) AS points,
            SUM(CASE WHEN r.position = 1 THEN 1 ELSE 0 END) AS wins,
            COUNT(DISTINCT ra.id) AS races
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

    let circuits = sqlx::query_as::<_, CircuitPerformance>(
        r#"
        SELECT
            c.name AS circuit,
            COUNT(DISTINCT ra.id) AS races,
            SUM(CASE WHEN r.position = 1 THEN 1 ELSE 0 END) AS wins,
            AVG(r.position) AS avg_position,
            CAST(SUM(r.points) AS REAL) AS points
        FROM results r
        JOIN races ra ON r.race_id = ra.id
        JOIN circuits c ON ra.circuit_id = c.id
        WHERE r.driver_id = ?
        GROUP BY c.id
        ORDER BY wins DESC, points DESC
        LIMIT ?
        "#,
    )
    .bind(driver_id)
    .bind(TOP_LIMIT)
    .fetch_all(pool)
    .await?;

    let points_by_year = reports::points_by_year(pool, driver_id).await?;

    Ok(DriverDashboard {
        stats,
        career,
        circuits,
        points_by_year,
    })
}

/// 指定年のドライバーの最新レースでの所属コンストラクター名
pub async fn driver_team(pool: &SqlitePool, driver_name: &str, year: i32) -> Result<Option<String>, PitwallError> {
    let team = sqlx::query_scalar(
        r#"
        SELECT c.name
        FROM results r
        JOIN drivers d ON r.driver_id = d.id
        JOIN constructors c ON r.constructor_id = c.id
        JOIN races ra ON r.race_id = ra.id
        WHERE LOWER(d.forename || ' ' || d.surname) = LOWER(?) AND ra.year = ?
        ORDER BY ra.date DESC
        LIMIT 1
        "#,
    )
    .bind(driver_name)
    .bind(year)
    .fetch_optional(pool)
    .await?;
    Ok(team)
}

fn period(first_year: i64, last_year: i64) -> String {
    format!("{} - {}", first_year, last_year)
}
