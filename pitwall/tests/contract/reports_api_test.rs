//! レポートAPI Contract Tests
//!
//! GET /api/reports/admin/*
//! GET /api/reports/team/*
//! GET /api/reports/driver/*

use axum::http::StatusCode;
use serde_json::Value;

use crate::support::app::create_test_app;
use crate::support::fixtures::{LECLERC, MCLAREN, PIASTRI};
use crate::support::http::get;

fn status_rows(rows: &Value) -> Vec<(&str, i64)> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["status"].as_str().unwrap(),
                row["count"].as_i64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_admin_status_results() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/reports/admin/status-results").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Results by status");
    assert!(body["data"]["description"].as_str().is_some());
    assert_eq!(
        status_rows(&body["data"]["rows"]),
        vec![("Finished", 10), ("Accident", 1), ("Engine", 1)]
    );
}

#[tokio::test]
async fn test_admin_constructors_races() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/reports/admin/constructors-races").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Constructors and races");
    let rows = body["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);

    let ferrari = &rows[0];
    assert_eq!(ferrari["name"], "Ferrari");
    assert_eq!(ferrari["drivers"], 2);
    assert_eq!(ferrari["races"], 3);
    assert_eq!(ferrari["wins"], 2);
    let circuits = ferrari["circuits"].as_array().unwrap();
    assert_eq!(circuits.len(), 2);
    assert_eq!(circuits[0]["name"], "Autodromo Jose Carlos Pace");
    assert_eq!(circuits[0]["races"], 2);
    assert_eq!(circuits[0]["lapStats"]["min"], 71);
    assert_eq!(circuits[0]["lapStats"]["avg"], 71.0);
    assert_eq!(circuits[0]["lapStats"]["max"], 71);
    assert_eq!(circuits[1]["name"], "Autodromo Nazionale di Monza");
    assert_eq!(circuits[1]["races"], 1);
    assert_eq!(circuits[1]["lapStats"]["min"], 20);
    assert_eq!(circuits[1]["lapStats"]["avg"], 36.5);
    assert_eq!(circuits[1]["lapStats"]["max"], 53);

    assert_eq!(rows[1]["name"], "McLaren");
    assert_eq!(rows[1]["wins"], 1);

    // 結果の無いコンストラクターも0件で含まれる
    let minardi = &rows[2];
    assert_eq!(minardi["name"], "Minardi");
    assert_eq!(minardi["drivers"], 0);
    assert_eq!(minardi["races"], 0);
    assert_eq!(minardi["wins"], 0);
    assert_eq!(minardi["circuits"], serde_json::json!([]));
}

#[tokio::test]
async fn test_admin_airports_sorted_by_distance() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/reports/admin/airports?city=Sao%20Paulo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Airports near Sao Paulo");
    let rows = body["data"]["rows"].as_array().unwrap();
    let iata: Vec<&str> = rows.iter().map(|r| r["iata"].as_str().unwrap()).collect();
    assert_eq!(iata, vec!["CGH", "GRU", "VCP"]);
    assert_eq!(rows[0]["type"], "medium_airport");

    let distances: Vec<f64> = rows
        .iter()
        .map(|r| r["distance"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(distances.iter().all(|d| *d <= 100.0));
}

#[tokio::test]
async fn test_admin_airports_errors() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/reports/admin/airports").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "city is required");

    let (status, body) = get(&app, "/api/reports/admin/airports?city=Atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "City 'Atlantis' not found");
}

/// 周辺100km以内に空港が無い都市は空の行
#[tokio::test]
async fn test_admin_airports_none_in_range() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/reports/admin/airports?city=Manaus").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rows"], serde_json::json!([]));
}

#[tokio::test]
async fn test_team_status_results() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(
        &app,
        &format!("/api/reports/team/status-results?constructorId={}", MCLAREN),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Results by status - McLaren");
    assert_eq!(
        status_rows(&body["data"]["rows"]),
        vec![("Finished", 5), ("Accident", 1)]
    );
}

/// 存在しないコンストラクターは空の行と汎用タイトル
#[tokio::test]
async fn test_team_status_results_unknown_constructor() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/reports/team/status-results?constructorId=99").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Results by status - Constructor");
    assert_eq!(body["data"]["rows"], serde_json::json!([]));
}

#[tokio::test]
async fn test_team_drivers_wins() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(
        &app,
        &format!("/api/reports/team/drivers-wins?constructorId={}", MCLAREN),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Drivers of McLaren");
    let rows = body["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Lando Norris");
    assert_eq!(rows[0]["wins"], 1);
    assert_eq!(rows[0]["points"], 58.0);
    assert_eq!(rows[1]["name"], "Oscar Piastri");
    assert_eq!(rows[1]["wins"], 0);
    assert_eq!(rows[1]["points"], 30.0);
}

#[tokio::test]
async fn test_team_reports_require_constructor_id() {
    let (app, _pool, _) = create_test_app().await;

    let (status, _) = get(&app, "/api/reports/team/drivers-wins").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/reports/team/status-results?constructorId=x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_driver_status_results() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(
        &app,
        &format!("/api/reports/driver/status-results?driverId={}", PIASTRI),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Results by status - Oscar Piastri");
    assert_eq!(
        status_rows(&body["data"]["rows"]),
        vec![("Finished", 2), ("Accident", 1)]
    );
}

#[tokio::test]
async fn test_driver_points_by_year() {
    let (app, _pool, fixture) = create_test_app().await;

    let (status, body) = get(
        &app,
        &format!("/api/reports/driver/points-by-year?driverId={}", LECLERC),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Points by year - Charles Leclerc");
    let rows = body["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["year"], fixture.previous_year);
    assert_eq!(rows[0]["points"], 15.0);
    assert_eq!(rows[1]["year"], fixture.current_year);
    assert_eq!(rows[1]["points"], 25.0);

    let (status, _) = get(&app, "/api/reports/driver/points-by-year").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
