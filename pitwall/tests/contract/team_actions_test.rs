//! チームアクションAPI Contract Tests
//!
//! GET /api/actions/team/search-driver
//! POST /api/actions/team/import-drivers

use axum::http::StatusCode;

use crate::support::app::{count, create_test_app, TEST_MAX_UPLOAD_BYTES};
use crate::support::fixtures::{LECLERC, MCLAREN};
use crate::support::http::{get, post_multipart, Part};

const IMPORT_CSV: &str = "driverRef,number,code,forename,surname,dob,nationality
hamilton,44,HAM,Lewis,Hamilton,1985-01-07,British
leclerc,16,LEC,Charles,Leclerc,1997-10-16,Monegasque
senna,12,SEN,Ayrton,Senna,1960-03-21,Brazilian
prost,\\N,PRO,Alain,Prost,1955-02-24,French
,1,XXX,No,Reference,,
";

const IMPORT_URI: &str = "/api/actions/team/import-drivers";

#[tokio::test]
async fn test_search_driver_by_partial_name() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/actions/team/search-driver?name=LEC").await;

    assert_eq!(status, StatusCode::OK);
    let drivers = body["data"]["drivers"].as_array().unwrap();
    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0]["id"], LECLERC);
    assert_eq!(drivers[0]["name"], "Charles Leclerc");
    assert_eq!(drivers[0]["nationality"], "Monegasque");
}

#[tokio::test]
async fn test_search_driver_by_full_name() {
    let (app, _pool, _) = create_test_app().await;

    let (_, body) = get(&app, "/api/actions/team/search-driver?name=lando%20nor").await;

    let drivers = body["data"]["drivers"].as_array().unwrap();
    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0]["name"], "Lando Norris");
}

#[tokio::test]
async fn test_search_driver_empty_name_returns_empty_list() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = get(&app, "/api/actions/team/search-driver?name=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["drivers"], serde_json::json!([]));

    let (status, body) = get(&app, "/api/actions/team/search-driver").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["drivers"], serde_json::json!([]));
}

/// 新規・既存・不正行が混在するCSVの取り込み
#[tokio::test]
async fn test_import_drivers_counts_new_existing_and_errors() {
    let (app, pool, fixture) = create_test_app().await;

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[
            Part::Text("constructorId", "2"),
            Part::File("file", "drivers.csv", IMPORT_CSV),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["existingCount"], 2);
    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["error"], "driverRef is required");
    assert_eq!(
        body["message"],
        "2 drivers imported, 2 already registered, 1 errors"
    );

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM drivers").await, 6);
    let associated: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM driver_constructor WHERE constructor_id = ? AND year = ?",
    )
    .bind(MCLAREN)
    .bind(fixture.current_year)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(associated, 4);

    let number: Option<i64> =
        sqlx::query_scalar("SELECT number FROM drivers WHERE ref = 'prost'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(number, None);

    let details: String =
        sqlx::query_scalar("SELECT details FROM team_log WHERE constructor_id = ?")
            .bind(MCLAREN)
            .fetch_one(&pool)
            .await
            .unwrap();
    let details: serde_json::Value = serde_json::from_str(&details).unwrap();
    assert_eq!(details["count"], 2);
    assert_eq!(details["existing"], 2);
    assert_eq!(details["errors"], 1);
}

/// 同じCSVを再度取り込むと全件が既存扱いになり、所属も重複しない
#[tokio::test]
async fn test_import_drivers_twice_is_idempotent() {
    let (app, pool, _) = create_test_app().await;
    let parts = [
        Part::Text("constructorId", "2"),
        Part::File("file", "drivers.csv", IMPORT_CSV),
    ];

    post_multipart(&app, IMPORT_URI, &parts).await;
    let (status, body) = post_multipart(&app, IMPORT_URI, &parts).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);
    assert_eq!(body["data"]["existingCount"], 4);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM drivers").await, 6);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM driver_constructor").await, 4);
}

#[tokio::test]
async fn test_import_drivers_requires_file_and_constructor() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[Part::File("file", "drivers.csv", IMPORT_CSV)],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File and constructorId are required");

    let (status, _) = post_multipart(&app, IMPORT_URI, &[Part::Text("constructorId", "2")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[
            Part::Text("constructorId", "mclaren"),
            Part::File("file", "drivers.csv", IMPORT_CSV),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "constructorId must be a number");
}

/// 存在しないコンストラクターは404で、何も登録されない
#[tokio::test]
async fn test_import_drivers_unknown_constructor_returns_404() {
    let (app, pool, _) = create_test_app().await;

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[
            Part::Text("constructorId", "99"),
            Part::File("file", "drivers.csv", IMPORT_CSV),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM drivers").await, 4);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM team_log").await, 0);
}

#[tokio::test]
async fn test_import_drivers_header_only_returns_400() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[
            Part::Text("constructorId", "2"),
            Part::File(
                "file",
                "drivers.csv",
                "driverRef,number,code,forename,surname,dob,nationality\n",
            ),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No records found in file");
}

/// 監査ログの書き込みに失敗した場合は500で、登録と所属はロールバックされる
#[tokio::test]
async fn test_import_drivers_database_failure_rolls_back() {
    let (app, pool, _) = create_test_app().await;
    sqlx::query("DROP TABLE team_log")
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[
            Part::Text("constructorId", "2"),
            Part::File("file", "drivers.csv", IMPORT_CSV),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM drivers").await, 4);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM driver_constructor").await, 0);
}

/// 上限を超えるファイルは413のJSONエラー
#[tokio::test]
async fn test_import_drivers_oversized_file_returns_413() {
    let (app, pool, _) = create_test_app().await;
    let mut csv = String::from("driverRef,number,code,forename,surname,dob,nationality\n");
    let mut i = 0;
    while csv.len() <= TEST_MAX_UPLOAD_BYTES {
        csv.push_str(&format!("driver{i},,,Test,Driver{i},,\n"));
        i += 1;
    }

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[
            Part::Text("constructorId", "2"),
            Part::File("file", "drivers.csv", &csv),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Uploaded file is too large");
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM drivers").await, 4);
}

/// 同じファイル内で重複したdriverRefは2件目以降がエラー行になる
#[tokio::test]
async fn test_import_drivers_duplicate_ref_in_file_is_row_error() {
    let (app, pool, _) = create_test_app().await;
    let csv = "driverRef,number,code,forename,surname,dob,nationality
senna,12,SEN,Ayrton,Senna,1960-03-21,Brazilian
senna,1,SEN,Ayrton,Senna,1960-03-21,Brazilian
";

    let (status, body) = post_multipart(
        &app,
        IMPORT_URI,
        &[
            Part::Text("constructorId", "2"),
            Part::File("file", "drivers.csv", csv),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["existingCount"], 0);
    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["record"], "senna");
    assert_eq!(errors[0]["error"], "Duplicate driverRef 'senna' in file");
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM drivers").await, 5);
}
