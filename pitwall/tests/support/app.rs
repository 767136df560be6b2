use axum::Router;
use pitwall::config::DatabaseConfig;
use pitwall::{api, db, AppState};
use sqlx::SqlitePool;

use super::fixtures::{seed, Fixture};

/// テスト用のアップロード上限
pub const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

/// マイグレーション済みのインメモリDBを作成する
pub async fn create_test_db_pool() -> SqlitePool {
    let pool = db::init_pool(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
    .expect("Failed to create test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// フィクスチャ投入済みのアプリを作成する（.oneshot()スタイルのテスト用）
pub async fn create_test_app() -> (Router, SqlitePool, Fixture) {
    let db_pool = create_test_db_pool().await;
    let fixture = seed(&db_pool).await;
    let state = AppState {
        db_pool: db_pool.clone(),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
    };
    (api::create_app(state), db_pool, fixture)
}

/// 件数を数える
pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar(sql)
        .fetch_one(pool)
        .await
        .expect("count query failed")
}
