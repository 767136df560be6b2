//! 認証API Contract Tests
//!
//! POST /api/auth/login

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

use crate::support::app::{count, create_test_app};
use crate::support::fixtures::{ADMIN_PASSWORD, FERRARI, HAMILTON};
use crate::support::http::{post_json, send};

/// bcryptハッシュのユーザーでログインできる
#[tokio::test]
async fn test_login_with_bcrypt_password() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        &json!({"username": "admin", "password": ADMIN_PASSWORD}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["user_type"], "admin");
    assert!(body["data"].get("password").is_none());
}

/// 平文パスワードの旧データでもログインでき、所属情報が返る
#[tokio::test]
async fn test_login_with_legacy_plaintext_password() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        &json!({"username": "ferrari_c", "password": "ferrari"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_type"], "team");
    assert_eq!(body["data"]["constructor_id"], FERRARI);
    assert!(body["data"]["driver_id"].is_null());

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        &json!({"username": "hamilton_d", "password": "hamilton"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["driver_id"], HAMILTON);
}

/// パスワード誤り・存在しないユーザーは401
#[tokio::test]
async fn test_login_with_wrong_credentials_returns_401() {
    let (app, pool, _) = create_test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/auth/login",
        &json!({"username": "admin", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid username or password");

    let (status, _) = post_json(
        &app,
        "/api/auth/login",
        &json!({"username": "nobody", "password": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM users_log").await, 0);
}

/// ユーザー名・パスワードの欠落は400
#[tokio::test]
async fn test_login_without_fields_returns_400() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = post_json(&app, "/api/auth/login", &json!({"username": "admin"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = post_json(&app, "/api/auth/login", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// 不正なJSONはJSON形式の400
#[tokio::test]
async fn test_login_with_malformed_json_returns_400() {
    let (app, _pool, _) = create_test_app().await;

    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

/// ログイン成功時にIPとlast_loginが記録される
#[tokio::test]
async fn test_login_records_ip_and_last_login() {
    let (app, pool, _) = create_test_app().await;

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::from(
                serde_json::to_vec(&json!({"username": "admin", "password": ADMIN_PASSWORD}))
                    .unwrap(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (action, ip): (String, String) =
        sqlx::query_as("SELECT action, ip_address FROM users_log")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(action, "login");
    assert_eq!(ip, "203.0.113.7");

    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM users WHERE username = 'admin' AND last_login IS NOT NULL"
        )
        .await,
        1
    );

    // ヘッダーが無い場合は unknown
    post_json(
        &app,
        "/api/auth/login",
        &json!({"username": "ferrari_c", "password": "ferrari"}),
    )
    .await;
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM users_log WHERE ip_address = 'unknown'"
        )
        .await,
        1
    );
}
