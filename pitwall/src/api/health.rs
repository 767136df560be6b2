//! ヘルスチェックAPI

use crate::common::types::ApiResponse;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// DB接続状態
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// 接続できたか
    pub connected: bool,
    /// DBの現在時刻
    pub timestamp: String,
    /// 往復時間（ミリ秒）
    pub latency_ms: u128,
}

/// GET /api/health - DB接続確認
///
/// 接続できない場合は 503 Service Unavailable。
pub async fn health(State(state): State<AppState>) -> Response {
    match crate::db::ping(&state.db_pool).await {
        Ok(status) => Json(ApiResponse::ok(HealthStatus {
            connected: true,
            timestamp: status.timestamp,
            latency_ms: status.latency_ms,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "data": { "connected": false },
                    "error": "Database unavailable"
                })),
            )
                .into_response()
        }
    }
}
