//! 認証API
//!
//! ユーザー名とパスワードによるログイン

use super::error::AppError;
use crate::auth::password::verify_password;
use crate::common::auth::UserInfo;
use crate::common::error::PitwallError;
use crate::common::ip::client_ip_from_headers;
use crate::common::types::ApiResponse;
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, http::HeaderMap, Json};
use serde::Deserialize;

/// ログインリクエスト
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// ユーザー名
    #[serde(default)]
    pub username: Option<String>,
    /// パスワード
    #[serde(default)]
    pub password: Option<String>,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /api/auth/login - ログイン
///
/// # Returns
/// * `200 OK` - ログイン成功（パスワードを除いたユーザー情報）
/// * `400 Bad Request` - ユーザー名またはパスワードが未指定
/// * `401 Unauthorized` - 認証失敗
pub async fn login(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserInfo>>, AppError> {
    let Json(request) = payload?;
    let (username, password) = match (request.username.as_deref(), request.password.as_deref()) {
        (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => (u.trim(), p),
        _ => {
            return Err(PitwallError::Validation(
                "Username and password are required".to_string(),
            )
            .into())
        }
    };

    let user = crate::db::users::find_by_username(&app_state.db_pool, username)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username, "Login failed: unknown user");
            PitwallError::Authentication(INVALID_CREDENTIALS.to_string())
        })?;

    if !verify_password(password, &user.password)? {
        tracing::warn!(username, "Login failed: wrong password");
        return Err(PitwallError::Authentication(INVALID_CREDENTIALS.to_string()).into());
    }

    let ip = client_ip_from_headers(&headers);
    if let Err(e) = crate::db::users::record_login(&app_state.db_pool, user.id, &ip).await {
        tracing::warn!(user_id = user.id, "Failed to record login: {}", e);
    }

    tracing::info!(user_id = user.id, user_type = user.user_type.as_str(), "User logged in");
    Ok(Json(ApiResponse::ok(UserInfo::from(user))))
}
