//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! ハンドラーは `PitwallError` を `?` で伝播し、`api::error::AppError` が
//! HTTPステータスと `{"success": false, "error": ...}` 形式のJSONに変換する。

use axum::http::StatusCode;
use thiserror::Error;

/// Pitwall error type
#[derive(Debug, Error)]
pub enum PitwallError {
    /// 入力値検証エラー（必須パラメータ欠落など）
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// 重複リソース（既存の ref など）
    #[error("Conflict: {0}")]
    Conflict(String),

    /// アップロードサイズ超過
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// CSV parse error
    #[error("CSV error: {0}")]
    Csv(String),

    /// Password hash error
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PitwallError {
    /// Returns a safe error message for external clients.
    ///
    /// Client-facing variants carry their own message. Database, hashing and
    /// internal failures collapse to a generic text; the full error is only
    /// written to the server log.
    pub fn external_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Authentication(msg) => msg.clone(),
            Self::PayloadTooLarge(_) => "Uploaded file is too large".to_string(),
            Self::Csv(msg) => format!("Invalid CSV file: {}", msg),
            Self::Database(_) => "Database error".to_string(),
            Self::PasswordHash(_) => "Authentication error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Csv(_) => StatusCode::BAD_REQUEST,
            // 重複referenceは400
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for PitwallError {
    fn from(err: sqlx::Error) -> Self {
        PitwallError::Database(err.to_string())
    }
}

impl From<csv::Error> for PitwallError {
    fn from(err: csv::Error) -> Self {
        PitwallError::Csv(err.to_string())
    }
}
