//! レスポンス共通型
//!
//! すべての成功レスポンスは `{"success": true, "data": ...}` 形式で返す。

use serde::Serialize;

/// 成功レスポンスのエンベロープ
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// 常に true（失敗時は `api::error::AppError` が返す）
    pub success: bool,
    /// ペイロード
    pub data: T,
    /// 登録系APIのメッセージ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// データのみのレスポンス
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// メッセージ付きのレスポンス
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// レポート（タイトル・説明・行データ）
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    /// タイトル
    pub title: String,
    /// 説明文
    pub description: String,
    /// 行データ
    pub rows: Vec<T>,
}
