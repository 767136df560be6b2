//! 共通型定義

/// 認証関連のデータモデル
pub mod auth;

/// エラー型
pub mod error;

/// クライアントIP抽出
pub mod ip;

/// レスポンス共通型
pub mod types;
