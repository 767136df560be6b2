//! Pitwall Server
//!
//! モータースポーツ統計データの管理サーバー。
//! 管理者・チーム・ドライバー向けのダッシュボードとレポート、
//! コンストラクター/ドライバーの登録とCSVインポートをJSON APIで提供する。

#![warn(missing_docs)]

/// 共通型定義（エラー・レスポンス・ユーザー）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// データベースアクセス
pub mod db;

/// ドライバーCSVの読み込み
pub mod import;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// 認証機能（パスワード検証・管理者作成）
pub mod auth;

/// CLIインターフェース
pub mod cli;

use sqlx::SqlitePool;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: SqlitePool,
    /// CSVアップロードの最大サイズ（バイト）
    pub max_upload_bytes: usize,
}

impl AppState {
    /// 環境変数の設定で状態を作る
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            max_upload_bytes: config::get_max_upload_bytes(),
        }
    }
}
