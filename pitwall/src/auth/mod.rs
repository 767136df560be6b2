// 認証モジュール

/// パスワードハッシュ化・検証（bcrypt）
pub mod password;

/// 初回起動時の管理者アカウント作成
pub mod bootstrap;
