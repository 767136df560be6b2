// 認証関連のデータモデル

use serde::{Deserialize, Serialize};

/// ユーザー種別
///
/// ダッシュボードの表示切り替えに使われる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// 管理者（全データ閲覧・登録）
    Admin,
    /// チーム（コンストラクター単位）
    Team,
    /// ドライバー
    Driver,
}

impl UserType {
    /// DBに格納する文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Team => "team",
            UserType::Driver => "driver",
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserType::Admin),
            "team" => Ok(UserType::Team),
            "driver" => Ok(UserType::Driver),
            other => Err(format!("unknown user type: {}", other)),
        }
    }
}

/// ユーザー
#[derive(Debug, Clone)]
pub struct User {
    /// ユーザーID
    pub id: i64,
    /// ユーザー名
    pub username: String,
    /// パスワード（bcryptハッシュ、または旧データの平文）
    pub password: String,
    /// ユーザー種別
    pub user_type: UserType,
    /// 表示名
    pub name: String,
    /// 所属コンストラクターID（team ユーザー）
    pub constructor_id: Option<i64>,
    /// ドライバーID（driver ユーザー）
    pub driver_id: Option<i64>,
}

/// クライアントに返すユーザー情報（パスワード除外）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    /// ユーザーID
    pub id: i64,
    /// ユーザー名
    pub username: String,
    /// ユーザー種別
    pub user_type: UserType,
    /// 表示名
    pub name: String,
    /// 所属コンストラクターID
    pub constructor_id: Option<i64>,
    /// ドライバーID
    pub driver_id: Option<i64>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            user_type: user.user_type,
            name: user.name,
            constructor_id: user.constructor_id,
            driver_id: user.driver_id,
        }
    }
}
