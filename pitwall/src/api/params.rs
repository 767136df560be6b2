//! クエリパラメータの検証
//!
//! ID系のパラメータは文字列で受け取り、欠落・非数値をJSONの400で返す。

use crate::common::error::PitwallError;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::Value;

/// `?constructorId=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorIdQuery {
    /// コンストラクターID
    pub constructor_id: Option<String>,
}

/// `?driverId=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverIdQuery {
    /// ドライバーID
    pub driver_id: Option<String>,
}

/// `?year=`
#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    /// 対象年
    pub year: Option<String>,
}

/// 必須のIDパラメータを取り出す
pub fn required_id(value: Option<&str>, name: &str) -> Result<i64, PitwallError> {
    let value = required_text(value, name)?;
    value
        .parse::<i64>()
        .map_err(|_| PitwallError::Validation(format!("{} must be a number", name)))
}

/// 必須の文字列パラメータを取り出す（前後の空白を除去）
pub fn required_text<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, PitwallError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PitwallError::Validation(format!("{} is required", name))),
    }
}

/// 任意の年パラメータを取り出す（省略時は `default`）
pub fn year_or(value: Option<&str>, default: i32) -> Result<i32, PitwallError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse::<i32>()
            .map_err(|_| PitwallError::Validation("year must be a number".to_string())),
        None => Ok(default),
    }
}

/// JSONボディの任意の整数項目を取り出す
///
/// フォームから文字列で送られる場合があるため、数値と数字の文字列の両方を受け付ける。
pub fn optional_int(value: Option<&Value>, name: &str) -> Result<Option<i64>, PitwallError> {
    let invalid = || PitwallError::Validation(format!("{} must be a number", name));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// 現在の年（UTC）
pub fn current_year() -> i32 {
    Utc::now().year()
}
