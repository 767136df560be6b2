//! ドライバーCSVの読み込み
//!
//! ヘッダー行付きCSV（`driverRef,number,code,forename,surname,dob,nationality`）を
//! 読み込み、登録可能な行とエラー行に振り分ける。DBへの書き込みは
//! `db::drivers::import_drivers` が行う。

use crate::common::error::PitwallError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 生年月日の書式
pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// Ergast形式のNULL表現
const NULL_MARKER: &str = "\\N";

/// UTF-8 BOM
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSVの1行（未検証）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDriverRecord {
    #[serde(default)]
    driver_ref: Option<String>,
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    forename: Option<String>,
    #[serde(default)]
    surname: Option<String>,
    #[serde(default)]
    dob: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
}

/// 検証済みのドライバー行
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRecord {
    /// 一意な参照キー
    pub driver_ref: String,
    /// カーナンバー
    pub number: Option<i64>,
    /// 3文字コード
    pub code: Option<String>,
    /// 名
    pub forename: String,
    /// 姓
    pub surname: String,
    /// 生年月日（YYYY-MM-DD）
    pub dob: Option<String>,
    /// 国籍
    pub nationality: Option<String>,
}

/// 取り込めなかった行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRowError {
    /// driverRef（無い場合は行番号）
    pub record: String,
    /// 理由
    pub error: String,
}

/// CSVの読み込み結果
#[derive(Debug, Clone, Default)]
pub struct ParsedDrivers {
    /// 登録対象の行
    pub records: Vec<DriverRecord>,
    /// 取り込めなかった行
    pub errors: Vec<ImportRowError>,
}

impl ParsedDrivers {
    /// データ行の総数
    pub fn total(&self) -> usize {
        self.records.len() + self.errors.len()
    }
}

/// CSVを読み込んで検証する
///
/// 値は前後の空白を除去し、空行は読み飛ばす。
/// ファイル内で2回目以降に現れたdriverRefはエラー行とする。
///
/// # Returns
/// * `Ok(ParsedDrivers)` - 検証結果
/// * `Err(PitwallError::Csv)` - CSVとして解釈できない
/// * `Err(PitwallError::Validation)` - データ行が1件もない
pub fn parse_driver_csv(content: &[u8]) -> Result<ParsedDrivers, PitwallError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let headers = reader.headers()?.clone();
    let mut parsed = ParsedDrivers::default();
    let mut seen_refs = HashSet::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawDriverRecord = row.deserialize(Some(&headers))?;
        match validate(raw, line) {
            Ok(record) if !seen_refs.insert(record.driver_ref.clone()) => {
                parsed.errors.push(ImportRowError {
                    error: format!("Duplicate driverRef '{}' in file", record.driver_ref),
                    record: record.driver_ref,
                });
            }
            Ok(record) => parsed.records.push(record),
            Err(error) => parsed.errors.push(error),
        }
    }

    if parsed.total() == 0 {
        return Err(PitwallError::Validation("No records found in file".to_string()));
    }

    tracing::debug!(
        valid = parsed.records.len(),
        invalid = parsed.errors.len(),
        "Parsed driver CSV"
    );
    Ok(parsed)
}

/// 生年月日の書式を確認する
pub fn validate_dob(dob: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(dob, DOB_FORMAT)
        .map(|_| ())
        .map_err(|_| format!("Invalid dob '{}', expected YYYY-MM-DD", dob))
}

fn validate(raw: RawDriverRecord, line: u64) -> Result<DriverRecord, ImportRowError> {
    let driver_ref = non_null(raw.driver_ref);
    let record_label = driver_ref
        .clone()
        .unwrap_or_else(|| format!("line {}", line));
    let fail = |error: String| ImportRowError {
        record: record_label.clone(),
        error,
    };

    let driver_ref = driver_ref.ok_or_else(|| fail("driverRef is required".to_string()))?;
    let forename = non_null(raw.forename).ok_or_else(|| fail("forename is required".to_string()))?;
    let surname = non_null(raw.surname).ok_or_else(|| fail("surname is required".to_string()))?;

    let dob = non_null(raw.dob);
    if let Some(dob) = &dob {
        validate_dob(dob).map_err(&fail)?;
    }

    let number = match non_null(raw.number) {
        Some(n) => Some(
            n.parse::<i64>()
                .map_err(|_| fail(format!("Invalid number '{}'", n)))?,
        ),
        None => None,
    };

    Ok(DriverRecord {
        driver_ref,
        number,
        code: non_null(raw.code),
        forename,
        surname,
        dob,
        nationality: non_null(raw.nationality),
    })
}

fn non_null(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != NULL_MARKER)
}
