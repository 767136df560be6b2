//! クライアントIPアドレス抽出ユーティリティ
//!
//! ログイン履歴（users_log）に記録するIPをヘッダーから取り出す

use axum::http::HeaderMap;
use std::net::IpAddr;

/// 取得できなかった場合に記録する値
pub const UNKNOWN_IP: &str = "unknown";

/// IPアドレスを正規化する
///
/// IPv4-mapped IPv6（::ffff:x.x.x.x）をIPv4に変換。
/// それ以外はそのまま返す。
pub fn normalize_ip(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                IpAddr::V4(v4)
            } else {
                IpAddr::V6(v6)
            }
        }
        v4 => v4,
    }
}

/// `X-Forwarded-For` の先頭要素をクライアントIPとして返す
///
/// IPとして解釈できる値は正規化し、それ以外（ホスト名など）はそのまま返す。
/// ヘッダーが無い・空の場合は `"unknown"`。
pub fn client_ip_from_headers(headers: &HeaderMap) -> String {
    let first = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match first {
        Some(raw) => match raw.parse::<IpAddr>() {
            Ok(ip) => normalize_ip(ip).to_string(),
            Err(_) => raw.to_string(),
        },
        None => UNKNOWN_IP.to_string(),
    }
}
