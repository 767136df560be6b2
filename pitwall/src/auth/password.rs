// パスワードハッシュ化と検証（bcrypt実装）

use crate::common::error::PitwallError;
use bcrypt::{hash, verify};

/// パスワードハッシュ化のコスト（12推奨、200-300ms）
const HASH_COST: u32 = 12;

/// bcryptハッシュのプレフィックス
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// パスワードをbcryptでハッシュ化
///
/// # Returns
/// * `Ok(String)` - bcryptハッシュ文字列（$2b$で始まる）
/// * `Err(PitwallError)` - ハッシュ化失敗
pub fn hash_password(password: &str) -> Result<String, PitwallError> {
    hash(password, HASH_COST)
        .map_err(|e| PitwallError::PasswordHash(format!("Failed to hash password: {}", e)))
}

/// 格納値がbcryptハッシュかどうか
pub fn is_bcrypt_hash(stored: &str) -> bool {
    BCRYPT_PREFIXES
        .iter()
        .any(|prefix| stored.starts_with(prefix))
}

/// パスワードを検証
///
/// 格納値がbcryptハッシュならbcryptで検証し、それ以外は
/// 旧データの平文パスワードとして比較する。
///
/// # Returns
/// * `Ok(true)` - パスワード一致
/// * `Ok(false)` - パスワード不一致
/// * `Err(PitwallError)` - 検証失敗（壊れたハッシュ）
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PitwallError> {
    if is_bcrypt_hash(stored) {
        return verify(password, stored)
            .map_err(|e| PitwallError::PasswordHash(format!("Failed to verify password: {}", e)));
    }

    tracing::debug!("Verifying legacy plaintext password");
    Ok(constant_time_eq(password.as_bytes(), stored.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
