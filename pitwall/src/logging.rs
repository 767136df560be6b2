//! ロギング初期化
//!
//! `PITWALL_LOG_LEVEL`（未設定時は `RUST_LOG`、どちらも無ければ `info`）で
//! フィルタを決め、`PITWALL_LOG_FORMAT=json` でJSON出力に切り替える。

use crate::config::get_env_with_fallback;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";

/// グローバルsubscriberを初期化する
///
/// 既に初期化済みの場合はエラーを返す。
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = build_filter(get_env_with_fallback("PITWALL_LOG_LEVEL", "RUST_LOG").as_deref());
    let json = get_env_with_fallback("PITWALL_LOG_FORMAT", "LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init()
    }
}

/// フィルタ文字列から `EnvFilter` を作る（不正値はデフォルトレベル）
fn build_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}
