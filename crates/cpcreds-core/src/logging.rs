//! 日志初始化模块
//!
//! 日志只写入标准错误，标准输出保留给 ExecCredential 文档。

use tracing_subscriber::EnvFilter;

/// 默认日志过滤级别
const DEFAULT_FILTER: &str = "warn";

/// 初始化日志，`directive` 优先于 `RUST_LOG`
pub fn init(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    // 重复初始化时保留已有的订阅者
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
