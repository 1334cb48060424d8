//! 主机规范化模块
//!
//! 将集群 API 端点字符串规范化为可比较的主机标识：去掉 scheme、
//! 末尾的一个 `/` 以及默认端口后缀 `:443`。其他端口（如 `:80`、`:8443`）
//! 会被保留，作为区分同主机不同集群的依据。主机与路径保持原样，
//! 不做大小写转换或百分号编码。

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// 默认 HTTPS 端口后缀
const DEFAULT_PORT_SUFFIX: &str = ":443";

/// 规范化端点主机
///
/// `https://example.com:443/` 与 `example.com` 规范化后相同。
pub fn normalize_host(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::Input("主机地址为空".to_string()));
    }

    let mut host = if raw.starts_with("http://") || raw.starts_with("https://") {
        match Url::parse(raw) {
            Ok(_) => host_and_path(raw).to_string(),
            Err(e) => {
                debug!("无法解析端点 URL {}，按原样处理: {}", raw, e);
                raw.to_string()
            }
        }
    } else {
        raw.to_string()
    };

    if host.ends_with('/') {
        host.pop();
    }
    if host.ends_with(DEFAULT_PORT_SUFFIX) {
        host.truncate(host.len() - DEFAULT_PORT_SUFFIX.len());
    }

    Ok(host)
}

/// 取 URL 原文中的 host[:port] 与路径：去掉 scheme、用户信息、查询串和片段
fn host_and_path(raw: &str) -> &str {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let rest = rest
        .find(|c| c == '?' || c == '#')
        .map_or(rest, |end| &rest[..end]);

    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    }
}
