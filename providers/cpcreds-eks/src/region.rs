//! 区域推断模块
//!
//! EKS 端点形如 `<id>.<zone>.<region>.eks.amazonaws.com`，区域只从
//! 主机名后缀推断；不符合该模式的主机（如私有 DNS 别名）直接报错。

use once_cell::sync::Lazy;
use regex::Regex;

use cpcreds_common::{Error, Result};

/// EKS 托管集群域名模式
static EKS_HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r".*\.([a-z0-9-]+)\.eks(-fips)?\.amazonaws\.com(\.cn)?$").expect("EKS 主机名模式无效")
});

/// 从规范化主机推断区域，路径部分会被忽略
pub fn infer_region(host: &str) -> Result<String> {
    let hostname = host.split('/').next().unwrap_or(host);

    EKS_HOST_PATTERN
        .captures(hostname)
        .and_then(|captures| captures.get(1))
        .map(|region| region.as_str().to_string())
        .ok_or_else(|| Error::Lookup(format!("无法从服务器主机名解析区域: {}", host)))
}
