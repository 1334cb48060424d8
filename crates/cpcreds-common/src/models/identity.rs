//! 集群身份模型
//!
//! 集群身份由规范化后的端点主机和可选的 CA 证书字节组成，
//! 用于在候选集群记录中定位调用方的目标集群。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::normalize_host;

/// 集群身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterIdentity {
    /// 规范化后的主机（见 [`normalize_host`]）
    pub host: String,
    /// CA 证书数据（原始字节）
    pub ca_data: Option<Vec<u8>>,
}

impl ClusterIdentity {
    /// 从原始端点地址创建集群身份，主机会被规范化
    pub fn new(server: &str, ca_data: Option<Vec<u8>>) -> Result<Self> {
        Ok(Self {
            host: normalize_host(server)?,
            ca_data,
        })
    }

    /// 是否携带非空的 CA 数据
    pub fn has_ca(&self) -> bool {
        self.ca_data.as_ref().is_some_and(|ca| !ca.is_empty())
    }

    /// 以当前身份作为查询方，判断候选身份是否匹配
    ///
    /// 主机必须相同；只有查询方携带非空 CA 时才比较 CA，
    /// 此时候选方必须拥有逐字节相同的 CA。
    pub fn matches(&self, candidate: &ClusterIdentity) -> bool {
        if self.host != candidate.host {
            return false;
        }
        if !self.has_ca() {
            return true;
        }
        self.ca_data == candidate.ca_data
    }
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 不输出 CA 内容
        write!(f, "{} (ca={})", self.host, if self.has_ca() { "yes" } else { "no" })
    }
}

/// 集群记录
///
/// 外部来源（ClusterProfile、云端集群目录）中一条集群与凭据来源的对应关系，
/// 每次调用重新构建。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    /// 记录名称（匹配成功后用于查找凭据）
    pub name: String,
    /// 凭据提供方名称
    pub provider_name: String,
    /// 记录对应的集群身份
    pub identity: ClusterIdentity,
}

impl ClusterRecord {
    /// 创建新的集群记录
    pub fn new(
        name: impl Into<String>,
        provider_name: impl Into<String>,
        server: &str,
        ca_data: Option<Vec<u8>>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            provider_name: provider_name.into(),
            identity: ClusterIdentity::new(server, ca_data)?,
        })
    }
}
