//! ClusterProfile 自定义资源定义
//!
//! 只声明插件读取的字段：`status.credentialProviders` 中每个凭据提供方
//! 对应的集群端点与 CA。

use k8s_openapi::ByteString;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// ClusterProfile 规范
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default)]
#[kube(
    group = "multicluster.x-k8s.io",
    version = "v1alpha1",
    kind = "ClusterProfile",
    namespaced
)]
#[kube(status = "ClusterProfileStatus")]
#[kube(schema = "disabled")]
#[serde(rename_all = "camelCase")]
pub struct ClusterProfileSpec {
    /// 展示名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// 管理该集群的管理器
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_manager: Option<ClusterManager>,
}

/// 集群管理器
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ClusterManager {
    /// 管理器名称
    pub name: String,
}

/// ClusterProfile 状态
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProfileStatus {
    /// 凭据提供方列表
    #[serde(default)]
    pub credential_providers: Vec<CredentialProviderEntry>,
}

/// 凭据提供方条目
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CredentialProviderEntry {
    /// 提供方名称
    pub name: String,

    /// 访问集群所需的端点信息
    #[serde(default)]
    pub cluster: ClusterEndpoint,
}

/// 集群端点（kubeconfig 中 cluster 字段的子集）
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterEndpoint {
    /// API 服务器地址
    #[serde(default)]
    pub server: String,

    /// CA 证书数据
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<ByteString>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserialization() {
        let status: ClusterProfileStatus = serde_json::from_value(serde_json::json!({
            "credentialProviders": [{
                "name": "secretreader",
                "cluster": {
                    "server": "https://example.com:443/",
                    "certificate-authority-data": "Q0Ex"
                }
            }]
        }))
        .unwrap();

        let provider = &status.credential_providers[0];
        assert_eq!(provider.name, "secretreader");
        assert_eq!(provider.cluster.server, "https://example.com:443/");
        assert_eq!(
            provider.cluster.certificate_authority_data.as_ref().map(|ca| ca.0.as_slice()),
            Some(&b"CA1"[..])
        );
    }
}
