//! exec 凭据协议模型
//!
//! 定义 `client.authentication.k8s.io` 组的 ExecCredential 线上格式，
//! 以及插件内部使用的请求/响应结构和响应构建函数。

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::ByteString;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::identity::ClusterIdentity;

/// exec 凭据 API 组
pub const API_GROUP: &str = "client.authentication.k8s.io";

/// v1beta1 版本标识
pub const API_VERSION_V1BETA1: &str = "client.authentication.k8s.io/v1beta1";

/// v1 版本标识
pub const API_VERSION_V1: &str = "client.authentication.k8s.io/v1";

/// 资源类型
pub const EXEC_CREDENTIAL_KIND: &str = "ExecCredential";

/// ExecCredential 文档
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredential {
    /// API 版本
    #[serde(default)]
    pub api_version: String,
    /// 资源类型
    #[serde(default)]
    pub kind: String,
    /// 调用方传入的请求信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ExecCredentialSpec>,
    /// 插件返回的凭据
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecCredentialStatus>,
}

/// ExecCredential 请求部分
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredentialSpec {
    /// 目标集群信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Cluster>,
    /// 是否允许交互
    #[serde(default)]
    pub interactive: bool,
}

/// 目标集群信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    /// API 服务器地址
    #[serde(default)]
    pub server: String,
    /// TLS 服务器名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_server_name: Option<String>,
    /// 是否跳过 TLS 校验
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
    /// CA 证书数据（base64 编码）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<ByteString>,
    /// 代理地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// 是否禁用压缩
    #[serde(default)]
    pub disable_compression: bool,
    /// kubeconfig 中 exec 扩展的原始配置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// ExecCredential 返回的凭据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredentialStatus {
    /// 凭据过期时间，缺省表示不过期
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<Time>,
    /// 持有者令牌
    #[serde(default)]
    pub token: String,
}

/// 解析后的凭据请求
#[derive(Debug, Clone)]
pub struct CredentialRequest {
    /// 请求的 API 版本
    pub api_version: String,
    /// 请求的资源类型
    pub kind: String,
    /// 原始 API 服务器地址
    pub server: String,
    /// 目标集群身份
    pub cluster: ClusterIdentity,
    /// exec 扩展配置
    pub extensions: Option<serde_json::Value>,
}

impl CredentialRequest {
    /// 从 ExecCredential 文档构建请求，缺少集群身份时返回输入错误
    pub fn from_exec_credential(credential: ExecCredential) -> Result<Self> {
        let cluster = credential
            .spec
            .and_then(|spec| spec.cluster)
            .ok_or_else(|| Error::Input("ExecCredential 缺少 spec.cluster".to_string()))?;

        if cluster.server.trim().is_empty() {
            return Err(Error::Input("ExecCredential 缺少 spec.cluster.server".to_string()));
        }

        let identity = ClusterIdentity::new(
            &cluster.server,
            cluster.certificate_authority_data.map(|ca| ca.0),
        )?;

        Ok(Self {
            api_version: credential.api_version,
            kind: credential.kind,
            server: cluster.server,
            cluster: identity,
            extensions: cluster.config,
        })
    }

    /// 响应应使用的 API 版本：已知版本原样回应，否则使用 v1beta1
    pub fn response_api_version(&self) -> &str {
        match self.api_version.as_str() {
            API_VERSION_V1 | API_VERSION_V1BETA1 => &self.api_version,
            _ => API_VERSION_V1BETA1,
        }
    }
}

/// 凭据响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialResponse {
    /// 持有者令牌
    pub token: String,
    /// 过期时间
    pub expires_at: Option<DateTime<Utc>>,
}

impl CredentialResponse {
    /// 创建不过期的响应
    pub fn without_expiry(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// 创建带过期时间的响应
    pub fn expiring(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// 转换为线上格式的凭据状态，零值时间视为不过期
    pub fn to_status(&self) -> ExecCredentialStatus {
        ExecCredentialStatus {
            expiration_timestamp: self
                .expires_at
                .filter(|t| t.timestamp() > 0)
                .map(Time),
            token: self.token.clone(),
        }
    }

    /// 转换为完整的 ExecCredential 文档
    pub fn to_exec_credential(&self, api_version: &str) -> ExecCredential {
        ExecCredential {
            api_version: api_version.to_string(),
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            spec: None,
            status: Some(self.to_status()),
        }
    }
}

impl From<ExecCredentialStatus> for CredentialResponse {
    fn from(status: ExecCredentialStatus) -> Self {
        Self {
            token: status.token,
            expires_at: status.expiration_timestamp.map(|t| t.0),
        }
    }
}

/// 构建 v1beta1 ExecCredential JSON
pub fn build_exec_credential_json(token: &str, expires_at: Option<DateTime<Utc>>) -> Result<Vec<u8>> {
    let response = CredentialResponse {
        token: token.to_string(),
        expires_at,
    };
    build_exec_credential_json_for(API_VERSION_V1BETA1, &response)
}

/// 按指定 API 版本构建 ExecCredential JSON
pub fn build_exec_credential_json_for(api_version: &str, response: &CredentialResponse) -> Result<Vec<u8>> {
    serde_json::to_vec(&response.to_exec_credential(api_version))
        .map_err(|e| Error::Serialization(format!("无法序列化 ExecCredential: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_build_with_expiration() {
        let expires = Utc::now() + Duration::minutes(10);
        let bytes = build_exec_credential_json("test-token", Some(expires)).unwrap();

        let parsed: ExecCredential = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.api_version, API_VERSION_V1BETA1);
        assert_eq!(parsed.kind, EXEC_CREDENTIAL_KIND);

        let status = parsed.status.unwrap();
        assert_eq!(status.token, "test-token");
        let got = status.expiration_timestamp.unwrap().0;
        let delta = (got - expires).num_milliseconds().abs();
        assert!(delta <= 1000, "expiration drifted by {}ms", delta);
    }

    #[test]
    fn test_build_without_expiration() {
        let bytes = build_exec_credential_json("no-exp-token", None).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["status"]["token"], "no-exp-token");
        assert!(value["status"].get("expirationTimestamp").is_none());
    }

    #[test]
    fn test_zero_expiration_is_omitted() {
        let zero = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let bytes = build_exec_credential_json("t", Some(zero)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["status"].get("expirationTimestamp").is_none());
    }

    #[test]
    fn test_request_reads_ca_and_config() {
        let payload = r#"{
            "apiVersion": "client.authentication.k8s.io/v1",
            "kind": "ExecCredential",
            "spec": {
                "cluster": {
                    "server": "https://example.com:443/",
                    "certificate-authority-data": "Q0Ex",
                    "config": {"secretName": "s"}
                }
            }
        }"#;
        let credential: ExecCredential = serde_json::from_str(payload).unwrap();
        let request = CredentialRequest::from_exec_credential(credential).unwrap();

        assert_eq!(request.server, "https://example.com:443/");
        assert_eq!(request.cluster.host, "example.com");
        assert_eq!(request.cluster.ca_data.as_deref(), Some(&b"CA1"[..]));
        assert_eq!(request.extensions.as_ref().unwrap()["secretName"], "s");
        assert_eq!(request.response_api_version(), API_VERSION_V1);
    }

    #[test]
    fn test_request_without_cluster_is_input_error() {
        let credential = ExecCredential {
            api_version: API_VERSION_V1BETA1.to_string(),
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            spec: Some(ExecCredentialSpec::default()),
            status: None,
        };
        let err = CredentialRequest::from_exec_credential(credential).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Input);
    }
}
