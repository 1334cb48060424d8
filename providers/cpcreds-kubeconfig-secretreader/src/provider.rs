//! 扩展配置驱动的 Secret 令牌提供方

use std::sync::Arc;

use async_trait::async_trait;
use cpcreds_core::{CancellationToken, CredentialProvider, KubeClientFactory, KubeSecretStore, SecretStore};
use serde::Deserialize;
use tracing::{debug, info};

use cpcreds_common::{CredentialRequest, CredentialResponse, Error, ExecCredentialStatus, Result};

/// 提供方名称
pub const PROVIDER_NAME: &str = "kubeconfig-secretreader";

/// 集群扩展中的 Secret 定位信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecConfig {
    /// Secret 名称
    pub secret_name: String,
    /// Secret 所在命名空间
    pub secret_namespace: String,
    /// 令牌所在的键
    pub key: String,
}

impl ExecConfig {
    /// 从请求扩展解析配置，去除首尾空白并校验三个字段均非空
    pub fn from_extensions(extensions: Option<&serde_json::Value>) -> Result<Self> {
        let raw = extensions
            .filter(|value| !value.is_null())
            .ok_or_else(|| Error::Input("请求缺少 spec.cluster.config".to_string()))?;

        let config: ExecConfig = serde_json::from_value(raw.clone())
            .map_err(|e| Error::Input(format!("无效的扩展配置: {}", e)))?;
        let config = ExecConfig {
            secret_name: config.secret_name.trim().to_string(),
            secret_namespace: config.secret_namespace.trim().to_string(),
            key: config.key.trim().to_string(),
        };

        if config.secret_name.is_empty() || config.secret_namespace.is_empty() || config.key.is_empty() {
            return Err(Error::Input(
                "扩展配置必须包含 secretName、secretNamespace 和 key".to_string(),
            ));
        }
        Ok(config)
    }
}

/// 扩展配置驱动的 Secret 令牌提供方
pub struct KubeconfigSecretReader {
    secrets: Arc<dyn SecretStore>,
}

impl KubeconfigSecretReader {
    /// 创建新的提供方
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }

    /// 使用 Kubernetes API 创建提供方
    pub fn from_factory(factory: Arc<KubeClientFactory>) -> Self {
        Self::new(Arc::new(KubeSecretStore::new(factory)))
    }

    /// 读取扩展指定的 Secret 键作为令牌，令牌不带过期时间
    pub async fn get_token(
        &self,
        ctx: &CancellationToken,
        request: &CredentialRequest,
    ) -> Result<ExecCredentialStatus> {
        let config = ExecConfig::from_extensions(request.extensions.as_ref())?;
        let location = format!("{}/{}", config.secret_namespace, config.secret_name);
        debug!("集群 {} 使用 Secret {}", request.cluster.host, location);

        let data = self
            .secrets
            .get_secret_data(ctx, &config.secret_namespace, &config.secret_name)
            .await?
            .ok_or_else(|| Error::Lookup(format!("Secret {} 不存在", location)))?;

        let value = data
            .get(&config.key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Lookup(format!("Secret {} 缺少 {:?} 键", location, config.key)))?;

        let token = String::from_utf8(value.clone()).map_err(|_| {
            Error::Lookup(format!("Secret {} 的 {:?} 键不是有效的 UTF-8", location, config.key))
        })?;
        info!("已从 Secret {} 读取令牌", location);
        Ok(ExecCredentialStatus {
            token,
            ..Default::default()
        })
    }
}

#[async_trait]
impl CredentialProvider for KubeconfigSecretReader {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn resolve_token(
        &self,
        ctx: &CancellationToken,
        request: &CredentialRequest,
    ) -> Result<CredentialResponse> {
        self.get_token(ctx, request).await.map(CredentialResponse::from)
    }
}
