//! 基于 Secret 的令牌提供方

use std::sync::Arc;

use async_trait::async_trait;
use cpcreds_core::{CancellationToken, CredentialProvider, KubeClientFactory, KubeSecretStore, SecretStore};
use tracing::{debug, info};

use cpcreds_common::{pick_cluster, CredentialRequest, CredentialResponse, Error, Result};

use crate::profiles::{cluster_records, ClusterProfileSource, KubeClusterProfiles};

/// 提供方名称，同时用于筛选 ClusterProfile 中的凭据提供方条目
pub const PROVIDER_NAME: &str = "secretreader";

/// Secret 中存放令牌的默认键
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Secret 令牌提供方
///
/// 令牌本身不带过期时间，由负责轮换 Secret 的一方保证新鲜度。
pub struct SecretReaderProvider {
    /// ClusterProfile 来源
    profiles: Arc<dyn ClusterProfileSource>,
    /// Secret 存储
    secrets: Arc<dyn SecretStore>,
    /// ClusterProfile 与 Secret 所在命名空间
    namespace: String,
    /// 筛选用的提供方名称
    provider_name: String,
    /// 令牌所在的 Secret 键
    token_key: String,
}

impl SecretReaderProvider {
    /// 创建新的提供方
    pub fn new(
        profiles: Arc<dyn ClusterProfileSource>,
        secrets: Arc<dyn SecretStore>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            profiles,
            secrets,
            namespace: namespace.into(),
            provider_name: PROVIDER_NAME.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }

    /// 使用 Kubernetes API 创建提供方，客户端在首次调用时构建
    pub fn from_factory(factory: Arc<KubeClientFactory>, namespace: impl Into<String>) -> Self {
        Self::new(
            Arc::new(KubeClusterProfiles::new(factory.clone())),
            Arc::new(KubeSecretStore::new(factory)),
            namespace,
        )
    }

    /// 设置筛选用的提供方名称
    pub fn with_provider_name(mut self, provider_name: impl Into<String>) -> Self {
        self.provider_name = provider_name.into();
        self
    }

    /// 设置令牌所在的 Secret 键
    pub fn with_token_key(mut self, token_key: impl Into<String>) -> Self {
        self.token_key = token_key.into();
        self
    }

    /// 查找与请求匹配的 ClusterProfile 名称
    async fn matching_profile(
        &self,
        ctx: &CancellationToken,
        request: &CredentialRequest,
    ) -> Result<String> {
        let profiles = self
            .profiles
            .list_cluster_profiles(ctx, &self.namespace)
            .await?;
        let records = cluster_records(&profiles, &self.provider_name);
        debug!("提供方 {} 共有 {} 条候选记录", self.provider_name, records.len());

        pick_cluster(&records, &request.cluster)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Lookup(format!(
                    "命名空间 {} 中没有与 {} 匹配的 ClusterProfile",
                    self.namespace, request.server
                ))
            })
    }
}

#[async_trait]
impl CredentialProvider for SecretReaderProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn resolve_token(
        &self,
        ctx: &CancellationToken,
        request: &CredentialRequest,
    ) -> Result<CredentialResponse> {
        let name = self.matching_profile(ctx, request).await?;
        info!("集群 {} 匹配到 ClusterProfile {}/{}", request.cluster.host, self.namespace, name);

        let data = self
            .secrets
            .get_secret_data(ctx, &self.namespace, &name)
            .await?
            .ok_or_else(|| {
                Error::Lookup(format!("Secret {}/{} 不存在", self.namespace, name))
            })?;

        let value = data
            .get(&self.token_key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::Lookup(format!(
                    "Secret {}/{} 缺少 {:?} 键",
                    self.namespace, name, self.token_key
                ))
            })?;

        let token = String::from_utf8(value.clone()).map_err(|_| {
            Error::Lookup(format!(
                "Secret {}/{} 的 {:?} 键不是有效的 UTF-8",
                self.namespace, name, self.token_key
            ))
        })?;

        Ok(CredentialResponse::without_expiry(token))
    }
}
