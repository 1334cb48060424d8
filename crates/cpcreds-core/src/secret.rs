//! Secret 读取模块

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::Api;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use cpcreds_common::{Error, Result};

use crate::cancel::guarded;
use crate::client::KubeClientFactory;

/// Secret 中的键值数据（已解码）
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// 键值 Secret 存储
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// 读取 Secret 数据，Secret 不存在时返回 `None`
    async fn get_secret_data(
        &self,
        ctx: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SecretData>>;
}

/// 基于 Kubernetes API 的 Secret 存储
pub struct KubeSecretStore {
    factory: Arc<KubeClientFactory>,
}

impl KubeSecretStore {
    /// 创建新的 Secret 存储
    pub fn new(factory: Arc<KubeClientFactory>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret_data(
        &self,
        ctx: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<Option<SecretData>> {
        let client = guarded(ctx, "构建 Kubernetes 客户端", self.factory.client()).await?;
        let api: Api<Secret> = Api::namespaced(client, namespace);

        let operation = format!("获取 Secret {}/{}", namespace, name);
        let secret = guarded(ctx, &operation, async {
            api.get_opt(name)
                .await
                .map_err(|e| Error::upstream(&operation, e))
        })
        .await?;

        debug!("{}: found={}", operation, secret.is_some());
        Ok(secret.map(|secret| {
            secret
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|(key, value)| (key, value.0))
                .collect()
        }))
    }
}
