//! ClusterProfile 列举模块

use std::sync::Arc;

use async_trait::async_trait;
use cpcreds_core::{guarded, CancellationToken, KubeClientFactory};
use kube::api::{Api, ListParams};
use kube::ResourceExt;
use tracing::debug;

use cpcreds_common::{ClusterRecord, Error, Result};

use crate::crd::ClusterProfile;

/// ClusterProfile 来源
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterProfileSource: Send + Sync {
    /// 列出命名空间中的全部 ClusterProfile
    async fn list_cluster_profiles(
        &self,
        ctx: &CancellationToken,
        namespace: &str,
    ) -> Result<Vec<ClusterProfile>>;
}

/// 基于 Kubernetes API 的 ClusterProfile 来源
pub struct KubeClusterProfiles {
    factory: Arc<KubeClientFactory>,
}

impl KubeClusterProfiles {
    /// 创建新的来源
    pub fn new(factory: Arc<KubeClientFactory>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl ClusterProfileSource for KubeClusterProfiles {
    async fn list_cluster_profiles(
        &self,
        ctx: &CancellationToken,
        namespace: &str,
    ) -> Result<Vec<ClusterProfile>> {
        let client = guarded(ctx, "构建 Kubernetes 客户端", self.factory.client()).await?;
        let api: Api<ClusterProfile> = Api::namespaced(client, namespace);

        let operation = format!("列出命名空间 {} 中的 ClusterProfile", namespace);
        let list = guarded(ctx, &operation, async {
            api.list(&ListParams::default())
                .await
                .map_err(|e| Error::upstream(&operation, e))
        })
        .await?;

        debug!("{}: {} 个", operation, list.items.len());
        Ok(list.items)
    }
}

/// 把 ClusterProfile 展开为指定提供方的集群记录，保持列表顺序
///
/// 端点为空或无法规范化的条目会被跳过。
pub fn cluster_records(profiles: &[ClusterProfile], provider_name: &str) -> Vec<ClusterRecord> {
    profiles
        .iter()
        .flat_map(|profile| {
            let name = profile.name_any();
            profile
                .status
                .iter()
                .flat_map(|status| status.credential_providers.iter())
                .filter(move |entry| entry.name == provider_name)
                .filter_map(move |entry| {
                    ClusterRecord::new(
                        name.clone(),
                        entry.name.clone(),
                        &entry.cluster.server,
                        entry.cluster.certificate_authority_data.as_ref().map(|ca| ca.0.clone()),
                    )
                    .map_err(|e| debug!("跳过 ClusterProfile {}: {}", name, e))
                    .ok()
                })
        })
        .collect()
}
