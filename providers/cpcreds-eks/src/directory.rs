//! EKS 集群目录模块
//!
//! 分页列出区域内的集群名称，并逐个描述以获得端点与 CA。

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_eks::error::DisplayErrorContext;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cpcreds_core::{guarded, CancellationToken};
use tracing::{debug, warn};

use cpcreds_common::{ClusterIdentity, Error, Result};

use crate::load_sdk_config;

/// 一页集群名称
#[derive(Debug, Clone, Default)]
pub struct ClusterPage {
    /// 集群名称
    pub clusters: Vec<String>,
    /// 下一页标记
    pub next_token: Option<String>,
}

/// 集群端点信息
#[derive(Debug, Clone, Default)]
pub struct ClusterEndpoint {
    /// API 服务器端点
    pub endpoint: Option<String>,
    /// CA 证书数据（base64 文本）
    pub certificate_authority: Option<String>,
}

impl ClusterEndpoint {
    /// 转换为集群身份；缺少端点时返回 `None`，无法解码的 CA 视为没有 CA
    pub fn identity(&self) -> Option<ClusterIdentity> {
        let endpoint = self.endpoint.as_deref().filter(|e| !e.is_empty())?;
        let ca_data = self
            .certificate_authority
            .as_deref()
            .and_then(|data| match STANDARD.decode(data) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("集群 {} 的 CA 数据无法解码: {}", endpoint, e);
                    None
                }
            });
        ClusterIdentity::new(endpoint, ca_data).ok()
    }
}

/// 云端集群目录
#[async_trait]
pub trait ClusterDirectory: Send + Sync {
    /// 列出一页集群名称
    async fn list_clusters(
        &self,
        ctx: &CancellationToken,
        next_token: Option<String>,
    ) -> Result<ClusterPage>;

    /// 描述集群，集群不存在时返回 `None`
    async fn describe_cluster(
        &self,
        ctx: &CancellationToken,
        name: &str,
    ) -> Result<Option<ClusterEndpoint>>;
}

/// 按区域创建集群目录
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// 连接指定区域的集群目录
    async fn connect(
        &self,
        ctx: &CancellationToken,
        region: &str,
    ) -> Result<Arc<dyn ClusterDirectory>>;
}

/// 基于 AWS SDK 默认凭据链的目录连接器
#[derive(Debug, Clone, Default)]
pub struct SdkDirectoryConnector;

#[async_trait]
impl DirectoryConnector for SdkDirectoryConnector {
    async fn connect(
        &self,
        ctx: &CancellationToken,
        region: &str,
    ) -> Result<Arc<dyn ClusterDirectory>> {
        let config = guarded(ctx, "加载 AWS 配置", async { Ok(load_sdk_config(region).await) }).await?;
        debug!("已加载区域 {} 的 AWS 配置", region);
        Ok(Arc::new(SdkClusterDirectory {
            client: aws_sdk_eks::Client::new(&config),
        }))
    }
}

/// 基于 AWS SDK 的集群目录
pub struct SdkClusterDirectory {
    client: aws_sdk_eks::Client,
}

impl SdkClusterDirectory {
    /// 使用现有 EKS 客户端创建目录
    pub fn new(client: aws_sdk_eks::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterDirectory for SdkClusterDirectory {
    async fn list_clusters(
        &self,
        ctx: &CancellationToken,
        next_token: Option<String>,
    ) -> Result<ClusterPage> {
        let operation = "列出 EKS 集群";
        let output = guarded(ctx, operation, async {
            self.client
                .list_clusters()
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| Error::upstream(operation, DisplayErrorContext(e)))
        })
        .await?;

        Ok(ClusterPage {
            clusters: output.clusters().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn describe_cluster(
        &self,
        ctx: &CancellationToken,
        name: &str,
    ) -> Result<Option<ClusterEndpoint>> {
        let operation = format!("描述 EKS 集群 {}", name);
        let result = guarded(ctx, &operation, async {
            Ok(self.client.describe_cluster().name(name).send().await)
        })
        .await?;

        let output = match result {
            Ok(output) => output,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                debug!("集群 {} 已不存在，跳过", name);
                return Ok(None);
            }
            Err(e) => return Err(Error::upstream(&operation, DisplayErrorContext(e))),
        };

        Ok(output.cluster().map(|cluster| ClusterEndpoint {
            endpoint: cluster.endpoint().map(str::to_string),
            certificate_authority: cluster
                .certificate_authority()
                .and_then(|ca| ca.data())
                .map(str::to_string),
        }))
    }
}
