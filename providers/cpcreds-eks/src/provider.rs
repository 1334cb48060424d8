//! EKS 令牌提供方

use std::sync::Arc;

use async_trait::async_trait;
use cpcreds_core::{CancellationToken, CredentialProvider};
use tracing::{debug, info};

use cpcreds_common::{ClusterIdentity, CredentialRequest, CredentialResponse, Error, Result};

use crate::directory::{ClusterDirectory, DirectoryConnector, SdkDirectoryConnector};
use crate::region::infer_region;
use crate::token::{StsTokenGenerator, TokenGenerator};

/// 提供方名称
pub const PROVIDER_NAME: &str = "eks";

/// EKS 令牌提供方
pub struct EksProvider {
    /// 集群目录连接器
    directories: Arc<dyn DirectoryConnector>,
    /// 令牌签发器
    generator: Arc<dyn TokenGenerator>,
}

impl EksProvider {
    /// 创建新的提供方
    pub fn new(directories: Arc<dyn DirectoryConnector>, generator: Arc<dyn TokenGenerator>) -> Self {
        Self {
            directories,
            generator,
        }
    }

    /// 使用 AWS 默认凭据链创建提供方
    pub fn from_default_chain() -> Self {
        Self::new(Arc::new(SdkDirectoryConnector), Arc::new(StsTokenGenerator))
    }
}

/// 逐页查找与目标身份匹配的集群，找到第一个匹配即停止
async fn find_cluster(
    directory: &dyn ClusterDirectory,
    ctx: &CancellationToken,
    target: &ClusterIdentity,
) -> Result<Option<String>> {
    let mut next_token = None;
    loop {
        let page = directory.list_clusters(ctx, next_token.take()).await?;
        debug!("本页 {} 个集群", page.clusters.len());

        for name in &page.clusters {
            if ctx.is_cancelled() {
                return Err(Error::Cancelled(format!("描述 EKS 集群 {}", name)));
            }
            let Some(endpoint) = directory.describe_cluster(ctx, name).await? else {
                continue;
            };
            let Some(candidate) = endpoint.identity() else {
                debug!("集群 {} 没有可用端点，跳过", name);
                continue;
            };
            if target.matches(&candidate) {
                return Ok(Some(name.clone()));
            }
        }

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => return Ok(None),
        }
    }
}

#[async_trait]
impl CredentialProvider for EksProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn resolve_token(
        &self,
        ctx: &CancellationToken,
        request: &CredentialRequest,
    ) -> Result<CredentialResponse> {
        let region = infer_region(&request.cluster.host)?;
        let directory = self.directories.connect(ctx, &region).await?;

        let cluster = find_cluster(directory.as_ref(), ctx, &request.cluster)
            .await?
            .ok_or_else(|| {
                Error::Lookup(format!(
                    "没有与端点 {} 匹配的 EKS 集群 (region={})",
                    request.server, region
                ))
            })?;
        info!("端点 {} 匹配到 EKS 集群 {} (region={})", request.cluster.host, cluster, region);

        let minted = self.generator.generate(ctx, &region, &cluster).await?;
        Ok(CredentialResponse::expiring(minted.token, minted.expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{ClusterEndpoint, ClusterPage};
    use crate::token::{MintedToken, MockTokenGenerator};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use chrono::{Duration, Utc};
    use cpcreds_common::{ErrorKind, API_VERSION_V1BETA1, EXEC_CREDENTIAL_KIND};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const SERVER: &str = "https://abc.gr7.us-west-2.eks.amazonaws.com";

    /// 分页的内存集群目录，记录被描述过的集群
    #[derive(Default)]
    struct PagedDirectory {
        pages: Vec<Vec<&'static str>>,
        endpoints: HashMap<&'static str, ClusterEndpoint>,
        described: Mutex<Vec<String>>,
    }

    impl PagedDirectory {
        fn cluster(mut self, name: &'static str, endpoint: &str, ca: Option<&str>) -> Self {
            self.endpoints.insert(
                name,
                ClusterEndpoint {
                    endpoint: Some(endpoint.to_string()),
                    certificate_authority: ca.map(|ca| STANDARD.encode(ca.as_bytes())),
                },
            );
            self
        }

        fn described(&self) -> Vec<String> {
            self.described.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClusterDirectory for PagedDirectory {
        async fn list_clusters(
            &self,
            _ctx: &CancellationToken,
            next_token: Option<String>,
        ) -> Result<ClusterPage> {
            let index: usize = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            Ok(ClusterPage {
                clusters: self.pages[index].iter().map(|s| s.to_string()).collect(),
                next_token: (index + 1 < self.pages.len()).then(|| (index + 1).to_string()),
            })
        }

        async fn describe_cluster(
            &self,
            _ctx: &CancellationToken,
            name: &str,
        ) -> Result<Option<ClusterEndpoint>> {
            self.described.lock().unwrap().push(name.to_string());
            Ok(self.endpoints.get(name).cloned())
        }
    }

    struct FixedConnector(Arc<dyn ClusterDirectory>);

    /// 列出最后一页后取消调用上下文的目录
    struct CancellingDirectory {
        inner: PagedDirectory,
        ctx: CancellationToken,
    }

    #[async_trait]
    impl ClusterDirectory for CancellingDirectory {
        async fn list_clusters(
            &self,
            ctx: &CancellationToken,
            next_token: Option<String>,
        ) -> Result<ClusterPage> {
            let page = self.inner.list_clusters(ctx, next_token).await?;
            if page.next_token.is_none() {
                self.ctx.cancel();
            }
            Ok(page)
        }

        async fn describe_cluster(
            &self,
            ctx: &CancellationToken,
            name: &str,
        ) -> Result<Option<ClusterEndpoint>> {
            self.inner.describe_cluster(ctx, name).await
        }
    }

    #[async_trait]
    impl DirectoryConnector for FixedConnector {
        async fn connect(
            &self,
            _ctx: &CancellationToken,
            region: &str,
        ) -> Result<Arc<dyn ClusterDirectory>> {
            assert_eq!(region, "us-west-2");
            Ok(self.0.clone())
        }
    }

    fn request(server: &str, ca: Option<&str>) -> CredentialRequest {
        CredentialRequest {
            api_version: API_VERSION_V1BETA1.to_string(),
            kind: EXEC_CREDENTIAL_KIND.to_string(),
            server: server.to_string(),
            cluster: ClusterIdentity::new(server, ca.map(|ca| ca.as_bytes().to_vec())).unwrap(),
            extensions: None,
        }
    }

    fn generator_for(cluster: &'static str) -> MockTokenGenerator {
        let mut generator = MockTokenGenerator::new();
        generator
            .expect_generate()
            .withf(move |_, region, cluster_id| region == "us-west-2" && cluster_id == cluster)
            .times(1)
            .returning(|_, _, _| {
                Ok(MintedToken {
                    token: "k8s-aws-v1.minted".to_string(),
                    expires_at: Utc::now() + Duration::minutes(14),
                })
            });
        generator
    }

    #[tokio::test]
    async fn test_match_across_pages_stops_at_first() {
        let directory = Arc::new(
            PagedDirectory {
                pages: vec![vec!["staging"], vec!["prod", "prod-copy"], vec!["never"]],
                ..Default::default()
            }
            .cluster("staging", "https://xyz.gr7.us-west-2.eks.amazonaws.com", Some("CA0"))
            .cluster("prod", SERVER, Some("CA1"))
            .cluster("prod-copy", SERVER, Some("CA1")),
        );
        let provider = EksProvider::new(
            Arc::new(FixedConnector(directory.clone())),
            Arc::new(generator_for("prod")),
        );

        let response = provider
            .resolve_token(&CancellationToken::new(), &request(SERVER, Some("CA1")))
            .await
            .unwrap();

        assert_eq!(response.token, "k8s-aws-v1.minted");
        assert!(response.expires_at.is_some());
        assert_eq!(directory.described(), vec!["staging", "prod"]);
    }

    #[tokio::test]
    async fn test_ca_mismatch_skips_cluster() {
        let directory = Arc::new(
            PagedDirectory {
                pages: vec![vec!["old", "new"]],
                ..Default::default()
            }
            .cluster("old", SERVER, Some("CA-OLD"))
            .cluster("new", SERVER, Some("CA-NEW")),
        );
        let provider = EksProvider::new(
            Arc::new(FixedConnector(directory)),
            Arc::new(generator_for("new")),
        );

        provider
            .resolve_token(&CancellationToken::new(), &request(SERVER, Some("CA-NEW")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_matching_cluster_is_lookup_error() {
        let directory = Arc::new(
            PagedDirectory {
                pages: vec![vec!["other"]],
                ..Default::default()
            }
            .cluster("other", "https://xyz.gr7.us-west-2.eks.amazonaws.com", None),
        );
        // 未设置期望：若被调用 mock 会直接失败
        let provider = EksProvider::new(
            Arc::new(FixedConnector(directory)),
            Arc::new(MockTokenGenerator::new()),
        );

        let err = provider
            .resolve_token(&CancellationToken::new(), &request(SERVER, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert!(err.to_string().contains("us-west-2"));
    }

    #[tokio::test]
    async fn test_unknown_domain_fails_before_listing() {
        let directory = Arc::new(PagedDirectory::default());
        let provider = EksProvider::new(
            Arc::new(FixedConnector(directory.clone())),
            Arc::new(MockTokenGenerator::new()),
        );

        let err = provider
            .resolve_token(&CancellationToken::new(), &request("https://k8s.internal.corp", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert!(directory.described().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_during_pagination() {
        let ctx = CancellationToken::new();
        let directory = Arc::new(CancellingDirectory {
            inner: PagedDirectory {
                pages: vec![vec!["staging"], vec!["prod"]],
                ..Default::default()
            }
            .cluster("staging", "https://xyz.gr7.us-west-2.eks.amazonaws.com", None)
            .cluster("prod", SERVER, None),
            ctx: ctx.clone(),
        });
        // 未设置期望：取消后不应签发令牌
        let provider = EksProvider::new(
            Arc::new(FixedConnector(directory.clone())),
            Arc::new(MockTokenGenerator::new()),
        );

        let err = provider
            .resolve_token(&ctx, &request(SERVER, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(directory.inner.described(), vec!["staging"]);
    }

    #[tokio::test]
    async fn test_generator_failure_is_upstream() {
        let directory = Arc::new(
            PagedDirectory {
                pages: vec![vec!["prod"]],
                ..Default::default()
            }
            .cluster("prod", SERVER, None),
        );
        let mut generator = MockTokenGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _, _| Err(Error::upstream("获取 AWS 凭据", "no credentials")));
        let provider = EksProvider::new(Arc::new(FixedConnector(directory)), Arc::new(generator));

        let err = provider
            .resolve_token(&CancellationToken::new(), &request(SERVER, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }
}
