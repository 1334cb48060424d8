//! 基于 EKS 的凭据提供方
//!
//! 从 API 服务器主机名推断区域，在该区域的 EKS 集群中查找端点与 CA
//! 匹配的集群，再签发 IAM 身份令牌。

pub mod directory;
pub mod provider;
pub mod region;
pub mod token;

pub use directory::{ClusterDirectory, ClusterEndpoint, ClusterPage, DirectoryConnector, SdkDirectoryConnector};
pub use provider::{EksProvider, PROVIDER_NAME};
pub use region::infer_region;
pub use token::{MintedToken, StsTokenGenerator, TokenGenerator};

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// 加载指定区域的 AWS SDK 配置（默认凭据链）
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
