//! 基于 Secret 的凭据提供方
//!
//! 在 ClusterProfile 自定义资源中查找与目标集群匹配的记录，
//! 再从同名 Secret 中读取令牌。

pub mod crd;
pub mod profiles;
pub mod provider;

pub use crd::{ClusterProfile, ClusterProfileSpec, ClusterProfileStatus, CredentialProviderEntry};
pub use profiles::{cluster_records, ClusterProfileSource, KubeClusterProfiles};
pub use provider::{SecretReaderProvider, DEFAULT_TOKEN_KEY, PROVIDER_NAME};
