//! 按 kubeconfig 扩展配置读取令牌的凭据提供方
//!
//! kubeconfig 的 exec 配置通过 `provideClusterInfo` 把集群扩展
//! (`spec.cluster.config`) 传给插件，扩展中指明令牌所在的 Secret：
//!
//! ```json
//! { "secretName": "cp-1", "secretNamespace": "fleet", "key": "token" }
//! ```

pub mod provider;

pub use provider::{ExecConfig, KubeconfigSecretReader, PROVIDER_NAME};
