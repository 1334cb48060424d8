//! 凭据提供方抽象
//!
//! 每个插件在进程启动时选定一个提供方，把集群身份解析为令牌。

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use cpcreds_common::{CredentialRequest, CredentialResponse, Result};

/// 凭据提供方
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// 提供方名称，用于错误输出
    fn name(&self) -> &str;

    /// 将请求中的集群身份解析为令牌
    ///
    /// 实现必须把 `ctx` 传递给每一次外部调用。
    async fn resolve_token(
        &self,
        ctx: &CancellationToken,
        request: &CredentialRequest,
    ) -> Result<CredentialResponse>;
}
