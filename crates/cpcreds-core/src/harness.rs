//! exec 协议执行框架
//!
//! 从 `KUBERNETES_EXEC_INFO` 读取请求，调用凭据提供方，把 ExecCredential
//! 写到标准输出。失败时只向标准错误输出一条消息并以非零状态退出，
//! 不做任何重试。

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cpcreds_common::{
    build_exec_credential_json_for, CredentialRequest, Error, ExecCredential, Result,
};

use crate::cancel::{guarded, spawn_watchdog};
use crate::provider::CredentialProvider;

/// 承载 exec 请求的环境变量
pub const EXEC_INFO_ENV: &str = "KUBERNETES_EXEC_INFO";

/// 执行选项
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 调用截止时间，`None` 表示不限时
    pub timeout: Option<Duration>,
}

/// 从环境变量读取并解析 exec 请求
pub fn read_exec_info() -> Result<CredentialRequest> {
    let raw = env::var(EXEC_INFO_ENV).ok();
    parse_exec_info(raw.as_deref())
}

/// 解析 exec 请求
pub fn parse_exec_info(raw: Option<&str>) -> Result<CredentialRequest> {
    let raw = raw
        .filter(|payload| !payload.trim().is_empty())
        .ok_or_else(|| Error::Input(format!("环境变量 {} 为空", EXEC_INFO_ENV)))?;

    let credential: ExecCredential = serde_json::from_str(raw)
        .map_err(|e| Error::Input(format!("无法解析 {}: {}", EXEC_INFO_ENV, e)))?;

    CredentialRequest::from_exec_credential(credential)
}

/// 调用提供方并把响应写入 `out`
pub async fn execute<W: Write>(
    provider: &dyn CredentialProvider,
    request: &CredentialRequest,
    ctx: &CancellationToken,
    out: &mut W,
) -> Result<()> {
    debug!("提供方 {} 处理集群 {}", provider.name(), request.cluster);

    let response = guarded(ctx, "解析令牌", provider.resolve_token(ctx, request)).await?;
    if response.token.is_empty() {
        return Err(Error::Lookup(format!("提供方 {} 返回了空令牌", provider.name())));
    }

    let body = build_exec_credential_json_for(request.response_api_version(), &response)?;
    out.write_all(&body)?;
    out.write_all(b"\n")?;
    out.flush()?;

    info!(
        "已为 {} 输出凭据 (expires_at={:?})",
        request.cluster.host, response.expires_at
    );
    Ok(())
}

/// 运行插件：读取请求、调用提供方、输出结果并返回进程退出码
pub async fn run(provider: &dyn CredentialProvider, options: &RunOptions) -> ExitCode {
    let ctx = CancellationToken::new();
    let watchdog = spawn_watchdog(ctx.clone(), options.timeout);

    let result = async {
        let request = read_exec_info()?;
        let mut stdout = io::stdout();
        execute(provider, &request, &ctx, &mut stdout).await
    }
    .await;

    watchdog.abort();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", provider.name(), e);
            ExitCode::FAILURE
        }
    }
}
