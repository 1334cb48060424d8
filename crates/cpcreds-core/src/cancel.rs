//! 取消控制模块
//!
//! 每次调用只有一个取消令牌，所有外部查找都通过 [`guarded`] 与它竞争，
//! 令牌被取消时立即返回 [`Error::Cancelled`]。

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use cpcreds_common::{Error, Result};

/// 在取消令牌的约束下执行外部调用
pub async fn guarded<T, F>(ctx: &CancellationToken, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if ctx.is_cancelled() {
        return Err(Error::Cancelled(operation.to_string()));
    }

    tokio::select! {
        biased;
        _ = ctx.cancelled() => {
            debug!("操作 {} 因取消而中止", operation);
            Err(Error::Cancelled(operation.to_string()))
        }
        result = fut => result,
    }
}

/// 启动调用看门狗：收到 Ctrl-C 或超过截止时间时取消令牌
///
/// 调用结束后应 `abort` 返回的任务句柄。
pub fn spawn_watchdog(ctx: CancellationToken, timeout: Option<Duration>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = wait_for_interrupt(tokio::signal::ctrl_c()) => warn!("收到中断信号，取消当前调用"),
            _ = deadline => warn!("调用超过截止时间 {:?}，取消当前调用", timeout),
        }
        ctx.cancel();
    })
}

/// 等待中断信号；无法监听信号时永不返回，只由截止时间触发取消
async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("无法监听中断信号: {}", e);
        std::future::pending::<()>().await;
    }
}
