//! 命令行配置模块
//!
//! 所有插件共享的命令行参数，同时支持从环境变量读取。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use crate::client::KubeClientFactory;
use crate::harness::RunOptions;

/// 插件共享参数
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// 集群内配置不可用时使用的 kubeconfig 路径
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// 单次调用的截止时间（秒），0 表示不限时
    #[arg(long, env = "CPCREDS_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// 日志过滤指令，如 "debug" 或 "cpcreds_core=trace"
    #[arg(long, env = "CPCREDS_LOG")]
    pub log_level: Option<String>,
}

impl CommonArgs {
    /// 执行选项
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            timeout: (self.timeout > 0).then(|| Duration::from_secs(self.timeout)),
        }
    }

    /// 延迟构建的 Kubernetes 客户端工厂
    pub fn client_factory(&self) -> Arc<KubeClientFactory> {
        Arc::new(KubeClientFactory::new(self.kubeconfig.clone()))
    }
}
