//! ClusterProfile 凭据插件 - exec 协议执行框架
//!
//! 该模块实现 exec 凭据协议的请求读取、提供方调用与响应输出，
//! 并提供各插件共享的取消控制、Kubernetes 客户端构建、Secret 读取、
//! 命令行配置与日志初始化。

pub mod cancel;
pub mod client;
pub mod config;
pub mod harness;
pub mod logging;
pub mod provider;
pub mod secret;

pub use cancel::guarded;
pub use client::KubeClientFactory;
pub use config::CommonArgs;
pub use harness::{execute, parse_exec_info, read_exec_info, run, RunOptions, EXEC_INFO_ENV};
pub use provider::CredentialProvider;
pub use secret::{KubeSecretStore, SecretData, SecretStore};

pub use tokio_util::sync::CancellationToken;
