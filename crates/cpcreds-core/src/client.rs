//! Kubernetes 客户端构建模块
//!
//! 客户端在第一次使用时才构建：优先使用集群内配置，失败时回退到
//! 指定的 kubeconfig 路径，未指定路径时使用 kube 的默认发现规则。
//! 工厂作为构造参数传入各提供方，测试可以直接注入现成的客户端。

use std::path::{Path, PathBuf};

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use cpcreds_common::{Error, Result};

/// 延迟构建的 Kubernetes 客户端工厂
pub struct KubeClientFactory {
    /// 回退使用的 kubeconfig 路径
    kubeconfig: Option<PathBuf>,
    /// 已构建的客户端
    client: OnceCell<Client>,
}

impl KubeClientFactory {
    /// 创建新的客户端工厂
    pub fn new(kubeconfig: Option<PathBuf>) -> Self {
        Self {
            kubeconfig,
            client: OnceCell::new(),
        }
    }

    /// 使用已有客户端创建工厂
    pub fn with_client(client: Client) -> Self {
        Self {
            kubeconfig: None,
            client: OnceCell::new_with(Some(client)),
        }
    }

    /// 获取客户端，首次调用时构建
    pub async fn client(&self) -> Result<Client> {
        self.client
            .get_or_try_init(|| build_default_client(self.kubeconfig.as_deref()))
            .await
            .cloned()
    }
}

/// 构建默认客户端
pub async fn build_default_client(kubeconfig: Option<&Path>) -> Result<Client> {
    let config = match Config::incluster() {
        Ok(config) => {
            debug!("使用集群内配置");
            config
        }
        Err(e) => {
            debug!("集群内配置不可用，回退到 kubeconfig: {}", e);
            load_kubeconfig(kubeconfig).await?
        }
    };

    let client = Client::try_from(config)
        .map_err(|e| Error::upstream("创建 Kubernetes 客户端", e))?;
    info!("Kubernetes 客户端已就绪");
    Ok(client)
}

/// 从 kubeconfig 加载客户端配置
async fn load_kubeconfig(path: Option<&Path>) -> Result<Config> {
    let options = KubeConfigOptions::default();
    match path {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::upstream(format!("读取 kubeconfig {}", path.display()), e)
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| Error::upstream("构建 kube 客户端配置", e))
        }
        None => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| Error::upstream("构建 kube 客户端配置", e)),
    }
}
