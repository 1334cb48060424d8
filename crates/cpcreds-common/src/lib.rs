//! ClusterProfile 凭据插件 - 共享数据模型与匹配逻辑
//!
//! 该模块提供所有凭据插件共享的数据结构、错误类型，以及不含任何 I/O 的
//! 主机规范化与集群身份匹配算法。

pub mod error;
pub mod host;
pub mod matcher;
pub mod models;

/// 重新导出常用类型，方便使用
pub use error::{Error, ErrorKind, Result};
pub use host::normalize_host;
pub use matcher::pick_cluster;
pub use models::exec_credential::*;
pub use models::identity::*;
