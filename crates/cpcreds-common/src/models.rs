//! 数据模型模块
//!
//! 该模块定义了集群身份、集群记录，以及 exec 凭据协议的请求/响应结构。

pub mod exec_credential;
pub mod identity;
