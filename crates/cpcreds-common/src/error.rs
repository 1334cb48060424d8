//! 错误处理模块
//!
//! 该模块提供凭据插件的统一错误类型。错误分为输入错误、查找错误、
//! 上游调用错误和取消四大类，调用方通过 [`Error::kind`] 分类处理，
//! 不需要匹配错误消息文本。

use std::io;
use thiserror::Error;

/// 凭据插件统一错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 请求格式错误、缺少集群身份或扩展字段为空
    #[error("输入错误: {0}")]
    Input(String),

    /// 找不到匹配的集群，或匹配记录对应的存储值缺失/为空
    #[error("查找失败: {0}")]
    Lookup(String),

    /// 外部 API 调用失败（列举、描述、读取、签发）
    #[error("上游调用失败: {operation}: {message}")]
    Upstream {
        /// 失败的操作及其上下文
        operation: String,
        /// 上游返回的错误信息
        message: String,
    },

    /// 调用上下文被取消或超时
    #[error("操作已取消: {0}")]
    Cancelled(String),

    /// 响应序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),

    /// JSON 错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),
}

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 输入错误
    Input,
    /// 查找错误
    Lookup,
    /// 上游错误
    Upstream,
    /// 已取消
    Cancelled,
    /// 内部错误（序列化、I/O）
    Internal,
}

impl Error {
    /// 构造上游调用错误
    pub fn upstream(operation: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Error::Upstream {
            operation: operation.into(),
            message: source.to_string(),
        }
    }

    /// 获取错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Input(_) => ErrorKind::Input,
            Error::Lookup(_) => ErrorKind::Lookup,
            Error::Upstream { .. } => ErrorKind::Upstream,
            Error::Cancelled(_) => ErrorKind::Cancelled,
            Error::Serialization(_) | Error::Json(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }
}

/// 凭据插件结果类型别名
pub type Result<T> = std::result::Result<T, Error>;
