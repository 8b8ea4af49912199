//! 应用层错误定义
//!
//! 统一的命令/查询错误类型。
//! “没有可用音色”与“默认音色提升被拒绝”是常规结果，由各 Handler 以枚举返回，不在此列。

use thiserror::Error;

use crate::application::ports::{RepositoryError, TtsError};
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 资源冲突（如重名）
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 仓储错误（元数据存储故障，原样传播）
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),

    /// 外部合成服务错误
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(#[from] TtsError),

    /// 存储错误（参考音频读取失败等）
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 功能不可用（如降级模式下的目录管理）
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建冲突错误
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
