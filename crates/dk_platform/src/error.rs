use thiserror::Error;

/// 平台错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// 原生资源创建错误
    #[error("native resource creation failed: {0}")]
    ResourceCreation(String),

    #[error("{primitive} is not available on platform '{platform}'")]
    Unsupported { platform: String, primitive: String },

    /// 控件没有原生句柄
    #[error("control exposes no native handle")]
    HandleUnavailable,

    #[error("event dispatch failed: {0}")]
    Dispatch(String),

    /// 显示连接错误
    #[error("display connection error: {0}")]
    Connection(String),
}

impl PlatformError {
    pub fn unsupported(platform: impl Into<String>, primitive: impl Into<String>) -> Self {
        PlatformError::Unsupported {
            platform: platform.into(),
            primitive: primitive.into(),
        }
    }
}
