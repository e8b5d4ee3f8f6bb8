//! 翻译模块统一错误处理
//!
//! 引擎内的错误在离调用点最近的地方被吸收，只会让本轮翻译没有新结果

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译服务返回非成功状态
    #[error("翻译服务错误: HTTP {0}")]
    ServiceStatus(u16),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// DOM 解析或序列化错误
    #[error("文档处理错误: {0}")]
    DocumentError(String),
}

impl TranslationError {
    /// 错误类别，用于日志
    pub fn category(&self) -> &'static str {
        match self {
            TranslationError::ConfigError(_) => "config",
            TranslationError::NetworkError(_) => "network",
            TranslationError::ServiceStatus(_) => "service",
            TranslationError::TimeoutError(_) => "timeout",
            TranslationError::ParseError(_) => "parse",
            TranslationError::DocumentError(_) => "document",
        }
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            TranslationError::ParseError(err.to_string())
        } else if let Some(status) = err.status() {
            TranslationError::ServiceStatus(status.as_u16())
        } else {
            TranslationError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(err: serde_json::Error) -> Self {
        TranslationError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(err: std::io::Error) -> Self {
        TranslationError::DocumentError(err.to_string())
    }
}

impl From<url::ParseError> for TranslationError {
    fn from(err: url::ParseError) -> Self {
        TranslationError::ConfigError(format!("无效的服务地址: {}", err))
    }
}

/// 翻译结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
