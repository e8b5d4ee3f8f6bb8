//! 边缘端错误
//!
//! 每个错误都会在编排器中被吸收，变成直通或空操作

use thiserror::Error;

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// 配置获取失败，整个请求直通
    Configuration,
    /// 源站请求失败
    Origin,
    /// 内容无法增强
    Content,
    /// 缓存读写失败，视为未命中
    Cache,
    /// 主动不处理的请求
    NotApplicable,
}

/// 边缘端错误类型
#[derive(Error, Debug)]
pub enum EdgeError {
    /// 未配置 API 密钥
    #[error("未配置 API 密钥")]
    MissingApiKey,

    /// 不增强的请求方法
    #[error("请求方法 {0} 不做增强")]
    MethodNotAugmented(String),

    /// 配置服务不可用
    #[error("项目配置获取失败: {0}")]
    ConfigUnavailable(String),

    /// 项目没有目标语言
    #[error("项目未配置目标语言")]
    NoTargetLanguages,

    /// 源站请求失败
    #[error("源站请求失败: {0}")]
    Origin(String),

    /// 上游返回非成功状态
    #[error("上游 {service} 返回 HTTP {status}")]
    UpstreamStatus { service: &'static str, status: u16 },

    /// 页面解码或处理失败
    #[error("页面处理失败: {0}")]
    Content(String),

    /// 缓存读写失败
    #[error("缓存错误: {0}")]
    Cache(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Settings(String),

    /// 服务器错误
    #[error("服务器错误: {0}")]
    Server(String),
}

impl EdgeError {
    pub fn category(&self) -> FailureCategory {
        match self {
            EdgeError::MissingApiKey | EdgeError::MethodNotAugmented(_) => FailureCategory::NotApplicable,
            EdgeError::ConfigUnavailable(_) | EdgeError::NoTargetLanguages => {
                FailureCategory::Configuration
            }
            EdgeError::UpstreamStatus { service, .. } if *service != "origin" => {
                FailureCategory::Configuration
            }
            EdgeError::Origin(_) | EdgeError::UpstreamStatus { .. } => FailureCategory::Origin,
            EdgeError::Content(_) => FailureCategory::Content,
            EdgeError::Cache(_) => FailureCategory::Cache,
            EdgeError::Settings(_) | EdgeError::Server(_) => FailureCategory::Configuration,
        }
    }

    /// 按类别记录日志
    pub fn log_passthrough(&self) {
        match self.category() {
            FailureCategory::NotApplicable => tracing::debug!("直通: {}", self),
            _ => tracing::warn!(category = ?self.category(), "增强失败，直通原请求: {}", self),
        }
    }
}

impl From<config::ConfigError> for EdgeError {
    fn from(err: config::ConfigError) -> Self {
        EdgeError::Settings(err.to_string())
    }
}

impl From<url::ParseError> for EdgeError {
    fn from(err: url::ParseError) -> Self {
        EdgeError::Settings(format!("无效的 URL: {}", err))
    }
}

impl From<crate::translation::TranslationError> for EdgeError {
    fn from(err: crate::translation::TranslationError) -> Self {
        EdgeError::Content(err.to_string())
    }
}

/// 边缘端结果类型别名
pub type EdgeResult<T> = Result<T, EdgeError>;
