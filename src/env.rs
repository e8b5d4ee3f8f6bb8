//! 统一的环境变量管理系统
//!
//! 进程级设置（监听地址、日志级别、配置文件路径）通过类型安全的访问器读取

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "WEBLINGO_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用彩色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 代理服务器相关环境变量
pub mod server {
    use super::*;

    /// 监听地址
    pub struct BindAddress;
    impl EnvVar<String> for BindAddress {
        const NAME: &'static str = "WEBLINGO_BIND_ADDRESS";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Address the proxy listens on";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("127.0.0.1".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Bind address cannot be empty".to_string(),
                });
            }
            Ok(value.to_string())
        }
    }

    /// 监听端口
    pub struct Port;
    impl EnvVar<u16> for Port {
        const NAME: &'static str = "WEBLINGO_PORT";
        const DEFAULT: Option<u16> = Some(8787);
        const DESCRIPTION: &'static str = "Port the proxy listens on";

        fn parse(value: &str) -> EnvResult<u16> {
            match value.trim().parse::<u16>() {
                Ok(0) => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Port cannot be 0".to_string(),
                }),
                Ok(port) => Ok(port),
                Err(_) => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid port number '{}'", value),
                }),
            }
        }
    }

    /// 设置文件路径（可选）
    pub struct ConfigPath;
    impl EnvVar<Option<String>> for ConfigPath {
        const NAME: &'static str = "WEBLINGO_CONFIG";
        const DEFAULT: Option<Option<String>> = Some(None);
        const DESCRIPTION: &'static str = "Path to a weblingo.toml settings file";

        fn parse(value: &str) -> EnvResult<Option<String>> {
            let value = value.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
    }
}

/// 所有已知变量及其说明，用于命令行帮助
pub fn documented_variables() -> Vec<(&'static str, &'static str)> {
    vec![
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION),
        (server::BindAddress::NAME, server::BindAddress::DESCRIPTION),
        (server::Port::NAME, server::Port::DESCRIPTION),
        (server::ConfigPath::NAME, server::ConfigPath::DESCRIPTION),
    ]
}
