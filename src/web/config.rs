//! 代理服务器配置
//!
//! 使用类型安全的环境变量系统进行配置管理，命令行参数可覆盖

use crate::env::{server, EnvError, EnvResult, EnvVar};

/// 代理服务器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// 绑定地址
    pub bind_addr: String,
    /// 端口
    pub port: u16,
    /// 设置文件路径
    pub settings_path: Option<String>,
}

impl ServerConfig {
    /// 从环境变量创建配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            bind_addr: server::BindAddress::get()?,
            port: server::Port::get()?,
            settings_path: server::ConfigPath::get()?,
        })
    }

    /// 用命令行参数覆盖
    pub fn with_overrides(
        mut self,
        bind_addr: Option<String>,
        port: Option<u16>,
        settings_path: Option<String>,
    ) -> Self {
        if let Some(bind_addr) = bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if settings_path.is_some() {
            self.settings_path = settings_path;
        }
        self
    }

    /// 验证配置
    pub fn validate(&self) -> EnvResult<()> {
        if self.bind_addr.trim().is_empty() {
            return Err(EnvError {
                variable: server::BindAddress::NAME.to_string(),
                message: "Bind address cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(EnvError {
                variable: server::Port::NAME.to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if let Some(ref path) = self.settings_path {
            if !std::path::Path::new(path).exists() {
                tracing::warn!("Settings file '{}' does not exist", path);
            }
        }

        Ok(())
    }

    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("Failed to load server config from environment: {}. Using defaults.", e);
            Self {
                bind_addr: "127.0.0.1".to_string(),
                port: 8787,
                settings_path: None,
            }
        })
    }
}
