//! 边缘端设置
//!
//! 分层加载：内置默认值 -> 配置文件 -> `WEBLINGO_` 前缀的环境变量

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::LanguageCode;
use crate::edge::error::{EdgeError, EdgeResult};

/// 设置常量
pub mod constants {
    pub const CONFIG_PATHS: &[&str] = &[
        "weblingo.toml",
        "config/weblingo.toml",
        "~/.config/weblingo/weblingo.toml",
    ];

    pub const ENV_FILES: &[&str] = &[".env.local", ".env"];

    pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/";
    pub const DEFAULT_ORIGIN_URL: &str = "http://127.0.0.1:3000/";
    pub const DEFAULT_ENGINE_SCRIPT_URL: &str = "/__weblingo/engine.js";
    pub const DEFAULT_CONFIG_TTL_SECS: u64 = 3600; // 1小时
    pub const DEFAULT_LANGUAGE_NAMES_TTL_SECS: u64 = 24 * DEFAULT_CONFIG_TTL_SECS;
    pub const DEFAULT_PAGE_CACHE_TTL_SECS: u64 = 3600;
    pub const DEFAULT_PAGE_CACHE_CAPACITY: usize = 1024;
    pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en";
}

/// 边缘端设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeSettings {
    /// 项目 API 密钥，缺失时所有请求直通
    pub api_key: Option<String>,
    /// 配置与翻译服务的基础地址
    pub api_base_url: String,
    /// 源站地址
    pub origin_url: String,
    /// 客户端引擎脚本地址
    pub engine_script_url: String,
    pub config_ttl_secs: u64,
    pub language_names_ttl_secs: u64,
    pub page_cache_ttl_secs: u64,
    pub page_cache_capacity: usize,
    pub request_timeout_secs: u64,
    /// 在服务端预先翻译页面
    pub prerender: bool,
    /// 配置服务未给出默认语言时使用
    pub fallback_default_language: String,
}

impl Default for EdgeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            origin_url: constants::DEFAULT_ORIGIN_URL.to_string(),
            engine_script_url: constants::DEFAULT_ENGINE_SCRIPT_URL.to_string(),
            config_ttl_secs: constants::DEFAULT_CONFIG_TTL_SECS,
            language_names_ttl_secs: constants::DEFAULT_LANGUAGE_NAMES_TTL_SECS,
            page_cache_ttl_secs: constants::DEFAULT_PAGE_CACHE_TTL_SECS,
            page_cache_capacity: constants::DEFAULT_PAGE_CACHE_CAPACITY,
            request_timeout_secs: crate::translation::config::constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            prerender: false,
            fallback_default_language: constants::DEFAULT_FALLBACK_LANGUAGE.to_string(),
        }
    }
}

impl EdgeSettings {
    /// 非空的 API 密钥
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn origin(&self) -> EdgeResult<Url> {
        parse_http_url("origin_url", &self.origin_url)
    }

    pub fn api_base(&self) -> EdgeResult<Url> {
        parse_http_url("api_base_url", &self.api_base_url)
    }

    pub fn config_ttl(&self) -> Duration {
        Duration::from_secs(self.config_ttl_secs)
    }

    pub fn language_names_ttl(&self) -> Duration {
        Duration::from_secs(self.language_names_ttl_secs)
    }

    pub fn page_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.page_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fallback_language(&self) -> LanguageCode {
        LanguageCode::new(&self.fallback_default_language)
    }

    /// 验证配置
    pub fn validate(&self) -> EdgeResult<()> {
        self.origin()?;
        self.api_base()?;

        let durations = [
            ("config_ttl_secs", self.config_ttl_secs),
            ("language_names_ttl_secs", self.language_names_ttl_secs),
            ("page_cache_ttl_secs", self.page_cache_ttl_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(EdgeError::Settings(format!("{} 必须大于 0", name)));
        }
        if self.page_cache_capacity == 0 {
            return Err(EdgeError::Settings("page_cache_capacity 必须大于 0".to_string()));
        }
        if self.fallback_language().is_empty() {
            return Err(EdgeError::Settings("fallback_default_language 不能为空".to_string()));
        }
        if self.api_key().is_none() {
            tracing::warn!("未配置 api_key，所有请求将直通源站");
        }
        Ok(())
    }
}

fn parse_http_url(field: &str, value: &str) -> EdgeResult<Url> {
    let url = Url::parse(value)
        .map_err(|e| EdgeError::Settings(format!("{} 无效 ({}): {}", field, value, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(EdgeError::Settings(format!("{} 必须是 http(s) 地址: {}", field, value)));
    }
    Ok(url)
}

/// 设置加载器
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    explicit_path: Option<String>,
    load_dotenv: bool,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            explicit_path: None,
            load_dotenv: true,
        }
    }

    /// 指定配置文件，跳过默认路径查找
    pub fn with_path(mut self, path: Option<String>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn without_dotenv(mut self) -> Self {
        self.load_dotenv = false;
        self
    }

    /// 加载并验证设置，返回设置及实际使用的配置文件
    pub fn load(&self) -> EdgeResult<(EdgeSettings, Option<String>)> {
        if self.load_dotenv {
            Self::load_dotenv();
        }

        let mut builder = Config::builder().add_source(Config::try_from(&EdgeSettings::default())?);

        let mut config_path = None;
        match &self.explicit_path {
            Some(path) => {
                let expanded = shellexpand::tilde(path).to_string();
                if !Path::new(&expanded).exists() {
                    return Err(EdgeError::Settings(format!("配置文件不存在: {}", expanded)));
                }
                builder = builder.add_source(File::with_name(&expanded));
                config_path = Some(expanded);
            }
            None => {
                for path in constants::CONFIG_PATHS {
                    let expanded = shellexpand::tilde(path);
                    if Path::new(expanded.as_ref()).exists() {
                        builder = builder.add_source(File::with_name(&expanded));
                        config_path = Some(expanded.to_string());
                        break;
                    }
                }
            }
        }
        if let Some(path) = &config_path {
            tracing::info!("加载配置文件: {}", path);
        }

        builder = builder.add_source(
            Environment::with_prefix("WEBLINGO")
                .prefix_separator("_")
                .separator("__"),
        );

        let settings: EdgeSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        tracing::info!(
            "源站: {}，服务: {}，预渲染: {}",
            settings.origin_url,
            settings.api_base_url,
            settings.prerender
        );

        Ok((settings, config_path))
    }

    /// 加载 .env 文件，找到第一个即停止
    fn load_dotenv() {
        for env_file in constants::ENV_FILES {
            if Path::new(env_file).exists() {
                match dotenv::from_filename(env_file) {
                    Ok(_) => {
                        tracing::info!("已加载环境变量文件: {}", env_file);
                        break;
                    }
                    Err(e) => tracing::warn!("无法加载环境变量文件 {}: {}", env_file, e),
                }
            }
        }
    }
}
