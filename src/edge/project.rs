//! 项目配置与语言名称
//!
//! 配置服务：`GET /plan-status/?api_key=…` 与 `GET /languages/`。
//! `CachedProjectSource` 按 TTL 缓存两者，语言名称的 TTL 更长。

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::core::{service_endpoint, LanguageCode, LanguageNameMap, ProjectConfig};
use crate::edge::error::{EdgeError, EdgeResult};
use crate::edge::ttl_cache::TtlCache;

/// 项目配置协作方
#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn project_config(&self, api_key: &str) -> EdgeResult<ProjectConfig>;

    async fn language_names(&self) -> EdgeResult<LanguageNameMap>;
}

#[derive(Debug, Deserialize)]
struct PlanStatus {
    #[serde(default)]
    default_language: Option<String>,
    #[serde(default)]
    target_languages: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct LanguageList {
    #[serde(default)]
    languages: Vec<LanguageEntry>,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
}

/// 基于 reqwest 的配置服务客户端
#[derive(Debug, Clone)]
pub struct HttpProjectSource {
    client: reqwest::Client,
    plan_status_url: Url,
    languages_url: Url,
    fallback_default: LanguageCode,
}

impl HttpProjectSource {
    pub fn new(api_base: &Url, timeout: Duration, fallback_default: LanguageCode) -> EdgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EdgeError::Settings(e.to_string()))?;
        Ok(Self {
            client,
            plan_status_url: service_endpoint(api_base, "plan-status/")?,
            languages_url: service_endpoint(api_base, "languages/")?,
            fallback_default,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
        service: &'static str,
    ) -> EdgeResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| EdgeError::ConfigUnavailable(format!("{}: {}", service, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EdgeError::UpstreamStatus {
                service,
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| EdgeError::ConfigUnavailable(format!("{} 响应无效: {}", service, e)))
    }
}

#[async_trait]
impl ProjectSource for HttpProjectSource {
    async fn project_config(&self, api_key: &str) -> EdgeResult<ProjectConfig> {
        let request = self
            .client
            .get(self.plan_status_url.clone())
            .query(&[("api_key", api_key)]);
        let status: PlanStatus = self.get_json(request, "plan-status").await?;

        let target_languages: Vec<LanguageCode> = status
            .target_languages
            .ok_or(EdgeError::NoTargetLanguages)?
            .iter()
            .map(LanguageCode::new)
            .filter(|code| !code.is_empty())
            .collect();
        if target_languages.is_empty() {
            return Err(EdgeError::NoTargetLanguages);
        }

        let default_language = status
            .default_language
            .map(LanguageCode::new)
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| self.fallback_default.clone());

        Ok(ProjectConfig {
            default_language,
            target_languages,
        })
    }

    async fn language_names(&self) -> EdgeResult<LanguageNameMap> {
        let request = self.client.get(self.languages_url.clone());
        let list: LanguageList = self.get_json(request, "languages").await?;
        Ok(LanguageNameMap::from_entries(
            list.languages.into_iter().map(|entry| (entry.code, entry.name)),
        ))
    }
}

/// 带 TTL 缓存的配置来源，失败结果不缓存
pub struct CachedProjectSource<S> {
    inner: S,
    configs: TtlCache<ProjectConfig>,
    names: TtlCache<LanguageNameMap>,
}

impl<S: ProjectSource> CachedProjectSource<S> {
    pub fn new(inner: S, config_ttl: Duration, names_ttl: Duration) -> Self {
        Self {
            inner,
            configs: TtlCache::new(256, config_ttl),
            names: TtlCache::new(1, names_ttl),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ProjectSource> ProjectSource for CachedProjectSource<S> {
    async fn project_config(&self, api_key: &str) -> EdgeResult<ProjectConfig> {
        let key = TtlCache::<ProjectConfig>::key("plan-status", &[api_key]);
        if let Some(config) = self.configs.get(&key).await {
            return Ok(config);
        }
        let config = self.inner.project_config(api_key).await?;
        self.configs.insert(key, config.clone()).await;
        Ok(config)
    }

    async fn language_names(&self) -> EdgeResult<LanguageNameMap> {
        const KEY: &str = "languages";
        if let Some(names) = self.names.get(KEY).await {
            return Ok(names);
        }
        let names = self.inner.language_names().await?;
        self.names.insert(KEY.to_string(), names.clone()).await;
        Ok(names)
    }
}
