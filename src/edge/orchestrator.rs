//! 请求编排
//!
//! 决定直通还是增强，并把任何失败都吸收为直通。直通本身失败时返回 502。

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use url::Url;

use crate::core::{LanguageCode, LanguageNameMap, ProjectConfig};
use crate::edge::error::{EdgeError, EdgeResult};
use crate::edge::origin::{HttpOrigin, InboundRequest, OriginFetcher, PageResponse};
use crate::edge::page_cache::{
    shareable_copy, store_in_background, MemoryPageCache, PageCache, PageCacheKey,
};
use crate::edge::pipeline::{augment_default, augment_translated, HtmlBody, TranslatedPage};
use crate::edge::project::{CachedProjectSource, HttpProjectSource, ProjectSource};
use crate::edge::settings::{constants, EdgeSettings};
use crate::translation::{prerender_document, EngineConfig, HttpTranslator, Translator};

/// 边缘编排器
pub struct EdgeOrchestrator {
    project: Arc<dyn ProjectSource>,
    origin: Arc<dyn OriginFetcher>,
    page_cache: Arc<dyn PageCache>,
    /// 设置后在服务端预先翻译页面
    prerender: Option<Arc<dyn Translator>>,
    origin_url: Url,
    api_base: Url,
    api_key: Option<String>,
    engine_script_url: String,
    page_ttl: Duration,
}

impl EdgeOrchestrator {
    pub fn new(
        project: Arc<dyn ProjectSource>,
        origin: Arc<dyn OriginFetcher>,
        page_cache: Arc<dyn PageCache>,
        origin_url: Url,
        api_base: Url,
    ) -> Self {
        Self {
            project,
            origin,
            page_cache,
            prerender: None,
            origin_url,
            api_base,
            api_key: None,
            engine_script_url: constants::DEFAULT_ENGINE_SCRIPT_URL.to_string(),
            page_ttl: Duration::from_secs(constants::DEFAULT_PAGE_CACHE_TTL_SECS),
        }
    }

    /// 根据设置构建带缓存的 HTTP 协作方
    pub fn from_settings(settings: &EdgeSettings) -> EdgeResult<Self> {
        settings.validate()?;
        let origin_url = settings.origin()?;
        let api_base = settings.api_base()?;
        let timeout = settings.request_timeout();

        let project = CachedProjectSource::new(
            HttpProjectSource::new(&api_base, timeout, settings.fallback_language())?,
            settings.config_ttl(),
            settings.language_names_ttl(),
        );
        let origin = HttpOrigin::new(origin_url.clone(), timeout)?;
        let page_cache = MemoryPageCache::new(settings.page_cache_capacity, settings.page_cache_ttl());

        let mut orchestrator = Self::new(
            Arc::new(project),
            Arc::new(origin),
            Arc::new(page_cache),
            origin_url,
            api_base.clone(),
        )
        .with_api_key(settings.api_key().map(str::to_string))
        .with_engine_script_url(settings.engine_script_url.clone())
        .with_page_ttl(settings.page_cache_ttl());

        match settings.api_key() {
            Some(api_key) if settings.prerender => {
                let translator = HttpTranslator::new(&api_base, api_key, timeout)?;
                orchestrator = orchestrator.with_prerender(Arc::new(translator));
            }
            Some(_) => {}
            None => tracing::warn!("未配置 API 密钥，所有请求将直通到源站"),
        }

        Ok(orchestrator)
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn with_engine_script_url(mut self, url: impl Into<String>) -> Self {
        self.engine_script_url = url.into();
        self
    }

    pub fn with_page_ttl(mut self, ttl: Duration) -> Self {
        self.page_ttl = ttl;
        self
    }

    pub fn with_prerender(mut self, translator: Arc<dyn Translator>) -> Self {
        self.prerender = Some(translator);
        self
    }

    pub fn origin_url(&self) -> &Url {
        &self.origin_url
    }

    /// 处理一个请求，永不返回错误
    pub async fn handle(&self, request: InboundRequest) -> PageResponse {
        match self.augment(&request).await {
            Ok(page) => page,
            Err(err) => {
                err.log_passthrough();
                metrics::counter!("weblingo_passthrough_total").increment(1);
                self.passthrough(&request).await
            }
        }
    }

    async fn passthrough(&self, request: &InboundRequest) -> PageResponse {
        match self.origin.fetch(request, &request.path_and_query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("直通请求失败 {} {}: {}", request.method, request.path_and_query, e);
                PageResponse::bad_gateway()
            }
        }
    }

    async fn augment(&self, request: &InboundRequest) -> EdgeResult<PageResponse> {
        let api_key = self.api_key.as_deref().ok_or(EdgeError::MissingApiKey)?;
        if request.method != Method::GET {
            return Err(EdgeError::MethodNotAugmented(request.method.to_string()));
        }

        let config = self.project.project_config(api_key).await?;
        if config.target_languages.is_empty() {
            return Err(EdgeError::NoTargetLanguages);
        }

        match config.split_locale_prefix(&request.path_and_query) {
            Some((language, canonical_path)) => {
                self.translated_page(request, api_key, &config, language, &canonical_path)
                    .await
            }
            None => self.default_page(request, &config).await,
        }
    }

    async fn language_names(&self) -> LanguageNameMap {
        self.project.language_names().await.unwrap_or_else(|e| {
            tracing::warn!("语言名称获取失败，使用语言代码: {}", e);
            LanguageNameMap::default()
        })
    }

    async fn translated_page(
        &self,
        request: &InboundRequest,
        api_key: &str,
        config: &ProjectConfig,
        language: LanguageCode,
        canonical_path: &str,
    ) -> EdgeResult<PageResponse> {
        let public_origin = request.public_origin(&self.origin_url);
        let key = PageCacheKey::new(request.public_url(&self.origin_url), language.clone());

        match self.page_cache.get(&key).await {
            Ok(Some(page)) => {
                metrics::counter!("weblingo_page_cache_hits_total").increment(1);
                tracing::debug!("页面缓存命中: {} [{}]", key.url, language);
                return Ok(page);
            }
            Ok(None) => metrics::counter!("weblingo_page_cache_misses_total").increment(1),
            Err(e) => {
                metrics::counter!("weblingo_page_cache_misses_total").increment(1);
                tracing::warn!("页面缓存读取失败，按未命中处理: {}", e);
            }
        }

        let page = self.origin.fetch(request, canonical_path).await?;
        if !page.is_success() || !page.is_html() {
            tracing::debug!("源站响应不做增强: {} ({})", canonical_path, page.status);
            return Ok(page);
        }

        let names = self.language_names().await;
        let mut body = HtmlBody::decode(&page);
        let mut prerendered = false;
        if let Some(translator) = &self.prerender {
            match self
                .prerender(translator.clone(), body.text.clone(), &language, config, &public_origin)
                .await
            {
                Ok(html) => {
                    body = body.with_text(html);
                    prerendered = true;
                }
                Err(e) => tracing::warn!("服务端预渲染失败，改由客户端翻译: {}", e),
            }
        }

        let context = TranslatedPage {
            language: &language,
            config,
            names: &names,
            public_origin: &public_origin,
            canonical_path,
            api_base: self.api_base.as_str(),
            api_key,
            engine_script_url: &self.engine_script_url,
            prerendered,
        };
        let page = augment_translated(page, body, &context);
        metrics::counter!("weblingo_translated_pages_total").increment(1);

        match shareable_copy(&page) {
            Some(shared) => {
                store_in_background(self.page_cache.clone(), key, shared, self.page_ttl);
            }
            None => tracing::debug!("响应按访客区分，不写入页面缓存: {}", key.url),
        }
        Ok(page)
    }

    async fn default_page(&self, request: &InboundRequest, config: &ProjectConfig) -> EdgeResult<PageResponse> {
        let page = self.origin.fetch(request, &request.path_and_query).await?;
        if !page.is_success() || !page.is_html() {
            return Ok(page);
        }
        let names = self.language_names().await;
        Ok(augment_default(page, config, &names))
    }

    /// DOM 不能跨线程，预渲染在阻塞线程上用单线程运行时执行
    async fn prerender(
        &self,
        translator: Arc<dyn Translator>,
        html: String,
        language: &LanguageCode,
        config: &ProjectConfig,
        public_origin: &str,
    ) -> EdgeResult<String> {
        let targets: Vec<&str> = config.target_languages.iter().map(LanguageCode::as_str).collect();
        let engine_config = EngineConfig::new(language.clone(), &targets)
            .with_default_language(config.default_language.clone())
            .with_page_origin(Url::parse(public_origin).ok())
            .with_reveal_transition(Duration::ZERO);

        tokio::task::spawn_blocking(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| EdgeError::Content(format!("无法创建预渲染运行时: {}", e)))?;
            let (html, report) = runtime
                .block_on(prerender_document(&html, engine_config, translator))
                .map_err(EdgeError::from)?;
            if report.failed_batches() > 0 {
                return Err(EdgeError::Content(format!(
                    "{} 个翻译批次失败",
                    report.failed_batches()
                )));
            }
            Ok(html)
        })
        .await
        .map_err(|e| EdgeError::Content(format!("预渲染任务失败: {}", e)))?
    }
}
