//! 页面缓存
//!
//! 以 (页面 URL, 目标语言) 为键保存增强后的翻译页。写入不阻塞响应。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;

use crate::core::LanguageCode;
use crate::edge::error::EdgeResult;
use crate::edge::origin::PageResponse;
use crate::edge::ttl_cache::TtlCache;

/// 页面缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCacheKey {
    pub url: String,
    pub language: LanguageCode,
}

impl PageCacheKey {
    pub fn new(url: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            url: url.into(),
            language,
        }
    }

    pub fn digest(&self) -> String {
        TtlCache::<PageResponse>::key("page", &[&self.url, self.language.as_str()])
    }
}

/// 页面缓存协作方
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, key: &PageCacheKey) -> EdgeResult<Option<PageResponse>>;

    async fn put(&self, key: &PageCacheKey, page: PageResponse, ttl: Duration) -> EdgeResult<()>;
}

/// 进程内页面缓存
#[derive(Clone)]
pub struct MemoryPageCache {
    pages: TtlCache<PageResponse>,
}

impl MemoryPageCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            pages: TtlCache::new(capacity, ttl),
        }
    }

    pub async fn len(&self) -> usize {
        self.pages.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.is_empty().await
    }
}

#[async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, key: &PageCacheKey) -> EdgeResult<Option<PageResponse>> {
        Ok(self.pages.get(&key.digest()).await)
    }

    async fn put(&self, key: &PageCacheKey, page: PageResponse, ttl: Duration) -> EdgeResult<()> {
        self.pages.insert_with_ttl(key.digest(), page, ttl).await;
        Ok(())
    }
}

/// 缓存键不含访客身份，按 Cookie 或认证信息区分的响应不能共享
const VISITOR_SCOPED_VARY: &[&str] = &["*", "cookie", "authorization"];

/// 可供所有访客共享的缓存副本
///
/// 去掉 `Set-Cookie`；`Vary` 指向访客身份时返回 `None`。
pub fn shareable_copy(page: &PageResponse) -> Option<PageResponse> {
    let visitor_scoped = page
        .headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|name| {
            VISITOR_SCOPED_VARY
                .iter()
                .any(|scoped| name.eq_ignore_ascii_case(scoped))
        });
    if visitor_scoped {
        return None;
    }

    let mut shared = page.clone();
    shared.headers.remove(header::SET_COOKIE);
    Some(shared)
}

/// 后台写入缓存，失败只记日志
pub fn store_in_background(
    cache: Arc<dyn PageCache>,
    key: PageCacheKey,
    page: PageResponse,
    ttl: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match cache.put(&key, page, ttl).await {
            Ok(()) => tracing::debug!("页面已缓存: {} [{}]", key.url, key.language),
            Err(e) => tracing::warn!("页面缓存写入失败: {}", e),
        }
    })
}
