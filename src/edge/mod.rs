//! 边缘编排模块
//!
//! 每个请求：解析项目配置与语言列表（带缓存），决定直通还是增强，
//! 拉取源站页面并注入片段，再把翻译页写入页面缓存。任何失败都退化为直通。
//!
//! - `settings`: 分层配置（默认值、文件、环境变量）
//! - `project`: 项目配置与语言名称的协作方及其 TTL 缓存
//! - `origin`: 源站请求
//! - `page_cache`: 以 (URL, 语言) 为键的页面缓存
//! - `inject`: 幂等的 HTML 注入器
//! - `pipeline`: 翻译页与默认页的增强管道
//! - `orchestrator`: 请求分派

pub mod error;
pub mod inject;
pub mod orchestrator;
pub mod origin;
pub mod page_cache;
pub mod pipeline;
pub mod project;
pub mod settings;
pub mod ttl_cache;

pub use error::{EdgeError, EdgeResult, FailureCategory};
pub use orchestrator::EdgeOrchestrator;
pub use origin::{HttpOrigin, InboundRequest, OriginFetcher, PageResponse};
pub use page_cache::{MemoryPageCache, PageCache, PageCacheKey};
pub use project::{CachedProjectSource, HttpProjectSource, ProjectSource};
pub use settings::{EdgeSettings, SettingsLoader};
pub use ttl_cache::TtlCache;
