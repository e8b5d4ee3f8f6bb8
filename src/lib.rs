//! # Weblingo Library
//!
//! 在不修改源站的前提下，为任意网站提供按语言前缀切换的即时翻译。
//!
//! ## 模块组织
//!
//! - `core` - 项目配置、语言代码等核心数据模型
//! - `env` - 类型安全的环境变量
//! - `parsers` - HTML 解析、DOM 操作与语言前缀链接重写
//! - `translation` - 客户端翻译引擎（提取、分区、批量、缓存、回写、增量）
//! - `edge` - 边缘编排器（配置缓存、页面缓存、注入器、管道）
//! - `web` - 代理服务器（可选）

pub mod core;
pub mod edge;
pub mod env;
pub mod parsers;
pub mod translation;
#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used items for convenience
pub use self::core::{LanguageCode, LanguageNameMap, ProjectConfig};
pub use edge::{EdgeError, EdgeOrchestrator, EdgeResult, EdgeSettings};
pub use translation::{Engine, EngineConfig, EngineContext, TranslationError, TranslationResult};
