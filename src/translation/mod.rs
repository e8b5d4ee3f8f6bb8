//! 翻译模块 - 页面内的增量翻译引擎
//!
//! 引擎在单个页面视图内运行，按固定阶段工作：
//! - **bootstrap**: 给已有的站内链接补上语言前缀
//! - **priority**: 并发翻译 head 与首屏内容，两者完成后才揭开遮罩
//! - **deferred**: 后台翻译首屏以下的内容
//! - **incremental**: 依次处理之后插入的 DOM 子树
//!
//! 同一文本在一个页面视图内最多请求一次，同一节点最多回写一次。
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use weblingo::translation::{Engine, EngineConfig, HttpTranslator, NoOverlay, UnboundedLayout};
//!
//! # async fn example(document: markup5ever_rcdom::Handle, translator: HttpTranslator) {
//! let config = EngineConfig::new("fr", &["fr", "de"]);
//! let engine = Engine::new(config, Arc::new(translator), Box::new(UnboundedLayout));
//! let report = engine.run(&document, &NoOverlay).await;
//! println!("applied {} translations", report.applied());
//! # }
//! ```

/// 回写翻译结果
pub mod apply;

/// 批量请求规划与结果合并
pub mod batch;

/// 页面级翻译缓存与已翻译标记
pub mod cache;

/// 翻译服务客户端
pub mod client;

/// 提取候选文本与属性
pub mod collector;

/// 引擎配置与常量
pub mod config;

/// 引擎上下文与阶段调度
pub mod engine;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// DOM 插入任务队列
pub mod mutation;

/// 首屏与首屏以下的可见性分区
pub mod partition;

pub use apply::apply_candidates;
pub use batch::BatchPlan;
pub use cache::{TranslatedMarks, TranslationCache};
pub use client::{HttpTranslator, TranslationPair, Translator};
pub use collector::{extract, Candidate, CandidateId, CandidateTarget, ExtractionScope};
pub use config::EngineConfig;
pub use engine::{prerender_document, Engine, EngineContext, NoOverlay, Overlay, PassReport, RunReport};
pub use error::{TranslationError, TranslationResult};
pub use mutation::{DrainReport, MutationQueue};
pub use partition::{partition, Layout, StaticLayout, UnboundedLayout, VisibilityPartition};
