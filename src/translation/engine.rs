//! 翻译引擎
//!
//! `EngineContext` 持有一个页面视图内共享的全部可变状态（翻译缓存、已翻译标记），
//! 以引用方式传给各阶段。`Engine` 在上下文之上编排四个阶段。

use std::sync::Arc;

use markup5ever_rcdom::Handle;

use crate::parsers::html::{
    ancestors, find_first_element, is_attached, parse_html, serialize_to_string, ElementKind,
};
use crate::parsers::link_rewriter::{rewrite_links, LocalePrefixer};
use crate::translation::apply::{apply_candidates, is_stale};
use crate::translation::batch::{wait_for, BatchPlan};
use crate::translation::cache::{TranslatedMarks, TranslationCache};
use crate::translation::client::Translator;
use crate::translation::collector::{extract, is_opted_out, Candidate, ExtractionScope};
use crate::translation::config::EngineConfig;
use crate::translation::error::TranslationResult;
use crate::translation::partition::{partition, Layout, UnboundedLayout, VisibilityPartition};

/// 页面上的模糊遮罩
pub trait Overlay {
    /// 开始淡出
    fn begin_reveal(&self);
    /// 过渡结束，移除遮罩
    fn finish_reveal(&self);
}

/// 无遮罩（服务端预渲染、测试）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverlay;

impl Overlay for NoOverlay {
    fn begin_reveal(&self) {}
    fn finish_reveal(&self) {}
}

/// 单轮翻译统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// 仍然有效的候选项数
    pub candidates: usize,
    /// 本轮实际发送的唯一文本数
    pub requested: usize,
    /// 写入缓存的结果数
    pub merged: usize,
    /// 回写到 DOM 的次数
    pub applied: usize,
    /// 本轮重写的链接数（仅增量轮次）
    pub links_rewritten: usize,
    /// 请求失败的批次数
    pub failed_batches: usize,
}

impl PassReport {
    pub fn absorb(&mut self, other: PassReport) {
        self.candidates += other.candidates;
        self.requested += other.requested;
        self.merged += other.merged;
        self.applied += other.applied;
        self.links_rewritten += other.links_rewritten;
        self.failed_batches += other.failed_batches;
    }
}

/// 前三个阶段的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub links_rewritten: usize,
    pub head: PassReport,
    pub above_fold: PassReport,
    pub below_fold: PassReport,
}

impl RunReport {
    pub fn applied(&self) -> usize {
        self.head.applied + self.above_fold.applied + self.below_fold.applied
    }

    pub fn requested(&self) -> usize {
        self.head.requested + self.above_fold.requested + self.below_fold.requested
    }

    pub fn failed_batches(&self) -> usize {
        self.head.failed_batches + self.above_fold.failed_batches + self.below_fold.failed_batches
    }
}

/// 页面视图级上下文
pub struct EngineContext {
    config: EngineConfig,
    cache: TranslationCache,
    marks: TranslatedMarks,
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: TranslationCache::new(),
            marks: TranslatedMarks::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn marks(&self) -> &TranslatedMarks {
        &self.marks
    }

    pub fn prefixer(&self) -> LocalePrefixer<'_> {
        LocalePrefixer::new(&self.config.language, &self.config.target_languages)
            .with_default_language(self.config.default_language.as_ref())
            .with_page_origin(self.config.page_origin.as_ref())
    }
}

/// 翻译引擎
pub struct Engine {
    context: EngineContext,
    translator: Arc<dyn Translator>,
    layout: Box<dyn Layout>,
}

impl Engine {
    pub fn new(config: EngineConfig, translator: Arc<dyn Translator>, layout: Box<dyn Layout>) -> Self {
        Self {
            context: EngineContext::new(config),
            translator,
            layout,
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// 阶段一：重写初始 DOM 中的站内链接
    pub fn bootstrap(&self, document: &Handle) -> usize {
        let rewritten = rewrite_links(document, &self.context.prefixer());
        tracing::debug!("初始链接重写 {} 处", rewritten);
        rewritten
    }

    /// 提取 -> 批量翻译 -> 回写 -> 标记
    ///
    /// 请求失败只会让本轮没有新结果，不会向上传播。
    pub async fn translate_pass(&self, candidates: Vec<Candidate>) -> PassReport {
        let marks = &self.context.marks;
        let candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !is_stale(candidate, marks))
            .collect();

        let mut report = PassReport {
            candidates: candidates.len(),
            ..PassReport::default()
        };
        if candidates.is_empty() {
            return report;
        }

        let plan = BatchPlan::new(&self.context.cache, &candidates);
        report.requested = plan.texts().len();

        let waiting = if plan.is_empty() {
            plan.abandon()
        } else {
            let outcome = self
                .translator
                .translate_batch(&self.context.config.language, plan.texts())
                .await;
            match outcome {
                Ok(pairs) => {
                    let (merged, waiting) = plan.complete(pairs);
                    report.merged = merged;
                    waiting
                }
                Err(err) => {
                    tracing::warn!(category = err.category(), "翻译批次失败，本轮不回写新结果: {}", err);
                    report.failed_batches = 1;
                    plan.abandon()
                }
            }
        };
        wait_for(waiting).await;

        report.applied = apply_candidates(&candidates, &self.context.cache, marks);
        tracing::debug!(
            "翻译轮次完成: 候选 {}，请求 {}，回写 {}",
            report.candidates,
            report.requested,
            report.applied
        );
        report
    }

    /// 首屏分区，仅在调用时计算一次
    pub fn partition_body(&self, body: &Handle) -> VisibilityPartition {
        let candidates = extract(body, ExtractionScope::Subtree, &self.context.marks);
        partition(candidates, self.layout.as_ref(), self.context.config.fold_buffer)
    }

    /// 阶段二：并发翻译 head 与首屏，返回首屏以下的候选项
    pub async fn priority_phase(&self, document: &Handle) -> (PassReport, PassReport, Vec<Candidate>) {
        let head_candidates = find_first_element(document, "head")
            .map(|head| extract(&head, ExtractionScope::Head, &self.context.marks))
            .unwrap_or_default();
        let VisibilityPartition { above, below } = find_first_element(document, "body")
            .map(|body| self.partition_body(&body))
            .unwrap_or_default();

        let (head, above_fold) =
            futures::join!(self.translate_pass(head_candidates), self.translate_pass(above));
        (head, above_fold, below)
    }

    /// 阶段三：翻译首屏以下的部分
    pub async fn deferred_phase(&self, deferred: Vec<Candidate>) -> PassReport {
        self.translate_pass(deferred).await
    }

    /// 依次执行阶段一到三；遮罩在阶段二完成后才开始淡出
    pub async fn run(&self, document: &Handle, overlay: &dyn Overlay) -> RunReport {
        let links_rewritten = self.bootstrap(document);
        let (head, above_fold, deferred) = self.priority_phase(document).await;

        overlay.begin_reveal();
        let transition = self.context.config.reveal_transition;
        let reveal = async move {
            if !transition.is_zero() {
                tokio::time::sleep(transition).await;
            }
            overlay.finish_reveal();
        };
        let ((), below_fold) = futures::join!(reveal, self.deferred_phase(deferred));

        let report = RunReport {
            links_rewritten,
            head,
            above_fold,
            below_fold,
        };
        tracing::info!(
            "页面翻译完成 [{}]: 请求 {} 条，回写 {} 处",
            self.context.config.language,
            report.requested(),
            report.applied()
        );
        report
    }

    /// 阶段四的单个任务：翻译新插入的子树并重写其中的链接
    ///
    /// 非元素、已脱离文档、已标记、或位于不透明/退出翻译的元素之下时返回 `None`。
    pub async fn translate_inserted(&self, root: &Handle) -> Option<PassReport> {
        let kind = ElementKind::of(root)?;
        if !is_attached(root) || self.context.marks.is_marked(root) {
            return None;
        }
        if kind.is_opaque() || is_opted_out(root) {
            return None;
        }
        let blocked = ancestors(root).iter().any(|ancestor| {
            is_opted_out(ancestor) || ElementKind::of(ancestor).map_or(false, ElementKind::is_opaque)
        });
        if blocked {
            return None;
        }

        let candidates = extract(root, ExtractionScope::Subtree, &self.context.marks);
        let mut report = self.translate_pass(candidates).await;
        report.links_rewritten = rewrite_links(root, &self.context.prefixer());
        Some(report)
    }
}

/// 服务端预渲染：在无限视口下执行阶段一到三并序列化，同时返回统计
pub async fn prerender_document(
    html: &str,
    config: EngineConfig,
    translator: Arc<dyn Translator>,
) -> TranslationResult<(String, RunReport)> {
    let dom = parse_html(html)?;
    let engine = Engine::new(config, translator, Box::new(UnboundedLayout));
    let report = engine.run(&dom.document, &NoOverlay).await;
    Ok((serialize_to_string(&dom)?, report))
}
