//! 批量请求规划
//!
//! 把一轮的候选项去重成一次请求：已缓存的文本跳过，其他轮次正在请求的文本
//! 不重复发送而是等待其结果。结果按 `原文` 显式配对合并进缓存，不依赖位置对应。

use std::collections::HashSet;

use futures::channel::oneshot;
use futures::future::join_all;

use crate::translation::cache::{InFlight, TranslationCache};
use crate::translation::client::TranslationPair;
use crate::translation::collector::Candidate;

/// 一轮翻译的请求计划
pub struct BatchPlan<'c> {
    cache: &'c TranslationCache,
    texts: Vec<String>,
    waiting: Vec<InFlight>,
    done: Option<oneshot::Sender<()>>,
}

impl<'c> BatchPlan<'c> {
    /// 按候选项顺序生成唯一文本列表，并为其登记进行中状态
    pub fn new(cache: &'c TranslationCache, candidates: &[Candidate]) -> Self {
        let mut seen = HashSet::new();
        let mut texts = Vec::new();
        let mut waiting: Vec<InFlight> = Vec::new();

        for candidate in candidates {
            let source = candidate.source.as_str();
            if cache.contains(source) || !seen.insert(source) {
                continue;
            }
            if let Some(in_flight) = cache.in_flight(source) {
                if !waiting.iter().any(|w| w.ptr_eq(&in_flight)) {
                    waiting.push(in_flight);
                }
                continue;
            }
            texts.push(source.to_string());
        }

        let done = (!texts.is_empty()).then(|| cache.reserve(&texts));

        Self {
            cache,
            texts,
            waiting,
            done,
        }
    }

    /// 需要发送的唯一文本
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// 合并结果并释放登记；只接受本计划请求过的原文
    ///
    /// 返回写入缓存的条目数，以及需要等待的其他轮次。
    pub fn complete(mut self, pairs: Vec<TranslationPair>) -> (usize, Vec<InFlight>) {
        let requested: HashSet<&str> = self.texts.iter().map(String::as_str).collect();
        let mut merged = 0;
        for pair in pairs {
            if requested.contains(pair.original.as_str()) && self.cache.insert(pair.original, pair.translated) {
                merged += 1;
            }
        }
        let waiting = std::mem::take(&mut self.waiting);
        (merged, waiting)
    }

    /// 本轮请求失败：不写缓存，仍释放登记
    pub fn abandon(mut self) -> Vec<InFlight> {
        std::mem::take(&mut self.waiting)
    }
}

impl Drop for BatchPlan<'_> {
    fn drop(&mut self) {
        if self.done.is_some() {
            self.cache.release(&self.texts);
        }
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }
}

/// 等待其他轮次的请求结束（成功或失败）
pub async fn wait_for(in_flight: Vec<InFlight>) {
    if !in_flight.is_empty() {
        join_all(in_flight).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_first_element, parse_html};
    use crate::translation::cache::TranslatedMarks;
    use crate::translation::collector::{extract, ExtractionScope};

    fn candidates(html: &str) -> (markup5ever_rcdom::RcDom, Vec<Candidate>) {
        let dom = parse_html(html).unwrap();
        let body = find_first_element(&dom.document, "body").unwrap();
        let found = extract(&body, ExtractionScope::Subtree, &TranslatedMarks::new());
        (dom, found)
    }

    #[test]
    fn test_plan_deduplicates_and_skips_cached() {
        let cache = TranslationCache::new();
        cache.insert("Cached", "Déjà");
        let (_dom, found) = candidates(
            r#"<body><p>Hello</p><p>Hello</p><p>Cached</p><img alt="Hello"><img alt="Logo"></body>"#,
        );

        let plan = BatchPlan::new(&cache, &found);
        assert_eq!(plan.texts(), &["Hello".to_string(), "Logo".to_string()]);
        assert_eq!(cache.pending(), 2);
        drop(plan);
        assert_eq!(cache.pending(), 0);
    }

    #[test]
    fn test_complete_merges_only_requested() {
        let cache = TranslationCache::new();
        let (_dom, found) = candidates("<body><p>Hello</p><p>World</p></body>");
        let plan = BatchPlan::new(&cache, &found);

        let (merged, waiting) = plan.complete(vec![
            TranslationPair::new("Hello", "Bonjour"),
            TranslationPair::new("Unrelated", "Sans rapport"),
        ]);
        assert_eq!(merged, 1);
        assert!(waiting.is_empty());
        assert_eq!(cache.get("Hello").as_deref(), Some("Bonjour"));
        assert!(!cache.contains("World"));
        assert!(!cache.contains("Unrelated"));
        assert_eq!(cache.pending(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_plan_waits_instead_of_resending() {
        let cache = TranslationCache::new();
        let (_dom, found) = candidates("<body><p>Home</p><p>About</p></body>");

        let first = BatchPlan::new(&cache, &found[..1]);
        let second = BatchPlan::new(&cache, &found);
        assert_eq!(first.texts(), &["Home".to_string()]);
        assert_eq!(second.texts(), &["About".to_string()]);

        let (_, first_waiting) = first.complete(vec![TranslationPair::new("Home", "Accueil")]);
        assert!(first_waiting.is_empty());

        let (_, second_waiting) = second.complete(vec![TranslationPair::new("About", "À propos")]);
        assert_eq!(second_waiting.len(), 1);
        wait_for(second_waiting).await;
        assert_eq!(cache.get("Home").as_deref(), Some("Accueil"));
    }

    #[tokio::test]
    async fn test_abandoned_plan_releases_waiters() {
        let cache = TranslationCache::new();
        let (_dom, found) = candidates("<body><p>Home</p></body>");

        let first = BatchPlan::new(&cache, &found);
        let second = BatchPlan::new(&cache, &found);
        assert!(second.is_empty());

        assert!(first.abandon().is_empty());
        wait_for(second.abandon()).await;
        assert!(!cache.contains("Home"));
        assert_eq!(cache.pending(), 0);
    }
}
