//! 文本收集器模块
//!
//! 从一个子树中提取候选文本节点与候选属性值。head 与 body 使用同一套规则，
//! head 额外限定文本只来自 `<title>`，并收集特定 meta 的 `content`。

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{
    get_node_attr, get_parent_node, has_class, ElementKind, TranslatableAttr, TRANSLATABLE_META,
};
use crate::translation::cache::TranslatedMarks;
use crate::translation::config::constants;

/// 候选项在一轮提取中的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(pub usize);

/// 回写位置
#[derive(Debug, Clone)]
pub enum CandidateTarget {
    /// 文本节点
    Text(Handle),
    /// 元素上的某个属性
    Attribute {
        element: Handle,
        attr: TranslatableAttr,
    },
}

/// 一个待翻译单元：编号、去除首尾空白的原文、回写位置
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: CandidateId,
    pub source: String,
    pub target: CandidateTarget,
}

impl Candidate {
    /// 被标记为已翻译的节点
    pub fn marked_node(&self) -> &Handle {
        match &self.target {
            CandidateTarget::Text(node) => node,
            CandidateTarget::Attribute { element, .. } => element,
        }
    }

    /// 用于布局判定的元素：文本取其父元素
    pub fn layout_element(&self) -> Option<Handle> {
        match &self.target {
            CandidateTarget::Text(node) => get_parent_node(node),
            CandidateTarget::Attribute { element, .. } => Some(element.clone()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.target, CandidateTarget::Text(_))
    }
}

/// 提取范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionScope {
    /// `document.head`
    Head,
    /// body 或其中的任意子树
    Subtree,
}

/// 收集统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub nodes_visited: usize,
    pub nodes_skipped: usize,
    pub texts: usize,
    pub attributes: usize,
}

/// 元素是否显式退出翻译
pub fn is_opted_out(element: &Handle) -> bool {
    has_class(element, constants::OPT_OUT_CLASS)
        || get_node_attr(element, constants::OPT_OUT_ATTR)
            .map(|value| value.trim().eq_ignore_ascii_case("no"))
            .unwrap_or(false)
}

struct Collector<'m> {
    marks: &'m TranslatedMarks,
    scope: ExtractionScope,
    texts: Vec<(String, Handle)>,
    attributes: Vec<(String, Handle, TranslatableAttr)>,
    stats: CollectionStats,
}

impl<'m> Collector<'m> {
    fn collect_recursive(&mut self, node: &Handle, in_title: bool) {
        self.stats.nodes_visited += 1;

        match node.data {
            NodeData::Text { ref contents } => {
                if self.scope == ExtractionScope::Head && !in_title {
                    return;
                }
                if self.marks.is_marked(node) {
                    self.stats.nodes_skipped += 1;
                    return;
                }
                let trimmed = contents.borrow().trim().to_string();
                if !trimmed.is_empty() {
                    self.texts.push((trimmed, node.clone()));
                }
            }
            NodeData::Element { .. } => {
                let kind = ElementKind::of(node).unwrap_or(ElementKind::Other);

                if kind.is_opaque() || is_opted_out(node) {
                    self.stats.nodes_skipped += 1;
                    return;
                }

                if !self.marks.is_marked(node) {
                    self.collect_element_attributes(node, kind);
                }

                let in_title = in_title || kind == ElementKind::Title;
                for child in node.children.borrow().iter() {
                    self.collect_recursive(child, in_title);
                }
            }
            _ => {
                for child in node.children.borrow().iter() {
                    self.collect_recursive(child, in_title);
                }
            }
        }
    }

    fn collect_element_attributes(&mut self, element: &Handle, kind: ElementKind) {
        for attr in TranslatableAttr::COMMON {
            self.push_attribute(element, attr);
        }

        if self.scope == ExtractionScope::Head
            && kind == ElementKind::Meta
            && TRANSLATABLE_META.iter().any(|rule| rule.matches(element))
        {
            self.push_attribute(element, TranslatableAttr::MetaContent);
        }
    }

    fn push_attribute(&mut self, element: &Handle, attr: TranslatableAttr) {
        if let Some(value) = get_node_attr(element, attr.name()) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                self.attributes
                    .push((trimmed.to_string(), element.clone(), attr));
            }
        }
    }

    fn into_candidates(self) -> (Vec<Candidate>, CollectionStats) {
        let mut stats = self.stats;
        stats.texts = self.texts.len();
        stats.attributes = self.attributes.len();

        // 文本在前，属性在后，编号连续
        let texts = self
            .texts
            .into_iter()
            .map(|(source, node)| (source, CandidateTarget::Text(node)));
        let attributes = self
            .attributes
            .into_iter()
            .map(|(source, element, attr)| (source, CandidateTarget::Attribute { element, attr }));

        let candidates = texts
            .chain(attributes)
            .enumerate()
            .map(|(index, (source, target))| Candidate {
                id: CandidateId(index),
                source,
                target,
            })
            .collect();

        (candidates, stats)
    }
}

/// 提取子树中的候选项，已标记的节点不会出现在结果中
pub fn extract(root: &Handle, scope: ExtractionScope, marks: &TranslatedMarks) -> Vec<Candidate> {
    extract_with_stats(root, scope, marks).0
}

pub fn extract_with_stats(
    root: &Handle,
    scope: ExtractionScope,
    marks: &TranslatedMarks,
) -> (Vec<Candidate>, CollectionStats) {
    let mut collector = Collector {
        marks,
        scope,
        texts: Vec::new(),
        attributes: Vec::new(),
        stats: CollectionStats::default(),
    };
    collector.collect_recursive(root, false);
    collector.into_candidates()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_first_element, parse_html};

    fn sources(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.source.as_str()).collect()
    }

    #[test]
    fn test_extract_body_texts_then_attributes() {
        let dom = parse_html(
            r#"<body><p> Hello </p><img alt="Logo" title="Brand"><input placeholder="Search"><p>   </p><button aria-label="Close">X</button></body>"#,
        )
        .unwrap();
        let body = find_first_element(&dom.document, "body").unwrap();
        let candidates = extract(&body, ExtractionScope::Subtree, &TranslatedMarks::new());

        assert_eq!(sources(&candidates), vec!["Hello", "X", "Logo", "Brand", "Search", "Close"]);
        assert!(candidates[0].is_text());
        assert!(!candidates[2].is_text());
        let ids: Vec<usize> = candidates.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_extract_skips_opaque_and_opt_out() {
        let dom = parse_html(
            r#"<body><script>var a = "x";</script><style>p{}</style><code>let x</code><pre><span>raw</span></pre><noscript>enable js</noscript><div translate="no">Keep</div><div class="notranslate"><img alt="Skip"></div><p>Go</p></body>"#,
        )
        .unwrap();
        let body = find_first_element(&dom.document, "body").unwrap();
        let candidates = extract(&body, ExtractionScope::Subtree, &TranslatedMarks::new());
        assert_eq!(sources(&candidates), vec!["Go"]);
    }

    #[test]
    fn test_extract_head_rules() {
        let dom = parse_html(
            r#"<html><head>
                <title>Welcome</title>
                <meta name="description" content="About us">
                <meta name="keywords" content="">
                <meta property="og:title" content="OG Title">
                <meta property="og:site_name" content="Acme">
                <meta name="author" content="Jane">
                <meta name="twitter:description" content="Tweet">
                <meta name="viewport" content="width=device-width">
                <style>body{}</style>
            </head><body></body></html>"#,
        )
        .unwrap();
        let head = find_first_element(&dom.document, "head").unwrap();
        let candidates = extract(&head, ExtractionScope::Head, &TranslatedMarks::new());

        assert_eq!(
            sources(&candidates),
            vec!["Welcome", "About us", "OG Title", "Tweet"]
        );
    }

    #[test]
    fn test_marked_nodes_are_excluded() {
        let dom = parse_html(r#"<body><p>Hello</p><img alt="Logo"></body>"#).unwrap();
        let body = find_first_element(&dom.document, "body").unwrap();
        let marks = TranslatedMarks::new();

        let first = extract(&body, ExtractionScope::Subtree, &marks);
        assert_eq!(first.len(), 2);
        for candidate in &first {
            marks.mark(candidate.marked_node());
        }

        let second = extract(&body, ExtractionScope::Subtree, &marks);
        assert!(second.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept_per_location() {
        let dom = parse_html("<body><p>Hello</p><p>Hello</p></body>").unwrap();
        let body = find_first_element(&dom.document, "body").unwrap();
        let (candidates, stats) =
            extract_with_stats(&body, ExtractionScope::Subtree, &TranslatedMarks::new());
        assert_eq!(candidates.len(), 2);
        assert_eq!(stats.texts, 2);
    }
}
