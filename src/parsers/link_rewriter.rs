//! 链接重写模块
//!
//! 给站内链接补上 `/<lang>` 语言前缀，重复执行不会叠加前缀

use markup5ever_rcdom::{Handle, NodeData};
use url::Url;

use crate::core::LanguageCode;
use crate::parsers::html::{get_node_attr, set_node_attr, ElementKind};

/// 语言前缀规则
#[derive(Debug, Clone)]
pub struct LocalePrefixer<'a> {
    language: &'a LanguageCode,
    /// 已知的目标语言，带有其中任一前缀的链接保持原样
    known_languages: &'a [LanguageCode],
    /// 站点默认语言，显式指向它的链接同样保持原样
    default_language: Option<&'a LanguageCode>,
    /// 当前页面的源，用于识别同源的绝对链接
    page_origin: Option<&'a Url>,
}

impl<'a> LocalePrefixer<'a> {
    pub fn new(language: &'a LanguageCode, known_languages: &'a [LanguageCode]) -> Self {
        Self {
            language,
            known_languages,
            default_language: None,
            page_origin: None,
        }
    }

    pub fn with_default_language(mut self, default_language: Option<&'a LanguageCode>) -> Self {
        self.default_language = default_language;
        self
    }

    pub fn with_page_origin(mut self, page_origin: Option<&'a Url>) -> Self {
        self.page_origin = page_origin;
        self
    }

    /// 计算重写后的 href，无需改动时返回 `None`
    pub fn prefix_href(&self, href: &str) -> Option<String> {
        let trimmed = href.trim();

        if should_skip_link(trimmed) {
            return None;
        }

        if trimmed.starts_with('/') && !trimmed.starts_with("//") {
            return self.prefix_path(trimmed);
        }

        // 绝对链接或协议相对链接：只处理同源 http(s)
        let origin = self.page_origin?;
        let absolute = if trimmed.starts_with("//") {
            Url::parse(&format!("{}:{}", origin.scheme(), trimmed)).ok()?
        } else {
            Url::parse(trimmed).ok()?
        };

        if !matches!(absolute.scheme(), "http" | "https") || absolute.origin() != origin.origin() {
            return None;
        }

        let mut path_and_rest = absolute.path().to_string();
        if let Some(query) = absolute.query() {
            path_and_rest.push('?');
            path_and_rest.push_str(query);
        }
        if let Some(fragment) = absolute.fragment() {
            path_and_rest.push('#');
            path_and_rest.push_str(fragment);
        }

        let prefixed = self.prefix_path(&path_and_rest)?;
        let mut rewritten = absolute.clone();
        rewritten.set_query(None);
        rewritten.set_fragment(None);
        rewritten.set_path("");
        let base = rewritten.as_str().trim_end_matches('/').to_string();
        Some(format!("{}{}", base, prefixed))
    }

    /// `/about?x#y` -> `/fr/about?x#y`
    fn prefix_path(&self, path_and_rest: &str) -> Option<String> {
        let split_at = path_and_rest
            .find(|c| c == '?' || c == '#')
            .unwrap_or(path_and_rest.len());
        let (path, rest) = path_and_rest.split_at(split_at);

        let carries_prefix = std::iter::once(self.language)
            .chain(self.known_languages.iter())
            .chain(self.default_language)
            .any(|code| path_has_language_prefix(path, code));
        if carries_prefix {
            return None;
        }

        Some(format!("/{}{}{}", self.language, path, rest))
    }
}

/// 在子树（含根节点）中重写所有 `<a href>`，返回改写数量
pub fn rewrite_links(root: &Handle, prefixer: &LocalePrefixer<'_>) -> usize {
    let mut rewritten = 0;
    walk_and_rewrite_links(root, prefixer, &mut rewritten);
    rewritten
}

/// 递归遍历DOM树并重写链接
fn walk_and_rewrite_links(node: &Handle, prefixer: &LocalePrefixer<'_>, rewritten: &mut usize) {
    match node.data {
        NodeData::Document => {
            for child_node in node.children.borrow().iter() {
                walk_and_rewrite_links(child_node, prefixer, rewritten);
            }
        }
        NodeData::Element { .. } => {
            if ElementKind::of(node) == Some(ElementKind::Anchor) {
                if let Some(href) = get_node_attr(node, "href") {
                    if let Some(prefixed) = prefixer.prefix_href(&href) {
                        set_node_attr(node, "href", Some(&prefixed));
                        *rewritten += 1;
                    }
                }
            }

            for child_node in node.children.borrow().iter() {
                walk_and_rewrite_links(child_node, prefixer, rewritten);
            }
        }
        _ => {}
    }
}

/// 判断是否应该跳过重写的链接
fn should_skip_link(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
        || lower.starts_with("blob:")
}

fn path_has_language_prefix(path: &str, language: &LanguageCode) -> bool {
    match path.strip_prefix('/').and_then(|p| p.strip_prefix(language.as_str())) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
