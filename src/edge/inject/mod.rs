//! HTML 注入器
//!
//! 每个注入器带有自己的标记字符串，HTML 中已存在该标记时不做任何修改，
//! 因此对同一页面重复注入的结果与注入一次相同。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

mod autodetect;
mod bootstrap;
mod context;
mod hreflang;
mod switcher;

pub use autodetect::AutoDetect;
pub use bootstrap::{EngineBootstrap, ENGINE_SCRIPT, ENGINE_SCRIPT_CONTENT_TYPE, PENDING_CLASS};
pub use context::LanguageContext;
pub use hreflang::HreflangLinks;
pub use switcher::LanguageSwitcher;

/// 标记属性名
pub const MARKER_ATTR: &str = "data-weblingo";

/// 片段插入位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionPoint {
    /// 第一个 `</head>` 之前
    Head,
    /// 最后一个 `</body>` 之前
    BodyEnd,
}

/// 幂等的 HTML 注入器
pub trait Injector {
    /// 片段中必然出现的标记字符串
    fn marker(&self) -> &'static str;

    fn position(&self) -> InjectionPoint;

    fn fragment(&self) -> String;

    fn inject(&self, html: &str) -> String {
        if html.contains(self.marker()) {
            tracing::debug!("已存在标记 {}，跳过注入", self.marker());
            return html.to_string();
        }

        let fragment = self.fragment();
        match self.position() {
            InjectionPoint::Head => insert_into_head(html, &fragment),
            InjectionPoint::BodyEnd => insert_before_body_end(html, &fragment),
        }
    }
}

/// 依次应用一组注入器
pub fn inject_all(html: &str, injectors: &[&dyn Injector]) -> String {
    injectors
        .iter()
        .fold(html.to_string(), |page, injector| injector.inject(&page))
}

struct InjectionPatterns {
    head_close: OnceLock<Regex>,
    body_open: OnceLock<Regex>,
    body_close: OnceLock<Regex>,
}

static PATTERNS: InjectionPatterns = InjectionPatterns {
    head_close: OnceLock::new(),
    body_open: OnceLock::new(),
    body_close: OnceLock::new(),
};

fn compile(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap_or_else(|_| Regex::new(r"$^").unwrap()))
}

/// 插入到 `</head>` 之前，没有 head 时插入到 `<body` 之前，都没有则放在最前
pub fn insert_into_head(html: &str, fragment: &str) -> String {
    let head_close = compile(&PATTERNS.head_close, r"(?i)</head\s*>");
    let body_open = compile(&PATTERNS.body_open, r"(?i)<body[\s>/]");

    let index = head_close
        .find(html)
        .or_else(|| body_open.find(html))
        .map(|found| found.start())
        .unwrap_or(0);
    splice(html, index, fragment)
}

/// 插入到最后一个 `</body>` 之前，没有则追加到末尾
pub fn insert_before_body_end(html: &str, fragment: &str) -> String {
    let body_close = compile(&PATTERNS.body_close, r"(?i)</body\s*>");

    let index = body_close
        .find_iter(html)
        .last()
        .map(|found| found.start())
        .unwrap_or(html.len());
    splice(html, index, fragment)
}

fn splice(html: &str, index: usize, fragment: &str) -> String {
    let mut output = String::with_capacity(html.len() + fragment.len());
    output.push_str(&html[..index]);
    output.push_str(fragment);
    output.push_str(&html[index..]);
    output
}

/// 转义 HTML 文本与属性值
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 可安全嵌入 `<script>` 的 JSON 字面量
pub fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/").replace("<!--", "<\\!--")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(InjectionPoint);

    impl Injector for Probe {
        fn marker(&self) -> &'static str {
            "data-weblingo=\"probe\""
        }

        fn position(&self) -> InjectionPoint {
            self.0
        }

        fn fragment(&self) -> String {
            "<i data-weblingo=\"probe\"></i>".to_string()
        }
    }

    #[test]
    fn test_head_injection_points() {
        let probe = Probe(InjectionPoint::Head);
        assert_eq!(
            probe.inject("<html><HEAD></HEAD><body></body></html>"),
            "<html><HEAD><i data-weblingo=\"probe\"></i></HEAD><body></body></html>"
        );
        assert_eq!(
            probe.inject("<body class=\"x\">hi</body>"),
            "<i data-weblingo=\"probe\"></i><body class=\"x\">hi</body>"
        );
        assert_eq!(probe.inject("hi"), "<i data-weblingo=\"probe\"></i>hi");
    }

    #[test]
    fn test_body_injection_uses_last_close_tag() {
        let probe = Probe(InjectionPoint::BodyEnd);
        assert_eq!(
            probe.inject("<body><p>&lt;/body&gt;</p><script>'</body>'</script></body >"),
            "<body><p>&lt;/body&gt;</p><script>'</body>'</script><i data-weblingo=\"probe\"></i></body >"
        );
        assert_eq!(probe.inject("<p>x</p>"), "<p>x</p><i data-weblingo=\"probe\"></i>");
    }

    #[test]
    fn test_injection_is_idempotent() {
        let probe = Probe(InjectionPoint::Head);
        let once = probe.inject("<head></head>");
        assert_eq!(probe.inject(&once), once);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(
            script_json(&serde_json::json!("</script>")),
            "\"<\\/script>\""
        );
    }
}
