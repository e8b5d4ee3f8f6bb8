//! 翻译引擎引导：遮罩样式、待定状态类与延迟加载的引擎脚本
//!
//! 待定状态类总是与移除它的途径成对出现：引擎在首屏翻译结束后移除；
//! 脚本加载失败或迟迟没有结果时，由内联脚本兜底移除。

use crate::edge::inject::{escape_html, InjectionPoint, Injector};
use crate::translation::config::constants::{REVEAL_FAILSAFE_MS, REVEAL_TRANSITION_MS};

/// 页面在优先翻译完成前带有的根元素类名
pub const PENDING_CLASS: &str = "weblingo-pending";

/// 客户端翻译引擎
pub const ENGINE_SCRIPT: &str = include_str!("../../../templates/assets/js/engine.js");

pub const ENGINE_SCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

#[derive(Debug, Clone)]
pub struct EngineBootstrap {
    script_url: String,
}

impl EngineBootstrap {
    pub fn new(script_url: impl Into<String>) -> Self {
        Self {
            script_url: script_url.into(),
        }
    }
}

impl Injector for EngineBootstrap {
    fn marker(&self) -> &'static str {
        "data-weblingo=\"engine\""
    }

    fn position(&self) -> InjectionPoint {
        InjectionPoint::Head
    }

    fn fragment(&self) -> String {
        format!(
            concat!(
                "<style data-weblingo=\"engine\">",
                "html.{pending} body{{filter:blur(4px);opacity:.6}}",
                "html body{{transition:filter {ms}ms ease,opacity {ms}ms ease}}",
                "</style>",
                "<script data-weblingo=\"engine\">",
                "(function(r){{r.classList.add('{pending}');",
                "setTimeout(function(){{r.classList.remove('{pending}')}},{failsafe})}})",
                "(document.documentElement)",
                "</script>",
                "<script data-weblingo=\"engine\" src=\"{src}\" defer ",
                "onerror=\"document.documentElement.classList.remove('{pending}')\"></script>"
            ),
            pending = PENDING_CLASS,
            ms = REVEAL_TRANSITION_MS,
            failsafe = REVEAL_FAILSAFE_MS,
            src = escape_html(&self.script_url),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_fragment() {
        let html = EngineBootstrap::new("/__weblingo/engine.js?v=1&x=2")
            .inject("<html><head></head><body></body></html>");
        assert!(html.contains("src=\"/__weblingo/engine.js?v=1&amp;x=2\" defer"));
        assert!(html.contains("300ms"));
        assert!(html.find("weblingo-pending").unwrap() < html.find("</head>").unwrap());
    }

    #[test]
    fn test_pending_class_is_always_removable() {
        let fragment = EngineBootstrap::new("/__weblingo/engine.js").fragment();
        let add = format!("classList.add('{}')", PENDING_CLASS);
        let remove = format!("classList.remove('{}')", PENDING_CLASS);

        assert_eq!(fragment.matches(&add).count(), 1);
        // 兜底计时器与脚本加载失败各一处
        assert_eq!(fragment.matches(&remove).count(), 2);
        assert!(fragment.contains(&format!("{})", REVEAL_FAILSAFE_MS)));
        assert!(fragment.contains("onerror="));
        assert!(ENGINE_SCRIPT.contains(&format!("'{}'", PENDING_CLASS)));
        assert!(ENGINE_SCRIPT.contains("classList.remove(PENDING_CLASS)"));
    }

    #[test]
    fn test_engine_script_reads_injected_context() {
        assert!(ENGINE_SCRIPT.contains("window.__WEBLINGO__"));
        for key in [
            "language",
            "target_languages",
            "default_language",
            "api_base",
            "project_api_key",
            "page_origin",
            "fold_buffer",
            "request_timeout_ms",
        ] {
            assert!(ENGINE_SCRIPT.contains(&format!("ctx.{}", key)), "{}", key);
        }
        assert!(ENGINE_SCRIPT.contains("'translate/'"));
        assert!(ENGINE_SCRIPT.contains("MutationObserver"));
    }
}
