//! 语言上下文全局变量，供客户端引擎读取

use serde_json::json;

use crate::core::{LanguageCode, ProjectConfig};
use crate::edge::inject::{script_json, InjectionPoint, Injector};
use crate::translation::config::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, FOLD_BUFFER, REVEAL_TRANSITION_MS,
};

/// `window.__WEBLINGO__`
#[derive(Debug, Clone)]
pub struct LanguageContext<'a> {
    language: &'a LanguageCode,
    config: &'a ProjectConfig,
    api_base: &'a str,
    api_key: &'a str,
    page_origin: &'a str,
}

impl<'a> LanguageContext<'a> {
    pub fn new(
        language: &'a LanguageCode,
        config: &'a ProjectConfig,
        api_base: &'a str,
        api_key: &'a str,
        page_origin: &'a str,
    ) -> Self {
        Self {
            language,
            config,
            api_base,
            api_key,
            page_origin,
        }
    }
}

impl Injector for LanguageContext<'_> {
    fn marker(&self) -> &'static str {
        "data-weblingo=\"context\""
    }

    fn position(&self) -> InjectionPoint {
        InjectionPoint::Head
    }

    fn fragment(&self) -> String {
        let globals = json!({
            "language": self.language,
            "default_language": self.config.default_language,
            "target_languages": self.config.target_languages,
            "api_base": self.api_base,
            "project_api_key": self.api_key,
            "page_origin": self.page_origin,
            "fold_buffer": FOLD_BUFFER,
            "reveal_ms": REVEAL_TRANSITION_MS,
            "request_timeout_ms": DEFAULT_REQUEST_TIMEOUT_SECS * 1000,
        });
        format!(
            "<script data-weblingo=\"context\">window.__WEBLINGO__={};</script>",
            script_json(&globals)
        )
    }
}
