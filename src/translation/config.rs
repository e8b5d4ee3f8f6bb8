//! 翻译引擎配置

use std::time::Duration;

use url::Url;

use crate::core::LanguageCode;

/// 引擎常量
pub mod constants {
    /// 首屏判定在视口高度之外额外放宽的距离
    pub const FOLD_BUFFER: f64 = 200.0;
    /// 遮罩淡出的过渡时长
    pub const REVEAL_TRANSITION_MS: u64 = 300;
    /// 退出翻译的类名
    pub const OPT_OUT_CLASS: &str = "notranslate";
    /// 退出翻译的属性，取值为 `no`
    pub const OPT_OUT_ATTR: &str = "translate";
    /// 默认请求超时
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
    /// 引擎脚本未能揭开遮罩时的兜底时限，略长于一次翻译请求
    pub const REVEAL_FAILSAFE_MS: u64 = DEFAULT_REQUEST_TIMEOUT_SECS * 1000 + 2000;
}

/// 单个页面视图的引擎配置
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 当前页面语言
    pub language: LanguageCode,
    /// 项目的全部目标语言
    pub target_languages: Vec<LanguageCode>,
    /// 站点默认语言
    pub default_language: Option<LanguageCode>,
    /// 首屏缓冲
    pub fold_buffer: f64,
    /// 遮罩过渡时长
    pub reveal_transition: Duration,
    /// 页面源，用于识别同源绝对链接
    pub page_origin: Option<Url>,
}

impl EngineConfig {
    pub fn new(language: impl Into<LanguageCode>, targets: &[&str]) -> Self {
        Self {
            language: language.into(),
            target_languages: targets.iter().map(|code| LanguageCode::new(code)).collect(),
            default_language: None,
            fold_buffer: constants::FOLD_BUFFER,
            reveal_transition: Duration::from_millis(constants::REVEAL_TRANSITION_MS),
            page_origin: None,
        }
    }

    pub fn with_default_language(mut self, default_language: impl Into<LanguageCode>) -> Self {
        self.default_language = Some(default_language.into());
        self
    }

    pub fn with_page_origin(mut self, page_origin: Option<Url>) -> Self {
        self.page_origin = page_origin;
        self
    }

    pub fn with_reveal_transition(mut self, reveal_transition: Duration) -> Self {
        self.reveal_transition = reveal_transition;
        self
    }
}
