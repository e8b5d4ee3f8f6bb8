//! 页面增强管道
//!
//! 翻译页：引擎引导、语言上下文、hreflang、语言切换器，并设置
//! `Content-Language` 与缓存头。默认语言页：只注入自动检测脚本和语言切换器。

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{self, HeaderValue};

use crate::core::{LanguageCode, LanguageNameMap, ProjectConfig};
use crate::edge::inject::{
    inject_all, AutoDetect, EngineBootstrap, HreflangLinks, Injector, LanguageContext,
    LanguageSwitcher,
};
use crate::edge::origin::PageResponse;

/// 翻译页的缓存头
pub const TRANSLATED_CACHE_CONTROL: &str = "public, max-age=3600";

/// 解码后的 HTML 及其原始编码
#[derive(Debug, Clone)]
pub struct HtmlBody {
    pub text: String,
    pub encoding: &'static Encoding,
}

impl HtmlBody {
    /// 按 Content-Type 声明的字符集解码，默认 UTF-8，BOM 优先
    pub fn decode(page: &PageResponse) -> Self {
        let declared = page
            .charset()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, encoding, had_errors) = declared.decode(&page.body);
        if had_errors {
            tracing::debug!("页面包含无法以 {} 解码的字节", encoding.name());
        }
        Self {
            text: text.into_owned(),
            encoding,
        }
    }

    pub fn with_text(self, text: String) -> Self {
        Self { text, ..self }
    }

    /// 以原编码重新编码
    pub fn encode(&self) -> Vec<u8> {
        let (bytes, _, _) = self.encoding.encode(&self.text);
        bytes.into_owned()
    }
}

/// 翻译页管道所需的上下文
#[derive(Debug, Clone)]
pub struct TranslatedPage<'a> {
    pub language: &'a LanguageCode,
    pub config: &'a ProjectConfig,
    pub names: &'a LanguageNameMap,
    /// 对外可见的源
    pub public_origin: &'a str,
    /// 去掉语言前缀后的路径
    pub canonical_path: &'a str,
    pub api_base: &'a str,
    pub api_key: &'a str,
    pub engine_script_url: &'a str,
    /// 已在服务端翻译，不再需要遮罩和客户端引擎
    pub prerendered: bool,
}

/// 增强翻译页
pub fn augment_translated(mut page: PageResponse, body: HtmlBody, context: &TranslatedPage<'_>) -> PageResponse {
    let bootstrap = EngineBootstrap::new(context.engine_script_url);
    let globals = LanguageContext::new(
        context.language,
        context.config,
        context.api_base,
        context.api_key,
        context.public_origin,
    );
    let hreflang = HreflangLinks::new(context.config, context.public_origin, context.canonical_path);
    let switcher = LanguageSwitcher::new(context.language, context.config, context.names);

    let html = if context.prerendered {
        let injectors: [&dyn Injector; 3] = [&globals, &hreflang, &switcher];
        inject_all(&body.text, &injectors)
    } else {
        let injectors: [&dyn Injector; 4] = [&bootstrap, &globals, &hreflang, &switcher];
        inject_all(&body.text, &injectors)
    };
    page.body = body.with_text(html).encode();

    page.headers.remove(header::CONTENT_LENGTH);
    if let Ok(value) = HeaderValue::from_str(context.language.as_str()) {
        page.headers.insert(header::CONTENT_LANGUAGE, value);
    }
    page.headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(TRANSLATED_CACHE_CONTROL),
    );
    page
}

/// 增强默认语言页
pub fn augment_default(mut page: PageResponse, config: &ProjectConfig, names: &LanguageNameMap) -> PageResponse {
    let body = HtmlBody::decode(&page);
    let autodetect = AutoDetect::new(config);
    let switcher = LanguageSwitcher::new(&config.default_language, config, names);

    let injectors: [&dyn Injector; 2] = [&autodetect, &switcher];
    let html = inject_all(&body.text, &injectors);
    page.body = body.with_text(html).encode();
    page.headers.remove(header::CONTENT_LENGTH);
    page
}
