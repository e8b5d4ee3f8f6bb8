//! hreflang 备用链接

use crate::core::ProjectConfig;
use crate::edge::inject::{escape_html, InjectionPoint, Injector};

#[derive(Debug, Clone)]
pub struct HreflangLinks<'a> {
    config: &'a ProjectConfig,
    origin: &'a str,
    path_and_query: &'a str,
}

impl<'a> HreflangLinks<'a> {
    /// `path_and_query` 为去掉语言前缀后的规范路径
    pub fn new(config: &'a ProjectConfig, origin: &'a str, path_and_query: &'a str) -> Self {
        Self {
            config,
            origin: origin.trim_end_matches('/'),
            path_and_query,
        }
    }

    fn default_href(&self) -> String {
        format!("{}{}", self.origin, self.path_and_query)
    }

    fn localized_href(&self, language: &str) -> String {
        format!("{}/{}{}", self.origin, language, self.path_and_query)
    }
}

fn alternate(hreflang: &str, href: &str) -> String {
    format!(
        "<link rel=\"alternate\" hreflang=\"{}\" href=\"{}\" data-weblingo=\"hreflang\">",
        escape_html(hreflang),
        escape_html(href)
    )
}

impl Injector for HreflangLinks<'_> {
    fn marker(&self) -> &'static str {
        "data-weblingo=\"hreflang\""
    }

    fn position(&self) -> InjectionPoint {
        InjectionPoint::Head
    }

    fn fragment(&self) -> String {
        let mut links = alternate(self.config.default_language.as_str(), &self.default_href());
        for language in &self.config.target_languages {
            if *language == self.config.default_language {
                continue;
            }
            links.push_str(&alternate(language.as_str(), &self.localized_href(language.as_str())));
        }
        links.push_str(&alternate("x-default", &self.default_href()));
        links
    }
}
