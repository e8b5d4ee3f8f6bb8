//! 核心数据模型
//!
//! 语言代码、项目配置以及语言名称映射，边缘端和翻译引擎共用

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// 语言代码，统一为小写（如 `fr`、`de`、`pt-br`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 主子标签，`en-us` -> `en`
    pub fn primary_subtag(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LanguageCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for LanguageCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(value: LanguageCode) -> Self {
        value.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 项目配置：默认语言与有序的目标语言列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub default_language: LanguageCode,
    pub target_languages: Vec<LanguageCode>,
}

impl ProjectConfig {
    pub fn new(default_language: impl Into<LanguageCode>, targets: &[&str]) -> Self {
        Self {
            default_language: default_language.into(),
            target_languages: targets.iter().map(|code| LanguageCode::new(code)).collect(),
        }
    }

    /// 路径段是否精确匹配某个目标语言
    pub fn target_for_segment(&self, segment: &str) -> Option<&LanguageCode> {
        if segment.is_empty() {
            return None;
        }
        self.target_languages
            .iter()
            .find(|code| code.as_str() == segment)
    }

    pub fn is_target(&self, language: &LanguageCode) -> bool {
        self.target_languages.contains(language)
    }

    /// 语言切换器的选项：默认语言在前，其后为目标语言（去重）
    pub fn switcher_languages(&self) -> Vec<&LanguageCode> {
        let mut languages = vec![&self.default_language];
        for code in &self.target_languages {
            if !languages.contains(&code) {
                languages.push(code);
            }
        }
        languages
    }

    /// 拆分语言前缀：`/fr/about?x=1` -> (`fr`, `/about?x=1`)
    ///
    /// 首个路径段不是目标语言时返回 `None`。
    pub fn split_locale_prefix(&self, path_and_query: &str) -> Option<(LanguageCode, String)> {
        let (path, query) = match path_and_query.find('?') {
            Some(index) => path_and_query.split_at(index),
            None => (path_and_query, ""),
        };

        let trimmed = path.strip_prefix('/')?;
        let (segment, rest) = match trimmed.find('/') {
            Some(index) => (&trimmed[..index], &trimmed[index..]),
            None => (trimmed, ""),
        };

        let language = self.target_for_segment(segment)?.clone();
        let canonical_path = if rest.is_empty() { "/" } else { rest };
        Some((language, format!("{}{}", canonical_path, query)))
    }
}

/// 语言代码到显示名称的映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageNameMap {
    names: HashMap<LanguageCode, String>,
}

impl LanguageNameMap {
    pub fn from_entries<I, C, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<LanguageCode>,
        N: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(code, name)| (code.into(), name.into()))
                .filter(|(code, name): &(LanguageCode, String)| !code.is_empty() && !name.is_empty())
                .collect(),
        }
    }

    pub fn name(&self, code: &LanguageCode) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// 切换器标签，缺失名称时退回大写代码
    pub fn label(&self, code: &LanguageCode) -> String {
        self.name(code)
            .map(str::to_string)
            .unwrap_or_else(|| code.as_str().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// 拼接服务端点，保证基础地址以 `/` 结尾
pub fn service_endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        let mut base = base.clone();
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code_normalizes() {
        let code = LanguageCode::new(" en-US ");
        assert_eq!(code.as_str(), "en-us");
        assert_eq!(code.primary_subtag(), "en");
    }

    #[test]
    fn test_split_locale_prefix() {
        let config = ProjectConfig::new("en", &["fr", "de"]);

        let (lang, path) = config.split_locale_prefix("/fr/about").unwrap();
        assert_eq!(lang.as_str(), "fr");
        assert_eq!(path, "/about");

        let (lang, path) = config.split_locale_prefix("/de?q=1").unwrap();
        assert_eq!(lang.as_str(), "de");
        assert_eq!(path, "/?q=1");

        assert!(config.split_locale_prefix("/about").is_none());
        assert!(config.split_locale_prefix("/france/x").is_none());
        assert!(config.split_locale_prefix("/en/x").is_none());
        assert!(config.split_locale_prefix("/").is_none());
    }

    #[test]
    fn test_switcher_languages_dedup_default() {
        let config = ProjectConfig::new("en", &["fr", "en", "de"]);
        let codes: Vec<&str> = config
            .switcher_languages()
            .into_iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(codes, vec!["en", "fr", "de"]);
    }

    #[test]
    fn test_language_name_label_fallback() {
        let names = LanguageNameMap::from_entries([("fr", "Français")]);
        assert_eq!(names.label(&"fr".into()), "Français");
        assert_eq!(names.label(&"de".into()), "DE");
    }

    #[test]
    fn test_service_endpoint_keeps_base_path() {
        let base = Url::parse("https://api.example.com/v1").unwrap();
        assert_eq!(
            service_endpoint(&base, "translate/").unwrap().as_str(),
            "https://api.example.com/v1/translate/"
        );
        let base = Url::parse("https://api.example.com/").unwrap();
        assert_eq!(
            service_endpoint(&base, "languages/").unwrap().as_str(),
            "https://api.example.com/languages/"
        );
    }
}
