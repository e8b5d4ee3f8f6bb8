//! 语言切换器
//!
//! 固定结构的 `<select>`，切换时先去掉现有的两字母前缀，再拼上所选语言的前缀。
//! 容器带有退出翻译标记，客户端引擎不会翻译它。

use serde_json::json;

use crate::core::{LanguageCode, LanguageNameMap, ProjectConfig};
use crate::edge::inject::{escape_html, script_json, InjectionPoint, Injector};

#[derive(Debug, Clone)]
pub struct LanguageSwitcher<'a> {
    current: &'a LanguageCode,
    config: &'a ProjectConfig,
    names: &'a LanguageNameMap,
}

impl<'a> LanguageSwitcher<'a> {
    pub fn new(current: &'a LanguageCode, config: &'a ProjectConfig, names: &'a LanguageNameMap) -> Self {
        Self {
            current,
            config,
            names,
        }
    }

    fn options(&self) -> String {
        self.config
            .switcher_languages()
            .into_iter()
            .map(|code| {
                format!(
                    "<option value=\"{}\"{}>{}</option>",
                    escape_html(code.as_str()),
                    if code == self.current { " selected" } else { "" },
                    escape_html(&self.names.label(code))
                )
            })
            .collect()
    }
}

impl Injector for LanguageSwitcher<'_> {
    fn marker(&self) -> &'static str {
        "data-weblingo=\"switcher\""
    }

    fn position(&self) -> InjectionPoint {
        InjectionPoint::BodyEnd
    }

    fn fragment(&self) -> String {
        let default_language = script_json(&json!(self.config.default_language));
        format!(
            concat!(
                "<div class=\"weblingo-switcher notranslate\" translate=\"no\" data-weblingo=\"switcher\">",
                "<select aria-label=\"Language\">{options}</select>",
                "</div>",
                "<script data-weblingo=\"switcher\">(function(){{",
                "var s=document.querySelector('[data-weblingo=\"switcher\"] select');",
                "if(!s)return;",
                "s.addEventListener('change',function(){{",
                "var d={default_language};",
                "var p=location.pathname.replace(/^\\/[a-z]{{2}}(?=\\/|$)/,'')||'/';",
                "var l=s.value;",
                "location.href=(l===d?'':'/'+l)+p+location.search+location.hash;",
                "}});",
                "}})();</script>"
            ),
            options = self.options(),
            default_language = default_language,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switcher_lists_default_then_targets() {
        let config = ProjectConfig::new("en", &["fr", "de"]);
        let names = LanguageNameMap::from_entries([("en", "English"), ("fr", "Français")]);
        let current = LanguageCode::new("fr");
        let fragment = LanguageSwitcher::new(&current, &config, &names).fragment();

        let en = fragment.find("value=\"en\"").unwrap();
        let fr = fragment.find("value=\"fr\" selected>Français").unwrap();
        let de = fragment.find("value=\"de\">DE").unwrap();
        assert!(en < fr && fr < de);
        assert_eq!(fragment.matches("<option").count(), 3);
        assert!(fragment.contains("translate=\"no\""));
        assert!(fragment.contains("replace(/^\\/[a-z]{2}(?=\\/|$)/,'')"));
    }

    #[test]
    fn test_switcher_goes_before_body_end() {
        let config = ProjectConfig::new("en", &["fr"]);
        let names = LanguageNameMap::default();
        let current = LanguageCode::new("en");
        let html = LanguageSwitcher::new(&current, &config, &names).inject("<body><p>x</p></body>");
        assert!(html.starts_with("<body><p>x</p><div class=\"weblingo-switcher"));
        assert!(html.ends_with("</script></body>"));
    }
}
