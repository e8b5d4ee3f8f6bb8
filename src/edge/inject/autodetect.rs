//! 浏览器语言自动检测
//!
//! 每个浏览器会话只执行一次。会话标记在做出任何跳转决定之前写入，
//! 跳转后的页面不会再次触发检测。

use serde_json::json;

use crate::core::ProjectConfig;
use crate::edge::inject::{script_json, InjectionPoint, Injector};

/// 会话存储中的标记键
pub const SESSION_FLAG: &str = "weblingo:autodetect";

#[derive(Debug, Clone)]
pub struct AutoDetect<'a> {
    config: &'a ProjectConfig,
}

impl<'a> AutoDetect<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }
}

impl Injector for AutoDetect<'_> {
    fn marker(&self) -> &'static str {
        "data-weblingo=\"autodetect\""
    }

    fn position(&self) -> InjectionPoint {
        InjectionPoint::Head
    }

    fn fragment(&self) -> String {
        format!(
            concat!(
                "<script data-weblingo=\"autodetect\">(function(){{",
                "try{{var k={flag};if(sessionStorage.getItem(k))return;sessionStorage.setItem(k,'1');}}",
                "catch(e){{return;}}",
                "var n=(navigator.languages&&navigator.languages[0])||navigator.language||'';",
                "var p=n.toLowerCase().split(/[-_]/)[0];",
                "var d={default_language};var t={targets};",
                "if(!p||p===d||t.indexOf(p)<0)return;",
                "location.replace('/'+p+location.pathname+location.search+location.hash);",
                "}})();</script>"
            ),
            flag = script_json(&json!(SESSION_FLAG)),
            default_language = script_json(&json!(self.config.default_language)),
            targets = script_json(&json!(self.config.target_languages)),
        )
    }
}
