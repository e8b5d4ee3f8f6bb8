// 集成测试公共模块
//
// DOM 构造辅助函数和假的协作方

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Mutex;

use async_trait::async_trait;
use markup5ever_rcdom::{Handle, RcDom};

use weblingo::core::{LanguageCode, LanguageNameMap, ProjectConfig};
use weblingo::edge::{EdgeError, EdgeResult, ProjectSource};
use weblingo::parsers::html::{find_first_element, get_parent_node, parse_html, serialize_to_string};
use weblingo::translation::{TranslationError, TranslationPair, TranslationResult, Translator};

/// 解析测试文档
pub fn document(html: &str) -> RcDom {
    parse_html(html).expect("test document should parse")
}

/// 第一个指定名称的元素
pub fn element(root: &Handle, name: &str) -> Handle {
    find_first_element(root, name).unwrap_or_else(|| panic!("<{}> should exist", name))
}

/// 带指定 id 的元素
pub fn element_by_id(root: &Handle, id: &str) -> Handle {
    fn walk(node: &Handle, id: &str) -> Option<Handle> {
        if weblingo::parsers::html::get_node_attr(node, "id").as_deref() == Some(id) {
            return Some(node.clone());
        }
        node.children.borrow().iter().find_map(|child| walk(child, id))
    }
    walk(root, id).unwrap_or_else(|| panic!("#{} should exist", id))
}

/// 元素的第一个子节点（通常是文本节点）
pub fn first_child(node: &Handle) -> Handle {
    node.children.borrow()[0].clone()
}

pub fn html(dom: &RcDom) -> String {
    serialize_to_string(dom).expect("document should serialize")
}

/// 从另一份文档中取出元素并挂到 `parent` 末尾，模拟脚本插入节点
pub fn insert_fragment(parent: &Handle, fragment_html: &str, name: &str) -> Handle {
    let fragment = document(fragment_html);
    let node = element(&fragment.document, name);

    if let Some(old_parent) = get_parent_node(&node) {
        old_parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, &node));
    }
    node.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(node.clone());
    node
}

/// 按词典翻译的假翻译服务，记录每批请求
#[derive(Default)]
pub struct DictionaryTranslator {
    dictionary: HashMap<String, String>,
    fail: bool,
    batches: Mutex<Vec<Vec<String>>>,
}

impl DictionaryTranslator {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            dictionary: entries
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    /// 全部请求过的文本（按请求顺序）
    pub fn requested(&self) -> Vec<String> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl Translator for DictionaryTranslator {
    async fn translate_batch(
        &self,
        _language: &LanguageCode,
        texts: &[String],
    ) -> TranslationResult<Vec<TranslationPair>> {
        self.batches.lock().unwrap().push(texts.to_vec());
        if self.fail {
            return Err(TranslationError::ServiceStatus(503));
        }
        Ok(texts
            .iter()
            .filter_map(|text| {
                self.dictionary
                    .get(text)
                    .map(|translated| TranslationPair::new(text.clone(), translated.clone()))
            })
            .collect())
    }
}

/// 固定配置的项目来源
pub struct FixedProject {
    pub config: Option<ProjectConfig>,
    pub names: LanguageNameMap,
}

impl FixedProject {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config: Some(config),
            names: LanguageNameMap::from_entries([
                ("en", "English"),
                ("fr", "Français"),
                ("de", "Deutsch"),
            ]),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            config: None,
            names: LanguageNameMap::default(),
        }
    }
}

#[async_trait]
impl ProjectSource for FixedProject {
    async fn project_config(&self, _api_key: &str) -> EdgeResult<ProjectConfig> {
        self.config
            .clone()
            .ok_or_else(|| EdgeError::ConfigUnavailable("plan-status unreachable".to_string()))
    }

    async fn language_names(&self) -> EdgeResult<LanguageNameMap> {
        Ok(self.names.clone())
    }
}

/// 一个典型的源站页面
pub const ABOUT_PAGE: &str = concat!(
    "<!DOCTYPE html><html><head><title>About us</title>",
    "<meta name=\"description\" content=\"Who we are\"></head>",
    "<body><h1>Hello</h1><p>World</p><a href=\"/contact\">Contact</a></body></html>"
);
