//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作
//! - `element`: 元素种类的封闭分类
//! - `serializer`: 序列化功能

pub mod dom;
pub mod element;
pub mod serializer;

pub use dom::{
    ancestors, find_first_element, get_node_attr, get_node_name, get_parent_node, has_class,
    html_to_dom, is_attached, node_text, parse_html, set_node_attr, set_node_text,
};
pub use element::{ElementKind, HeadMetaRule, OpaqueKind, TranslatableAttr, TRANSLATABLE_META};
pub use serializer::{serialize_document, serialize_to_string};
