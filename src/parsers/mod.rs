//! # 解析器模块
//!
//! - `html` - HTML 文档解析、DOM 操作、元素分类、序列化
//! - `link_rewriter` - 为站内链接补上语言前缀

pub mod html;
pub mod link_rewriter;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, serialize_document, ElementKind, OpaqueKind, TranslatableAttr};
pub use link_rewriter::{rewrite_links, LocalePrefixer};
