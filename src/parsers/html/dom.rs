use std::io;

use encoding_rs::Encoding;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 将 HTML 字节按文档编码解码后转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> io::Result<RcDom> {
    let s = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => encoding.decode(data).0.into_owned(),
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_html(&s)
}

/// 解析已解码的 HTML 字符串
pub fn parse_html(html: &str) -> io::Result<RcDom> {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
}

/// 深度优先查找第一个指定名称的元素
pub fn find_first_element(node: &Handle, element_name: &str) -> Option<Handle> {
    if get_node_name(node) == Some(element_name) {
        return Some(node.clone());
    }

    for child_node in node.children.borrow().iter() {
        if let Some(found) = find_first_element(child_node, element_name) {
            return Some(found);
        }
    }

    None
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 元素的 class 列表中是否含有指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 获取父节点
///
/// rcdom 把父指针存放在 `Cell` 中，读取后必须放回。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 由近及远的祖先节点（不含自身）
pub fn ancestors(node: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    let mut current = get_parent_node(node);
    while let Some(parent) = current {
        current = get_parent_node(&parent);
        found.push(parent);
    }
    found
}

/// 节点是否仍挂在文档树上
pub fn is_attached(node: &Handle) -> bool {
    if matches!(node.data, NodeData::Document) {
        return true;
    }
    ancestors(node)
        .last()
        .map(|root| matches!(root.data, NodeData::Document))
        .unwrap_or(false)
}

/// 文本节点内容
pub fn node_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 替换文本节点内容，非文本节点返回 false
pub fn set_node_text(node: &Handle, text: &str) -> bool {
    match &node.data {
        NodeData::Text { contents } => {
            let mut contents = contents.borrow_mut();
            contents.clear();
            contents.push_slice(text);
            true
        }
        _ => false,
    }
}

/// 设置节点属性，`None` 表示删除
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<&str>) {
    use html5ever::interface::{Attribute, QualName};
    use html5ever::tendril::format_tendril;
    use html5ever::LocalName;

    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs_mut = attrs.borrow_mut();

        match attr_value {
            Some(value) => {
                if let Some(existing) = attrs_mut
                    .iter_mut()
                    .find(|attr| &*attr.name.local == attr_name)
                {
                    existing.value.clear();
                    existing.value.push_slice(value);
                } else {
                    attrs_mut.push(Attribute {
                        name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                        value: format_tendril!("{}", value),
                    });
                }
            }
            None => attrs_mut.retain(|attr| &*attr.name.local != attr_name),
        }
    }
}
