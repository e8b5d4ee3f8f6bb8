//! 元素种类分类
//!
//! 用封闭的枚举代替散落各处的标签名比较，便于穷尽匹配

use markup5ever_rcdom::Handle;

use super::dom::{get_node_attr, get_node_name};

/// 内容不可翻译的元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpaqueKind {
    Script,
    Style,
    NoScript,
    Code,
    Pre,
}

/// 翻译引擎关心的元素种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Opaque(OpaqueKind),
    Title,
    Meta,
    Anchor,
    Other,
}

impl ElementKind {
    pub fn classify(local_name: &str) -> Self {
        match local_name.to_ascii_lowercase().as_str() {
            "script" => Self::Opaque(OpaqueKind::Script),
            "style" => Self::Opaque(OpaqueKind::Style),
            "noscript" => Self::Opaque(OpaqueKind::NoScript),
            "code" => Self::Opaque(OpaqueKind::Code),
            "pre" => Self::Opaque(OpaqueKind::Pre),
            "title" => Self::Title,
            "meta" => Self::Meta,
            "a" => Self::Anchor,
            _ => Self::Other,
        }
    }

    /// 非元素节点返回 `None`
    pub fn of(node: &Handle) -> Option<Self> {
        get_node_name(node).map(Self::classify)
    }

    pub fn is_opaque(self) -> bool {
        matches!(self, Self::Opaque(_))
    }
}

/// 可翻译的通用属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatableAttr {
    Alt,
    Title,
    Placeholder,
    AriaLabel,
    /// 仅用于 head 中特定 meta 的 `content`
    MetaContent,
}

impl TranslatableAttr {
    /// 所有元素都检查的属性，按固定顺序
    pub const COMMON: [TranslatableAttr; 4] = [
        TranslatableAttr::Alt,
        TranslatableAttr::Title,
        TranslatableAttr::Placeholder,
        TranslatableAttr::AriaLabel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Alt => "alt",
            Self::Title => "title",
            Self::Placeholder => "placeholder",
            Self::AriaLabel => "aria-label",
            Self::MetaContent => "content",
        }
    }
}

/// 以 `name` 或 `property` 标识的 meta 元素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadMetaRule {
    Name(&'static str),
    Property(&'static str),
}

impl HeadMetaRule {
    pub fn matches(self, meta: &Handle) -> bool {
        let (attr, expected) = match self {
            Self::Name(value) => ("name", value),
            Self::Property(value) => ("property", value),
        };
        get_node_attr(meta, attr)
            .map(|actual| actual.trim().eq_ignore_ascii_case(expected))
            .unwrap_or(false)
    }
}

/// `content` 可翻译的 meta；站点名称与作者不在其中
pub const TRANSLATABLE_META: [HeadMetaRule; 7] = [
    HeadMetaRule::Name("title"),
    HeadMetaRule::Name("description"),
    HeadMetaRule::Name("keywords"),
    HeadMetaRule::Property("og:title"),
    HeadMetaRule::Property("og:description"),
    HeadMetaRule::Name("twitter:title"),
    HeadMetaRule::Name("twitter:description"),
];
