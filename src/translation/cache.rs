//! 页面级缓存
//!
//! `TranslationCache` 记录 原文 -> 译文，`TranslatedMarks` 记录已回写的节点。
//! 两者只追加不修改，生命周期与页面视图相同。引擎是单线程协作式的，
//! 所以这里使用 `RefCell`，类型本身不是 `Sync`。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use markup5ever_rcdom::{Handle, Node};

/// 其他翻译轮次正在请求的文本，完成时触发
pub type InFlight = Shared<oneshot::Receiver<()>>;

/// 原文到译文的映射
#[derive(Default)]
pub struct TranslationCache {
    entries: RefCell<HashMap<String, String>>,
    in_flight: RefCell<HashMap<String, InFlight>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<String> {
        self.entries.borrow().get(source).cloned()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.borrow().contains_key(source)
    }

    /// 写入一条结果，已存在的条目不会被覆盖
    pub fn insert(&self, source: impl Into<String>, translated: impl Into<String>) -> bool {
        let mut entries = self.entries.borrow_mut();
        let source = source.into();
        if entries.contains_key(&source) {
            return false;
        }
        entries.insert(source, translated.into());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub(crate) fn in_flight(&self, source: &str) -> Option<InFlight> {
        self.in_flight.borrow().get(source).cloned()
    }

    pub(crate) fn reserve(&self, sources: &[String]) -> oneshot::Sender<()> {
        let (done, receiver) = oneshot::channel();
        let shared = receiver.shared();
        let mut in_flight = self.in_flight.borrow_mut();
        for source in sources {
            in_flight.insert(source.clone(), shared.clone());
        }
        done
    }

    pub(crate) fn release(&self, sources: &[String]) {
        let mut in_flight = self.in_flight.borrow_mut();
        for source in sources {
            in_flight.remove(source);
        }
    }

    /// 当前正在请求中的文本数量
    pub fn pending(&self) -> usize {
        self.in_flight.borrow().len()
    }
}

/// 已回写翻译的节点集合
///
/// 以节点地址为键，同时保存弱引用：节点被释放后地址可能复用，
/// 此时弱引用失效，新节点不会被误判为已翻译。
#[derive(Default)]
pub struct TranslatedMarks {
    nodes: RefCell<HashMap<usize, Weak<Node>>>,
}

impl TranslatedMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, node: &Handle) {
        self.nodes
            .borrow_mut()
            .insert(node_key(node), Rc::downgrade(node));
    }

    pub fn is_marked(&self, node: &Handle) -> bool {
        self.nodes
            .borrow()
            .get(&node_key(node))
            .and_then(Weak::upgrade)
            .map(|marked| Rc::ptr_eq(&marked, node))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.nodes
            .borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn node_key(node: &Handle) -> usize {
    Rc::as_ptr(node) as usize
}
