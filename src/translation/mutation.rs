//! DOM 插入任务队列
//!
//! 宿主的变更观察回调是初始三个阶段之后唯一的任务来源：每个新插入的节点入队一个任务，
//! 任务严格按入队顺序逐个处理，彼此不并发。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use markup5ever_rcdom::Handle;

use crate::translation::engine::{Engine, PassReport};

/// 排空统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// 实际翻译的子树
    pub processed: usize,
    /// 被跳过的任务（非元素、已脱离、已标记、退出翻译）
    pub skipped: usize,
    pub pass: PassReport,
}

/// 子树翻译任务队列
#[derive(Default)]
pub struct MutationQueue {
    tasks: RefCell<VecDeque<Handle>>,
    draining: Cell<bool>,
}

impl MutationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次变更中插入的节点
    pub fn record_insertions<I>(&self, inserted: I)
    where
        I: IntoIterator<Item = Handle>,
    {
        self.tasks.borrow_mut().extend(inserted);
    }

    pub fn enqueue(&self, node: Handle) {
        self.tasks.borrow_mut().push_back(node);
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    /// 按入队顺序处理全部任务，包括处理期间新入队的任务
    ///
    /// 已有调用在排空时再次调用会立即返回，由正在进行的那次继续处理。
    pub async fn drain(&self, engine: &Engine) -> DrainReport {
        let mut report = DrainReport::default();
        if self.draining.replace(true) {
            return report;
        }

        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(root) = next else {
                break;
            };
            match engine.translate_inserted(&root).await {
                Some(pass) => {
                    report.processed += 1;
                    report.pass.absorb(pass);
                }
                None => report.skipped += 1,
            }
        }

        self.draining.set(false);
        if report.processed > 0 {
            tracing::debug!(
                "增量翻译完成: 子树 {}，跳过 {}，回写 {}",
                report.processed,
                report.skipped,
                report.pass.applied
            );
        }
        report
    }
}
