//! 可见性分区
//!
//! 以 `视口高度 + 缓冲` 为界，把一轮提取的候选项分成首屏与首屏以下两部分。
//! 分区只在一轮开始时计算一次，不做持久化。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::parsers::html::ancestors;
use crate::translation::collector::Candidate;

/// 宿主提供的布局信息
pub trait Layout {
    /// 视口高度
    fn viewport_height(&self) -> f64;

    /// 元素包围盒顶部相对视口的位置，未知时返回 `None`
    fn element_top(&self, element: &Handle) -> Option<f64>;
}

/// 分区结果
#[derive(Debug, Default)]
pub struct VisibilityPartition {
    pub above: Vec<Candidate>,
    pub below: Vec<Candidate>,
}

impl VisibilityPartition {
    pub fn len(&self) -> usize {
        self.above.len() + self.below.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 按首屏边界分区，每个候选项恰好落入一侧
///
/// 没有几何信息的候选项归入首屏，保证它们在揭开遮罩前被处理。
pub fn partition(candidates: Vec<Candidate>, layout: &dyn Layout, buffer: f64) -> VisibilityPartition {
    let boundary = layout.viewport_height() + buffer;
    let (above, below) = candidates.into_iter().partition(|candidate| {
        candidate
            .layout_element()
            .and_then(|element| layout.element_top(&element))
            .map(|top| top < boundary)
            .unwrap_or(true)
    });

    VisibilityPartition { above, below }
}

/// 视口无限高，所有内容都在首屏（服务端预渲染使用）
#[derive(Debug, Clone, Copy, Default)]
pub struct UnboundedLayout;

impl Layout for UnboundedLayout {
    fn viewport_height(&self) -> f64 {
        f64::INFINITY
    }

    fn element_top(&self, _element: &Handle) -> Option<f64> {
        Some(0.0)
    }
}

/// 预先登记元素位置的布局
///
/// 未登记的元素继承最近的已登记祖先的位置。
#[derive(Debug, Default)]
pub struct StaticLayout {
    viewport_height: f64,
    positions: Vec<(Handle, f64)>,
}

impl StaticLayout {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            positions: Vec::new(),
        }
    }

    pub fn place(&mut self, element: &Handle, top: f64) -> &mut Self {
        self.positions.push((element.clone(), top));
        self
    }

    fn lookup(&self, element: &Handle) -> Option<f64> {
        self.positions
            .iter()
            .rev()
            .find(|(placed, _)| Rc::ptr_eq(placed, element))
            .map(|(_, top)| *top)
    }
}

impl Layout for StaticLayout {
    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn element_top(&self, element: &Handle) -> Option<f64> {
        self.lookup(element).or_else(|| {
            ancestors(element)
                .iter()
                .find_map(|ancestor| self.lookup(ancestor))
        })
    }
}
