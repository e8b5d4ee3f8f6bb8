//! 回写阶段
//!
//! 每个候选项按原文查缓存：有译文且与原文不同才写回并标记；
//! 没有结果或译文相同则保持原样，不标记，留给之后的轮次。

use std::collections::HashSet;

use crate::parsers::html::{get_node_attr, node_text, set_node_attr, set_node_text};
use crate::translation::cache::{node_key, TranslatedMarks, TranslationCache};
use crate::translation::collector::{Candidate, CandidateTarget};

/// 候选项自提取以来是否失效：已被其他轮次标记，或内容已被页面脚本改动
pub fn is_stale(candidate: &Candidate, marks: &TranslatedMarks) -> bool {
    if marks.is_marked(candidate.marked_node()) {
        return true;
    }
    current_source(candidate).as_deref() != Some(candidate.source.as_str())
}

fn current_source(candidate: &Candidate) -> Option<String> {
    match &candidate.target {
        CandidateTarget::Text(node) => node_text(node).map(|text| text.trim().to_string()),
        CandidateTarget::Attribute { element, attr } => {
            get_node_attr(element, attr.name()).map(|value| value.trim().to_string())
        }
    }
}

/// 回写并标记，返回写入次数
pub fn apply_candidates(
    candidates: &[Candidate],
    cache: &TranslationCache,
    marks: &TranslatedMarks,
) -> usize {
    // 同一元素的多个属性在本次回写中依次写入，之后才视为已标记
    let mut marked_here: HashSet<usize> = HashSet::new();
    let mut applied = 0;

    for candidate in candidates {
        let node = candidate.marked_node();
        let key = node_key(node);
        if marks.is_marked(node) && !marked_here.contains(&key) {
            continue;
        }

        let Some(translated) = cache.get(&candidate.source) else {
            continue;
        };
        if translated == candidate.source {
            continue;
        }

        let written = match &candidate.target {
            CandidateTarget::Text(text_node) => {
                let Some(current) = node_text(text_node) else {
                    continue;
                };
                if current.trim() != candidate.source {
                    continue;
                }
                set_node_text(text_node, &preserve_whitespace(&current, &translated))
            }
            CandidateTarget::Attribute { element, attr } => {
                match get_node_attr(element, attr.name()) {
                    Some(current) if current.trim() == candidate.source => {
                        set_node_attr(element, attr.name(), Some(&translated));
                        true
                    }
                    _ => false,
                }
            }
        };

        if written {
            marks.mark(node);
            marked_here.insert(key);
            applied += 1;
        }
    }

    applied
}

/// 保留原文本首尾的空白
fn preserve_whitespace(original: &str, translated: &str) -> String {
    let leading_len = original.len() - original.trim_start().len();
    let trailing_start = original.trim_end().len();
    let leading = &original[..leading_len];
    let trailing = if trailing_start >= leading_len {
        &original[trailing_start..]
    } else {
        ""
    };
    format!("{}{}{}", leading, translated, trailing)
}
