//! # 阶段 1：切分
//!
//! 去除注释行，并将剩余文本切分为交替的普通文本段和标签段。
//!
//! 标签不会跨行，因此按行处理与对整段文本做最短匹配的结果相同，
//! 同时可以保留原始行号。

use super::helpers::{find_tag, is_comment_line};

/// 文本段（阶段 1 输出）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// 普通文本（可能包含行尾的换行符）
    Text { text: &'a str, line: usize },
    /// 标签内容（已去掉方括号）
    Tag { inner: &'a str, line: usize },
}

impl Segment<'_> {
    /// 获取段所在的行号（从 1 开始）
    pub fn line(&self) -> usize {
        match self {
            Segment::Text { line, .. } => *line,
            Segment::Tag { line, .. } => *line,
        }
    }
}

/// 切分文本
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();

    for (line_idx, line) in text.split_inclusive('\n').enumerate() {
        let line_number = line_idx + 1;

        // 注释行连同换行符一起去掉
        if is_comment_line(line) {
            continue;
        }

        let mut rest = line;
        while let Some((open, close)) = find_tag(rest) {
            if open > 0 {
                segments.push(Segment::Text {
                    text: &rest[..open],
                    line: line_number,
                });
            }
            segments.push(Segment::Tag {
                inner: &rest[open + 1..close],
                line: line_number,
            });
            rest = &rest[close + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text {
                text: rest,
                line: line_number,
            });
        }
    }

    segments
}
