//! # Parser 模块
//!
//! 两阶段脚本编译器（手写扫描，无 regex 依赖）。
//!
//! ## 架构
//!
//! ```text
//! 原始文本 → [阶段1: 去注释 + 切分] → Vec<Segment> → [阶段2: 指令生成] → Script
//! ```
//!
//! ## 设计原则
//!
//! - 容错编译：无法解析的标签被丢弃并记录，编译本身从不失败
//! - 未闭合的 `[` 按普通文本处理
//! - 保留每条指令的源码行号，供诊断使用
//!
//! ## 模块结构
//!
//! - `helpers`: 辅助解析函数
//! - `phase1`: 去注释与切分
//! - `phase2`: 指令生成

pub(crate) mod helpers;
mod phase1;
mod phase2;


use tracing::debug;

use crate::error::TagIssue;
use crate::script::compiled::Script;

use phase2::Phase2Compiler;

pub use helpers::{find_tag, is_comment_line};
pub use phase1::{Segment, split_segments};

/// 脚本编译器
#[derive(Debug, Default)]
pub struct Parser {
    /// 最近一次编译中被丢弃的标签
    issues: Vec<TagIssue>,
}

impl Parser {
    /// 创建新的编译器
    pub fn new() -> Self {
        Self::default()
    }

    /// 编译脚本文本
    ///
    /// 结果总是以 `Next` 结尾。被丢弃的标签可通过 [`Parser::issues`] 获取。
    pub fn parse(&mut self, text: &str) -> Script {
        let mut compiler = Phase2Compiler::new();
        for segment in split_segments(text) {
            compiler.compile_segment(&segment);
        }

        let script = Script::with_source_map(compiler.commands, compiler.source_map);
        debug!(
            commands = script.commands().len(),
            dropped = compiler.issues.len(),
            "脚本编译完成"
        );
        self.issues = compiler.issues;
        script
    }

    /// 最近一次编译中被丢弃的标签
    pub fn issues(&self) -> &[TagIssue] {
        &self.issues
    }
}

impl Script {
    /// 编译脚本文本（丢弃编译问题）
    pub fn compile(text: &str) -> Self {
        Parser::new().parse(text)
    }
}
