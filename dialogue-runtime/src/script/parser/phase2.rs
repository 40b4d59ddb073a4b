//! # 阶段 2：指令生成
//!
//! 将文本段逐字展开为 `Text`/`NewLine`，将标签段解析为对应指令。

use tracing::warn;

use crate::command::Command;
use crate::error::TagIssue;
use crate::script::grammar::resolve_tag;

use super::phase1::Segment;

/// 阶段 2 编译器
#[derive(Default)]
pub struct Phase2Compiler {
    /// 被丢弃的标签（非致命）
    pub issues: Vec<TagIssue>,
    /// 输出指令
    pub commands: Vec<Command>,
    /// 每条指令对应的源码行号
    pub source_map: Vec<usize>,
}

impl Phase2Compiler {
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            commands: Vec::new(),
            source_map: Vec::new(),
        }
    }

    /// 编译单个文本段
    pub fn compile_segment(&mut self, segment: &Segment<'_>) {
        match *segment {
            Segment::Text { text, line } => self.compile_text(text, line),
            Segment::Tag { inner, line } => self.compile_tag(inner, line),
        }
    }

    /// 普通文本：每个字符一条指令，`\r` 丢弃，`\n` 变为换行
    fn compile_text(&mut self, text: &str, line: usize) {
        for ch in text.chars() {
            match ch {
                '\r' => {}
                '\n' => self.emit(Command::NewLine, line),
                c => self.emit(Command::Text(c), line),
            }
        }
    }

    /// 标签：解析失败时丢弃并记录
    fn compile_tag(&mut self, inner: &str, line: usize) {
        match resolve_tag(inner) {
            Ok(command) => self.emit(command, line),
            Err(error) => {
                let issue = TagIssue {
                    line,
                    tag: format!("[{}]", inner),
                    error,
                };
                warn!(%issue, "标签已丢弃");
                self.issues.push(issue);
            }
        }
    }

    fn emit(&mut self, command: Command, line: usize) {
        self.commands.push(command);
        self.source_map.push(line);
    }
}
