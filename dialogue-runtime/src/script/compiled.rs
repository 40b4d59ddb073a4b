//! # 编译结果
//!
//! 一次 `show` 所播放的指令序列。

use serde::{Deserialize, Serialize};

use crate::command::Command;

/// 编译后的脚本
///
/// 不变式：最后一条指令总是 `Next`，保证播放总会停在确定的等待状态，
/// 而不会越过序列末尾。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// 指令序列
    commands: Vec<Command>,
    /// 每条指令对应的源码行号（自动追加的 `Next` 没有行号）
    #[serde(skip)]
    source_map: Vec<usize>,
}

impl Script {
    /// 由指令序列创建脚本，必要时追加 `Next(0)`
    pub fn new(commands: Vec<Command>) -> Self {
        Self::with_source_map(commands, Vec::new())
    }

    /// 创建带行号映射的脚本
    pub fn with_source_map(mut commands: Vec<Command>, source_map: Vec<usize>) -> Self {
        if !commands.last().is_some_and(Command::is_next) {
            commands.push(Command::Next(0));
        }
        Self {
            commands,
            source_map,
        }
    }

    /// 获取指定索引的指令
    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    /// 全部指令
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// 指令对应的源码行号
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.source_map.get(index).copied()
    }

    /// 纯文本内容（字符和换行，忽略标签）
    pub fn plain_text(&self) -> String {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::Text(c) => Some(*c),
                Command::NewLine => Some('\n'),
                _ => None,
            })
            .collect()
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
