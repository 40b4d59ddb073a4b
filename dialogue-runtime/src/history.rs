//! # History 模块
//!
//! 回看记录：已完成页面的纯文本和已触发的事件。
//!
//! ## 设计原则
//!
//! - 只记录页面完成时的文本（字符与换行），图标和样式不记录
//! - 时间戳使用解释器的模拟时钟，与帧驱动的时间源一致
//! - 记录数有上限，超出时丢弃最早的记录

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// 历史事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// 一页已完成的文本
    Page {
        /// 页面文本
        text: String,
        /// 模拟时钟（毫秒）
        clock_ms: u64,
    },

    /// 已触发的事件
    Event {
        /// 事件名
        name: String,
        /// 模拟时钟（毫秒）
        clock_ms: u64,
    },
}

impl HistoryEvent {
    /// 获取事件时间
    pub fn clock_ms(&self) -> u64 {
        match self {
            HistoryEvent::Page { clock_ms, .. } => *clock_ms,
            HistoryEvent::Event { clock_ms, .. } => *clock_ms,
        }
    }

    /// 创建页面事件
    pub fn page(text: impl Into<String>, clock_ms: u64) -> Self {
        HistoryEvent::Page {
            text: text.into(),
            clock_ms,
        }
    }

    /// 创建事件记录
    pub fn event(name: impl Into<String>, clock_ms: u64) -> Self {
        HistoryEvent::Event {
            name: name.into(),
            clock_ms,
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    /// 事件列表（按时间顺序）
    events: VecDeque<HistoryEvent>,
    /// 最大记录数
    max_events: usize,
}

impl History {
    /// 创建新的历史记录
    pub fn new() -> Self {
        Self::with_max_events(200)
    }

    /// 以指定上限创建（0 表示不记录）
    pub fn with_max_events(max: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events: max,
        }
    }

    /// 添加事件
    pub fn push(&mut self, event: HistoryEvent) {
        if self.max_events == 0 {
            return;
        }
        self.events.push_back(event);
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    /// 按时间顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEvent> {
        self.events.iter()
    }

    /// 所有页面文本（按时间顺序）
    pub fn pages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HistoryEvent::Page { text, .. } => Some(text.as_str()),
                HistoryEvent::Event { .. } => None,
            })
            .collect()
    }

    /// 页面数量
    pub fn page_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Page { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
