//! # Executor 模块
//!
//! 单条指令的执行：修改样式和播放状态、排版字形、投递事件。
//!
//! 计时判断（消耗型指令是否轮到执行）由引擎的排空循环负责，
//! 这里只处理“执行”本身，并告诉循环是否需要停下。

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::command::Command;
use crate::config::PlaybackConfig;
use crate::history::{History, HistoryEvent};
use crate::layout::{GlyphEntry, GlyphKind, GlyphMetrics, LineLayout, Size};
use crate::state::{PlaybackState, StyleState};

/// 当前页的输出缓冲
#[derive(Debug, Clone)]
pub struct Page {
    /// 行排版器
    pub layout: LineLayout,
    /// 已创建的字形（只追加）
    pub glyphs: Vec<GlyphEntry>,
    /// 当前页的纯文本（用于历史记录）
    pub text: String,
}

impl Page {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            layout: LineLayout::new(config),
            glyphs: Vec::new(),
            text: String::new(),
        }
    }

    /// 清空字形并让光标回到原点
    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.text.clear();
        self.layout.reset();
    }
}

/// 执行后排空循环的走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// 继续执行下一条
    Continue,
    /// 停止本次排空
    Halt,
}

/// 指令执行器
///
/// 借用引擎的各个状态字段，每次排空时临时构造。
pub struct Executor<'a, M: GlyphMetrics> {
    pub state: &'a mut PlaybackState,
    pub style: &'a mut StyleState,
    pub page: &'a mut Page,
    pub events: &'a mut VecDeque<String>,
    pub history: &'a mut History,
    pub metrics: &'a M,
    pub default_speed_ms: u32,
    pub clock_ms: u64,
}

impl<M: GlyphMetrics> Executor<'_, M> {
    /// 执行单条指令
    ///
    /// `instant` 为真时（跳过模式）`Wait` 不生效。
    pub fn execute(&mut self, command: &Command, instant: bool) -> Flow {
        match command {
            Command::Text(c) => {
                self.place_char(*c);
                Flow::Continue
            }
            Command::Icon(id) => {
                self.place_icon(id);
                Flow::Continue
            }
            Command::NewLine => {
                let fallback = self.fallback_line_height();
                self.page.layout.new_line(fallback);
                self.page.text.push('\n');
                Flow::Continue
            }
            Command::SetSize(size) => {
                self.style.set_size(*size);
                Flow::Continue
            }
            Command::SetColor(color) => {
                self.style.color = *color;
                Flow::Continue
            }
            Command::SetSpeed(ms) => {
                self.style.set_speed(*ms);
                Flow::Continue
            }
            Command::SetRotation(degrees) => {
                self.style.rotation = *degrees;
                Flow::Continue
            }
            Command::SetFont(font) => {
                match font {
                    None => self.style.font = None,
                    Some(id) if self.metrics.has_font(id) => self.style.font = Some(id.clone()),
                    Some(id) => warn!(font = %id, "未知字体，保持当前字体"),
                }
                Flow::Continue
            }
            Command::SetShake(shake) => {
                self.style.shake = *shake;
                Flow::Continue
            }
            Command::Reset => {
                *self.style = StyleState::with_speed(self.default_speed_ms);
                Flow::Continue
            }
            Command::Wait(ms) => {
                if instant || *ms == 0 {
                    return Flow::Continue;
                }
                self.state.pause_ms = *ms;
                self.state.char_timer_ms = 0;
                Flow::Halt
            }
            Command::Next(ms) => {
                self.finish_page();
                self.state.forced_wait_ms = *ms;
                Flow::Halt
            }
            Command::Event(name) => {
                debug!(event = %name, "触发事件");
                self.events.push_back(name.clone());
                self.history.push(HistoryEvent::event(name.clone(), self.clock_ms));
                Flow::Continue
            }
            Command::End => {
                self.state.script_ended = true;
                self.finish_page();
                Flow::Halt
            }
            Command::SetInputEnabled(enabled) => {
                self.state.input_enabled = *enabled;
                Flow::Continue
            }
        }
    }

    /// 当前页完成：进入等待并记录页面文本
    pub fn finish_page(&mut self) {
        self.state.finish_page();
        let text = self.page.text.trim_end();
        if !text.is_empty() {
            self.history.push(HistoryEvent::page(text, self.clock_ms));
        }
    }

    fn place_char(&mut self, c: char) {
        let size = self
            .metrics
            .glyph_size(c, self.style.font.as_deref(), self.style.scale);
        self.place(GlyphKind::Char(c), size);
        self.page.text.push(c);
    }

    fn place_icon(&mut self, id: &str) {
        match self.metrics.icon_size(id) {
            Some(size) => self.place(GlyphKind::Icon(id.to_string()), size),
            None => warn!(icon = %id, "未知图标，已跳过"),
        }
    }

    fn place(&mut self, kind: GlyphKind, size: Size) {
        let fallback = self.fallback_line_height();
        let position = self.page.layout.place(size, fallback);
        self.page.glyphs.push(GlyphEntry {
            kind,
            position,
            size,
            style: self.style.clone(),
        });
    }

    /// 空行使用的行高：当前样式下一个空格的高度
    fn fallback_line_height(&self) -> f32 {
        self.metrics
            .glyph_size(' ', self.style.font.as_deref(), self.style.scale)
            .height
    }
}
