//! # Layout 模块
//!
//! 行排版：光标推进、行高累积、自动换行，以及字形快照。
//!
//! 字形尺寸由渲染层通过 [`GlyphMetrics`] 提供，本模块只做几何计算。

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{PlaybackConfig, Rect};
use crate::state::StyleState;

/// 尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// 字形度量服务
///
/// 由渲染层实现。查询失败时返回 `None`/`false`，解释器会回退为默认值或跳过。
pub trait GlyphMetrics {
    /// 指定字体和缩放下单个字符的尺寸
    fn glyph_size(&self, ch: char, font: Option<&str>, scale: f32) -> Size;

    /// 图标尺寸，未知图标返回 `None`
    fn icon_size(&self, id: &str) -> Option<Size>;

    /// 字体是否存在
    fn has_font(&self, id: &str) -> bool;
}

/// 等宽度量
///
/// 所有字符占用相同的格子，适用于终端宿主和测试。
#[derive(Debug, Clone, Default)]
pub struct MonospaceMetrics {
    cell: Size,
    icons: HashMap<String, Size>,
    fonts: HashSet<String>,
}

impl MonospaceMetrics {
    /// 以缩放为 1 时的格子尺寸创建
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell: Size::new(cell_width, cell_height),
            ..Self::default()
        }
    }

    /// 注册图标
    pub fn with_icon(mut self, id: impl Into<String>, size: Size) -> Self {
        self.icons.insert(id.into(), size);
        self
    }

    /// 注册字体
    pub fn with_font(mut self, id: impl Into<String>) -> Self {
        self.fonts.insert(id.into());
        self
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn glyph_size(&self, _ch: char, _font: Option<&str>, scale: f32) -> Size {
        Size::new(self.cell.width * scale, self.cell.height * scale)
    }

    fn icon_size(&self, id: &str) -> Option<Size> {
        self.icons.get(id).copied()
    }

    fn has_font(&self, id: &str) -> bool {
        self.fonts.contains(id)
    }
}

/// 光标位置
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

/// 字形内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlyphKind {
    /// 字符
    Char(char),
    /// 行内图标
    Icon(String),
}

/// 字形快照
///
/// 在 `Text`/`Icon` 执行时创建，记录当时的光标位置和样式副本，之后不再改变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphEntry {
    /// 内容
    pub kind: GlyphKind,
    /// 左上角位置
    pub position: Cursor,
    /// 尺寸
    pub size: Size,
    /// 创建时的样式
    pub style: StyleState,
}

impl GlyphEntry {
    /// 字符内容（图标返回 None）
    pub fn as_char(&self) -> Option<char> {
        match self.kind {
            GlyphKind::Char(c) => Some(c),
            GlyphKind::Icon(_) => None,
        }
    }

    /// 在给定时刻的抖动偏移
    ///
    /// 完全由模拟时钟和字形序号决定，同一时刻多次调用结果相同。
    pub fn shake_offset(&self, clock_ms: u64, index: usize) -> (f32, f32) {
        let shake = &self.style.shake;
        if !shake.is_active() {
            return (0.0, 0.0);
        }
        let t = clock_ms as f32 / 1000.0 * shake.speed;
        let phase = index as f32 * 1.7;
        (
            (t + phase).sin() * shake.x,
            (t * 1.3 + phase).cos() * shake.y,
        )
    }
}

/// 行排版器
#[derive(Debug, Clone)]
pub struct LineLayout {
    window: Rect,
    line_spacing: f32,
    kerning: f32,
    wrap: bool,
    cursor: Cursor,
    /// 当前行已观测到的最大高度
    line_height: f32,
    /// 当前行是否已有内容
    line_started: bool,
}

impl LineLayout {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            window: config.window,
            line_spacing: config.line_spacing,
            kerning: config.kerning,
            wrap: config.wrap,
            cursor: Cursor {
                x: config.window.x,
                y: config.window.y,
            },
            line_height: 0.0,
            line_started: false,
        }
    }

    /// 光标回到窗口左上角
    pub fn reset(&mut self) {
        self.cursor = self.origin();
        self.line_height = 0.0;
        self.line_started = false;
    }

    /// 窗口左上角
    pub fn origin(&self) -> Cursor {
        Cursor {
            x: self.window.x,
            y: self.window.y,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// 放置一个字形，返回其位置
    ///
    /// 开启自动换行时，若非空行放不下该字形，先换行再放置。
    pub fn place(&mut self, size: Size, fallback_height: f32) -> Cursor {
        if self.wrap && self.line_started && self.cursor.x + size.width > self.window.right() {
            self.new_line(fallback_height);
        }
        let position = self.cursor;
        self.cursor.x += size.width + self.kerning;
        self.line_height = self.line_height.max(size.height);
        self.line_started = true;
        position
    }

    /// 换行
    ///
    /// 空行使用 `fallback_height` 作为行高。
    pub fn new_line(&mut self, fallback_height: f32) {
        let height = if self.line_height > 0.0 {
            self.line_height
        } else {
            fallback_height
        };
        self.cursor.x = self.window.x;
        self.cursor.y += height + self.line_spacing;
        self.line_height = 0.0;
        self.line_started = false;
    }
}
