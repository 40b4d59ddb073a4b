//! # Config 模块
//!
//! 播放与排版配置。所有字段都有默认值，配置文件中缺省的字段使用默认值。
//!
//! 本模块不做任何 IO，宿主负责读取文件后调用 [`PlaybackConfig::from_json_str`]。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::DEFAULT_SPEED_MS;

/// 矩形区域
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 右边界
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(
            default_window_x(),
            default_window_y(),
            default_window_width(),
            default_window_height(),
        )
    }
}

/// 播放配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// 文本窗口区域（光标原点为左上角）
    #[serde(default)]
    pub window: Rect,

    /// 行间距（像素）
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,

    /// 字间距（像素）
    #[serde(default)]
    pub kerning: f32,

    /// 默认逐字显示间隔（毫秒）
    #[serde(default = "default_speed_ms")]
    pub default_speed_ms: u32,

    /// 超出窗口右边界时是否自动换行
    #[serde(default = "default_wrap")]
    pub wrap: bool,

    /// 历史记录最大条数（0 表示不记录）
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// 等待推进提示的闪烁周期（毫秒，0 表示常亮）
    #[serde(default = "default_blink_period_ms")]
    pub blink_period_ms: u64,
}

fn default_window_x() -> f32 {
    40.0
}

fn default_window_y() -> f32 {
    520.0
}

fn default_window_width() -> f32 {
    1200.0
}

fn default_window_height() -> f32 {
    160.0
}

fn default_line_spacing() -> f32 {
    4.0
}

fn default_speed_ms() -> u32 {
    DEFAULT_SPEED_MS
}

fn default_wrap() -> bool {
    true
}

fn default_history_limit() -> usize {
    200
}

fn default_blink_period_ms() -> u64 {
    500
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            window: Rect::default(),
            line_spacing: default_line_spacing(),
            kerning: 0.0,
            default_speed_ms: default_speed_ms(),
            wrap: default_wrap(),
            history_limit: default_history_limit(),
            blink_period_ms: default_blink_period_ms(),
        }
    }
}

impl PlaybackConfig {
    /// 从 JSON 文本解析配置，并验证
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Invalid {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::Validation {
                message: "窗口宽高必须大于 0".to_string(),
            });
        }
        if self.default_speed_ms == 0 {
            return Err(ConfigError::Validation {
                message: "default_speed_ms 必须至少为 1".to_string(),
            });
        }
        if self.line_spacing < 0.0 {
            return Err(ConfigError::Validation {
                message: "line_spacing 不能为负数".to_string(),
            });
        }
        Ok(())
    }
}
