//! # Command 模块
//!
//! 定义脚本编译后的指令序列。
//! Command 由编译器一次性产生，之后只读，由播放解释器逐条执行。
//!
//! ## 设计原则
//!
//! - **封闭集合**：所有指令都是枚举变体，解释器分派时由编译器检查穷尽性
//! - **无副作用**：Command 本身不执行任何操作
//! - **渲染无关**：颜色等值在编译期解析为静态映射，不依赖渲染后端

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 抖动默认频率（`[shake:v]` 和 `[shake:x,y]` 未给出频率时使用）
pub const DEFAULT_SHAKE_SPEED: f32 = 20.0;

/// 字号基准：`[size:n]` 的缩放比例为 `n / SIZE_BASE`
pub const SIZE_BASE: f32 = 24.0;

/// 预定义颜色
///
/// 颜色名解析是一个封闭的静态映射，未识别的名称回退为 [`NamedColor::White`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NamedColor {
    /// 白色（默认）
    #[default]
    White,
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    Gray,
    DarkGray,
    LightGray,
    Orange,
    Purple,
    Pink,
    Brown,
    Gold,
    Silver,
    SkyBlue,
    Lime,
    Transparent,
}

impl NamedColor {
    /// 按名称解析颜色，未识别时回退为白色
    pub fn resolve(name: &str) -> Self {
        Self::from_str(name).unwrap_or_default()
    }

    /// RGBA 分量
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::White => [255, 255, 255, 255],
            Self::Black => [0, 0, 0, 255],
            Self::Red => [255, 0, 0, 255],
            Self::Green => [0, 128, 0, 255],
            Self::Blue => [0, 0, 255, 255],
            Self::Yellow => [255, 255, 0, 255],
            Self::Cyan => [0, 255, 255, 255],
            Self::Magenta => [255, 0, 255, 255],
            Self::Gray => [128, 128, 128, 255],
            Self::DarkGray => [169, 169, 169, 255],
            Self::LightGray => [211, 211, 211, 255],
            Self::Orange => [255, 165, 0, 255],
            Self::Purple => [128, 0, 128, 255],
            Self::Pink => [255, 192, 203, 255],
            Self::Brown => [165, 42, 42, 255],
            Self::Gold => [255, 215, 0, 255],
            Self::Silver => [192, 192, 192, 255],
            Self::SkyBlue => [135, 206, 235, 255],
            Self::Lime => [0, 255, 0, 255],
            Self::Transparent => [0, 0, 0, 0],
        }
    }
}

impl FromStr for NamedColor {
    type Err = ();

    /// 从字符串解析颜色（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "yellow" => Ok(Self::Yellow),
            "cyan" => Ok(Self::Cyan),
            "magenta" => Ok(Self::Magenta),
            "gray" | "grey" => Ok(Self::Gray),
            "darkgray" | "darkgrey" => Ok(Self::DarkGray),
            "lightgray" | "lightgrey" => Ok(Self::LightGray),
            "orange" => Ok(Self::Orange),
            "purple" => Ok(Self::Purple),
            "pink" => Ok(Self::Pink),
            "brown" => Ok(Self::Brown),
            "gold" => Ok(Self::Gold),
            "silver" => Ok(Self::Silver),
            "skyblue" => Ok(Self::SkyBlue),
            "lime" => Ok(Self::Lime),
            "transparent" => Ok(Self::Transparent),
            _ => Err(()),
        }
    }
}

/// 抖动参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shake {
    /// 水平振幅（像素）
    pub x: f32,
    /// 垂直振幅（像素）
    pub y: f32,
    /// 频率
    pub speed: f32,
}

impl Shake {
    /// 创建抖动参数
    pub fn new(x: f32, y: f32, speed: f32) -> Self {
        Self { x, y, speed }
    }

    /// 无抖动
    pub fn none() -> Self {
        Self::new(0.0, 0.0, DEFAULT_SHAKE_SPEED)
    }

    /// 是否有可见的抖动
    pub fn is_active(&self) -> bool {
        self.x != 0.0 || self.y != 0.0
    }
}

impl Default for Shake {
    fn default() -> Self {
        Self::none()
    }
}

/// 编译后的脚本指令
///
/// 文本中的每个字符对应一条 `Text`，以支持逐字显示；
/// 每个被识别的标签对应一条其他指令。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 显示单个字符
    Text(char),

    /// 换行
    NewLine,

    /// 设置字号（缩放比例 = 值 / 24）
    SetSize(i32),

    /// 设置文字颜色
    SetColor(NamedColor),

    /// 设置逐字显示间隔（毫秒，至少为 1）
    SetSpeed(u32),

    /// 设置逐字旋转角度（度）
    SetRotation(f32),

    /// 切换字体（None 表示默认字体）
    SetFont(Option<String>),

    /// 设置抖动
    SetShake(Shake),

    /// 恢复默认样式（不影响输入开关）
    Reset,

    /// 暂停指定毫秒
    Wait(u32),

    /// 行内图标
    Icon(String),

    /// 分页；值大于 0 时在指定毫秒后自动翻页
    Next(u32),

    /// 向外部事件队列投递事件
    Event(String),

    /// 脚本逻辑结束
    End,

    /// 开关外部推进/跳过输入
    SetInputEnabled(bool),
}

impl Command {
    /// 创建速度指令（小于 1 的值钳制为 1）
    pub fn speed(ms: i64) -> Self {
        Self::SetSpeed(ms.clamp(1, u32::MAX as i64) as u32)
    }

    /// 是否消耗显示时间
    ///
    /// 只有 `Text`、`Icon`、`NewLine` 受逐字计时器控制，其余指令立即执行。
    pub fn consumes_time(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Icon(_) | Self::NewLine)
    }

    /// 是否为分页指令
    pub fn is_next(&self) -> bool {
        matches!(self, Self::Next(_))
    }
}
