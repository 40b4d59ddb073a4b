//! # 标签语法
//!
//! 封闭的标签词表及每个标签的取值语法。
//!
//! | 标签 | 值 | 指令 |
//! |---|---|---|
//! | `size` | 正整数 | `SetSize` |
//! | `color` | 颜色名（未识别时为白色） | `SetColor` |
//! | `speed` | 整数毫秒（钳制为 ≥1） | `SetSpeed` |
//! | `rotate` | 浮点角度 | `SetRotation` |
//! | `shake` | `v` / `x,y` / `x,y,speed` | `SetShake` |
//! | `reset` | 无 | `Reset` |
//! | `wait` | 整数毫秒（负数视为 0） | `Wait` |
//! | `icon` | 图标 id | `Icon` |
//! | `next` | 可选整数毫秒（缺省或 ≤0 等待推进） | `Next` |
//! | `event` | 事件名 | `Event` |
//! | `font` | 字体 id 或空 | `SetFont` |
//! | `input` | `disable` 或其他 | `SetInputEnabled` |
//! | `end` | 无 | `End` |

use std::str::FromStr;

use crate::command::{Command, DEFAULT_SHAKE_SPEED, NamedColor, Shake};
use crate::error::TagError;

use super::parser::helpers::{non_empty, parse_float, parse_int};

/// 标签种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Size,
    Color,
    Speed,
    Rotate,
    Shake,
    Reset,
    Wait,
    Icon,
    Next,
    Event,
    Font,
    Input,
    End,
}

impl TagKind {
    /// 全部标签种类
    pub const ALL: [TagKind; 13] = [
        TagKind::Size,
        TagKind::Color,
        TagKind::Speed,
        TagKind::Rotate,
        TagKind::Shake,
        TagKind::Reset,
        TagKind::Wait,
        TagKind::Icon,
        TagKind::Next,
        TagKind::Event,
        TagKind::Font,
        TagKind::Input,
        TagKind::End,
    ];

    /// 标签名（小写）
    pub fn key(self) -> &'static str {
        match self {
            TagKind::Size => "size",
            TagKind::Color => "color",
            TagKind::Speed => "speed",
            TagKind::Rotate => "rotate",
            TagKind::Shake => "shake",
            TagKind::Reset => "reset",
            TagKind::Wait => "wait",
            TagKind::Icon => "icon",
            TagKind::Next => "next",
            TagKind::Event => "event",
            TagKind::Font => "font",
            TagKind::Input => "input",
            TagKind::End => "end",
        }
    }
}

impl FromStr for TagKind {
    type Err = ();

    /// 从标签名解析（不区分大小写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        TagKind::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
            .ok_or(())
    }
}

/// 将标签内容（去掉方括号）解析为 Command
///
/// 内容按第一个 `:` 分为标签名和可选的值。
pub fn resolve_tag(inner: &str) -> Result<Command, TagError> {
    let (key, value) = match inner.split_once(':') {
        Some((key, value)) => (key.trim(), Some(value.trim())),
        None => (inner.trim(), None),
    };

    let kind = TagKind::from_str(key).map_err(|_| TagError::UnknownTag {
        key: key.to_string(),
    })?;

    resolve_value(kind, value)
}

/// 按标签种类解析值
pub fn resolve_value(kind: TagKind, value: Option<&str>) -> Result<Command, TagError> {
    let key = kind.key();
    let required = || {
        non_empty(value).ok_or_else(|| TagError::MissingValue {
            key: key.to_string(),
        })
    };

    let command = match kind {
        TagKind::Size => {
            let size = parse_int(key, required()?)?;
            if size <= 0 {
                return Err(invalid(key, required()?, "字号必须为正数"));
            }
            Command::SetSize(i32::try_from(size).map_err(|_| {
                invalid(key, value.unwrap_or_default(), "字号超出范围")
            })?)
        }
        TagKind::Color => Command::SetColor(NamedColor::resolve(value.unwrap_or_default())),
        TagKind::Speed => Command::speed(parse_int(key, required()?)?),
        TagKind::Rotate => Command::SetRotation(parse_float(key, required()?)?),
        TagKind::Shake => Command::SetShake(parse_shake(key, required()?)?),
        TagKind::Reset => Command::Reset,
        TagKind::Wait => Command::Wait(parse_millis(key, required()?)?),
        TagKind::Icon => Command::Icon(required()?.to_string()),
        TagKind::Next => match non_empty(value) {
            Some(ms) => Command::Next(parse_millis(key, ms)?),
            None => Command::Next(0),
        },
        TagKind::Event => Command::Event(required()?.to_string()),
        TagKind::Font => Command::SetFont(non_empty(value).map(str::to_string)),
        TagKind::Input => Command::SetInputEnabled(
            !value.is_some_and(|v| v.eq_ignore_ascii_case("disable")),
        ),
        TagKind::End => Command::End,
    };

    Ok(command)
}

/// 解析抖动参数：`v`、`x,y` 或 `x,y,speed`
fn parse_shake(key: &str, value: &str) -> Result<Shake, TagError> {
    let parts = value
        .split(',')
        .map(|part| parse_float(key, part))
        .collect::<Result<Vec<_>, _>>()?;

    match parts.as_slice() {
        [v] => Ok(Shake::new(*v, *v, DEFAULT_SHAKE_SPEED)),
        [x, y] => Ok(Shake::new(*x, *y, DEFAULT_SHAKE_SPEED)),
        [x, y, speed] => Ok(Shake::new(*x, *y, *speed)),
        _ => Err(invalid(key, value, "需要 1 到 3 个数值")),
    }
}

/// 解析毫秒数，负数按 0 处理
fn parse_millis(key: &str, value: &str) -> Result<u32, TagError> {
    let ms = parse_int(key, value)?;
    Ok(ms.clamp(0, i64::from(u32::MAX)) as u32)
}

fn invalid(key: &str, value: &str, message: &str) -> TagError {
    TagError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
