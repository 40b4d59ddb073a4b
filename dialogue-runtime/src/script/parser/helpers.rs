//! # 辅助解析函数
//!
//! 手写的字符串解析辅助函数，无正则依赖。

use crate::error::TagError;

/// 去除首尾空白后非空则返回
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 判断一行是否为注释行（首个非空白字符为 `;`）
pub fn is_comment_line(line: &str) -> bool {
    line.trim_start().starts_with(';')
}

/// 在单行中查找第一个完整的标签
///
/// 返回 `[` 和其后第一个 `]` 的字节位置。没有匹配的 `]` 时返回 `None`，
/// 此时该 `[` 及之后的内容都按普通文本处理。
pub fn find_tag(s: &str) -> Option<(usize, usize)> {
    let open = s.find('[')?;
    let close = s[open + 1..].find(']')? + open + 1;
    Some((open, close))
}

/// 解析整数值
pub fn parse_int(key: &str, value: &str) -> Result<i64, TagError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| TagError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// 解析有限浮点值
pub fn parse_float(key: &str, value: &str) -> Result<f32, TagError> {
    let parsed = value
        .trim()
        .parse::<f32>()
        .map_err(|e| TagError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })?;
    if !parsed.is_finite() {
        return Err(TagError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: "需要有限数值".to_string(),
        });
    }
    Ok(parsed)
}
