//! # 分节加载
//!
//! 一个脚本文件可以包含多个以 `#label` 行开头的分节：
//!
//! ```text
//! #Intro
//! Hello[next]
//! #Outro
//! Bye[next]
//! ```
//!
//! 分节从标记行的下一行开始，到下一个以 `#` 开头的行（或文件末尾）之前结束，
//! 并去掉首尾空白。文件内容由宿主读取，这里只做截取。

use crate::error::LoadError;

/// 截取分节
///
/// 不带标签时返回全部内容；标签找不到时返回 [`LoadError::LabelNotFound`]，
/// 调用方可用 [`error_page`] 显示一页错误提示代替崩溃。
pub fn extract_section<'a>(source: &'a str, label: Option<&str>) -> Result<&'a str, LoadError> {
    let Some(label) = label else {
        return Ok(source);
    };

    let mut offset = 0;
    let mut start = None;
    for line in source.split_inclusive('\n') {
        let line_end = offset + line.len();
        match start {
            None => {
                if marker_label(line) == Some(label) {
                    start = Some(line_end);
                }
            }
            Some(section_start) => {
                if line.starts_with('#') {
                    return Ok(source[section_start..offset].trim());
                }
            }
        }
        offset = line_end;
    }

    match start {
        Some(section_start) => Ok(source[section_start..].trim()),
        None => Err(LoadError::LabelNotFound {
            label: label.to_string(),
        }),
    }
}

/// 按出现顺序列出全部分节标签
pub fn labels(source: &str) -> Vec<&str> {
    source
        .split_inclusive('\n')
        .filter_map(marker_label)
        .filter(|label| !label.is_empty())
        .collect()
}

/// 生成一页错误提示脚本
///
/// 错误信息中的方括号会被替换，避免被当作标签解析。
pub fn error_page(error: &LoadError) -> String {
    let message = error.to_string().replace('[', "(").replace(']', ")");
    format!("[color:red]{}[reset][next]", message)
}

/// 标记行的标签名
fn marker_label(line: &str) -> Option<&str> {
    line.strip_prefix('#').map(str::trim)
}
