//! # 诊断模块
//!
//! 提供脚本静态检查和诊断 API，不依赖 IO 或渲染。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - 复用编译器的切分与标签解析，不重复解析逻辑
//!
//! 运行时会静默丢弃无法解析的标签以保证对话不会卡住，
//! 这里把这些被丢弃的内容报告给作者。

use std::collections::HashSet;
use std::str::FromStr;

use crate::command::{Command, NamedColor};
use crate::error::TagError;
use crate::script::grammar::resolve_tag;
use crate::script::loader::extract_section;
use crate::script::parser::{Segment, split_segments};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 脚本 ID / 文件路径
    pub script_id: String,
    /// 行号（如果可定位，从 1 开始）
    pub line: Option<usize>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选，如原始标签）
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            script_id: script_id.into(),
            line: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建错误诊断
    pub fn error(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, script_id, message)
    }

    /// 创建警告诊断
    pub fn warn(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, script_id, message)
    }

    /// 创建信息诊断
    pub fn info(script_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, script_id, message)
    }

    /// 设置行号
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.script_id)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.count(DiagnosticLevel::Error)
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.count(DiagnosticLevel::Warn)
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }
}

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// 行内图标
    Icon,
    /// 字体
    Font,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Icon => write!(f, "图标"),
            Self::Font => write!(f, "字体"),
        }
    }
}

/// 资源引用信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    /// 资源类型
    pub resource_type: ResourceType,
    /// 资源 id
    pub id: String,
    /// 所在行号
    pub line: usize,
}

//=============================================================================
// 脚本分析 API
//=============================================================================

/// 分析脚本源文件，返回诊断结果
///
/// 执行以下检查：
/// - 无法解析的标签（未知标签为警告，值不合法为错误）
/// - 未识别的颜色名（会回退为白色）
/// - 未闭合的 `[`（会按普通文本显示）
/// - 重复或为空的分节标签
pub fn analyze_script(script_id: &str, source: &str) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    let marker_lines: HashSet<usize> = source
        .lines()
        .enumerate()
        .filter(|(_, line)| line.starts_with('#'))
        .map(|(idx, _)| idx + 1)
        .collect();

    for segment in split_segments(source) {
        match segment {
            Segment::Tag { inner, line } => check_tag(script_id, inner, line, &mut result),
            Segment::Text { text, line } => {
                if text.contains('[') && !marker_lines.contains(&line) {
                    result.push(
                        Diagnostic::info(script_id, "未闭合的 '['，将按普通文本显示")
                            .with_line(line)
                            .with_detail(text.trim_end()),
                    );
                }
            }
        }
    }

    check_sections(script_id, source, &mut result);
    result
}

fn check_tag(script_id: &str, inner: &str, line: usize, result: &mut DiagnosticResult) {
    let tag = format!("[{}]", inner);
    match resolve_tag(inner) {
        Ok(Command::SetColor(NamedColor::White)) => {
            let name = inner.split_once(':').map(|(_, v)| v.trim()).unwrap_or("");
            if NamedColor::from_str(name).is_err() {
                result.push(
                    Diagnostic::warn(script_id, format!("未识别的颜色 '{}'，将使用白色", name))
                        .with_line(line)
                        .with_detail(tag),
                );
            }
        }
        Ok(_) => {}
        Err(error @ TagError::UnknownTag { .. }) => {
            result.push(
                Diagnostic::warn(script_id, format!("{}，标签将被忽略", error))
                    .with_line(line)
                    .with_detail(tag),
            );
        }
        Err(error) => {
            result.push(
                Diagnostic::error(script_id, format!("{}，标签将被忽略", error))
                    .with_line(line)
                    .with_detail(tag),
            );
        }
    }
}

fn check_sections(script_id: &str, source: &str, result: &mut DiagnosticResult) {
    let mut seen = HashSet::new();
    for (idx, line) in source.lines().enumerate() {
        let Some(label) = line.strip_prefix('#').map(str::trim) else {
            continue;
        };
        let line_number = idx + 1;

        if label.is_empty() {
            result.push(Diagnostic::warn(script_id, "空的分节标签").with_line(line_number));
            continue;
        }

        if !seen.insert(label) {
            result.push(
                Diagnostic::warn(
                    script_id,
                    format!("重复的分节标签 '#{}'，只有第一个会被加载", label),
                )
                .with_line(line_number),
            );
            continue;
        }

        if extract_section(source, Some(label)).is_ok_and(str::is_empty) {
            result.push(
                Diagnostic::warn(script_id, format!("分节 '#{}' 没有内容", label))
                    .with_line(line_number),
            );
        }
    }
}

/// 提取脚本中的所有资源引用（图标与字体）
pub fn extract_resource_references(source: &str) -> Vec<ResourceReference> {
    split_segments(source)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Tag { inner, line } => match resolve_tag(inner) {
                Ok(Command::Icon(id)) => Some(ResourceReference {
                    resource_type: ResourceType::Icon,
                    id,
                    line,
                }),
                Ok(Command::SetFont(Some(id))) => Some(ResourceReference {
                    resource_type: ResourceType::Font,
                    id,
                    line,
                }),
                _ => None,
            },
            Segment::Text { .. } => None,
        })
        .collect()
}
