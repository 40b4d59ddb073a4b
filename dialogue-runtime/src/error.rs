//! # Error 模块
//!
//! 定义 dialogue-runtime 中使用的错误类型。
//!
//! 编译期错误（[`TagError`]）从不中断编译，只会导致对应标签被丢弃；
//! 调用方唯一可见的失败是加载期的标签定位失败（[`LoadError`]）。

use thiserror::Error;

/// 标签解析错误
///
/// 单个标签无法解析为 Command 时产生，该标签会被丢弃。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TagError {
    /// 未知的标签名
    #[error("未知标签 '{key}'")]
    UnknownTag { key: String },

    /// 缺少必需的值
    #[error("标签 '{key}' 缺少参数值")]
    MissingValue { key: String },

    /// 无效的参数值
    #[error("标签 '{key}' 的值 '{value}' 无效 - {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// 编译时被丢弃的标签
#[derive(Debug, Clone, PartialEq)]
pub struct TagIssue {
    /// 所在行号（从 1 开始）
    pub line: usize,
    /// 原始标签文本（含方括号）
    pub tag: String,
    /// 丢弃原因
    pub error: TagError,
}

impl std::fmt::Display for TagIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "第 {} 行：{} 已忽略 - {}", self.line, self.tag, self.error)
    }
}

/// 脚本加载错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// 标签（分节标记）未找到
    #[error("标签 '#{label}' 未找到")]
    LabelNotFound { label: String },
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 配置内容无法解析
    #[error("配置解析失败: {message}")]
    Invalid { message: String },

    /// 配置值不合法
    #[error("配置验证失败: {message}")]
    Validation { message: String },
}

/// dialogue-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DialogueError {
    /// 加载错误
    #[error("加载错误: {0}")]
    Load(#[from] LoadError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type DialogueResult<T> = Result<T, DialogueError>;
