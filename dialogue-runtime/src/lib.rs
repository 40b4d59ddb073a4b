//! # Dialogue Runtime
//!
//! 对话框文本引擎的核心库：标签脚本编译、逐字播放和行排版。
//!
//! ## 架构概述
//!
//! `dialogue-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 宿主每帧驱动一次，读取字形快照绘制，并取走脚本投递的事件：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │──── update(elapsed_ms, advance) ─►│ 排空指令、排版字形
//!   │◄─── glyphs() / get_event() ───────│
//!   │                                   │
//! ```
//!
//! ## 脚本格式
//!
//! 普通文本逐字显示，方括号标签控制样式和节奏：
//!
//! ```text
//! ; 分号开头的行是注释
//! Hello [color:red]world[reset]![wait:500]
//! [shake:3]Whoa[next]
//! ```
//!
//! ## 核心类型
//!
//! - [`Command`]：编译后的指令
//! - [`Script`]：指令序列（总以 `Next` 结尾）
//! - [`DialogueRuntime`]：播放引擎
//! - [`GlyphMetrics`]：渲染层提供的字形度量
//! - [`GlyphEntry`]：带样式快照的字形
//!
//! ## 使用示例
//!
//! ```ignore
//! use dialogue_runtime::{DialogueRuntime, MonospaceMetrics};
//!
//! let mut runtime = DialogueRuntime::new(MonospaceMetrics::new(16.0, 24.0));
//! runtime.show_section(&source, Some("Intro"))?;
//!
//! while runtime.is_busy() {
//!     runtime.update(16, input.clicked());
//!     for glyph in runtime.glyphs() {
//!         // 绘制...
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：Command 定义和颜色表
//! - [`config`]：播放配置
//! - [`diagnostic`]：脚本静态检查
//! - [`error`]：错误类型定义
//! - [`history`]：页面与事件历史
//! - [`layout`]：行排版与字形度量
//! - [`runtime`]：播放引擎
//! - [`script`]：标签语法、编译和分节加载
//! - [`state`]：样式状态和播放状态

pub mod command;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod history;
pub mod layout;
pub mod runtime;
pub mod script;
pub mod state;

// 重导出核心类型
pub use command::{Command, NamedColor, Shake};
pub use config::{PlaybackConfig, Rect};
pub use diagnostic::{
    Diagnostic, DiagnosticLevel, DiagnosticResult, ResourceReference, ResourceType, analyze_script,
    extract_resource_references,
};
pub use error::{ConfigError, DialogueError, DialogueResult, LoadError, TagError, TagIssue};
pub use history::{History, HistoryEvent};
pub use layout::{Cursor, GlyphEntry, GlyphKind, GlyphMetrics, LineLayout, MonospaceMetrics, Size};
pub use runtime::DialogueRuntime;
pub use script::{Parser, Script, TagKind, error_page, extract_section, labels};
pub use state::{PlaybackPhase, PlaybackState, StyleState};
