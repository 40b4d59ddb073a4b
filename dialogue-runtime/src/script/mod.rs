//! # Script 模块
//!
//! 脚本语言相关功能：标签语法、编译器和分节加载。
//!
//! ## 模块结构
//!
//! - [`grammar`]：标签词表与取值语法
//! - [`parser`]：两阶段编译器
//! - [`loader`]：从多段脚本文件中截取带标签的分节
//! - [`compiled`]：编译结果

pub mod compiled;
pub mod grammar;
pub mod loader;
pub mod parser;

pub use compiled::Script;
pub use grammar::{TagKind, resolve_tag};
pub use loader::{error_page, extract_section, labels};
pub use parser::Parser;
