//! # Runtime 模块
//!
//! 对话播放解释器。
//!
//! ## 模块结构
//!
//! - [`engine`]：播放引擎（状态机与逐字计时）
//! - [`executor`]：单条指令的执行

pub mod engine;
pub mod executor;

pub use engine::DialogueRuntime;
pub use executor::Page;
