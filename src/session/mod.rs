//! # 会话模块
//!
//! 会话上下文及其显式的、按依赖排序的更新图。
//!
//! ## 子模块
//! - `sync`: 能量范围同步
//! - `table`: 样品表与同位素表合并
//! - `validator`: 累积式输入校验
//! - `graph`: 会话、事件与阶段
//! - `config`: JSON 会话文件
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`, `physics/`, `plot/assembler.rs`

pub mod config;
pub mod graph;
pub mod sync;
pub mod table;
pub mod validator;

pub use config::SessionConfig;
pub use graph::{Event, EventReport, Session};
pub use validator::ValidatedInput;
