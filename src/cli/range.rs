//! # range 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/range.rs`

use super::input::InputArgs;
use clap::Args;
use std::path::PathBuf;

/// range 子命令参数
#[derive(Args, Debug)]
pub struct RangeArgs {
    /// JSON session file, applied before the flags below
    #[arg(short, long)]
    pub session: Option<PathBuf>,

    #[command(flatten)]
    pub input: InputArgs,
}
