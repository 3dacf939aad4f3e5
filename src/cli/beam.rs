//! # beam 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/beam.rs`

use super::input::InputArgs;
use crate::physics::beam::DEFAULT_BEAM_STEP_EV;
use clap::Args;
use std::path::PathBuf;

/// beam 子命令参数
#[derive(Args, Debug)]
pub struct BeamArgs {
    /// Beam spectrum file with two columns: energy (eV) and flux
    pub spectrum: PathBuf,

    /// JSON session file, applied before the flags below
    #[arg(short, long)]
    pub session: Option<PathBuf>,

    /// Energy step in eV of the transmission grid spanning the spectrum
    #[arg(long, default_value_t = DEFAULT_BEAM_STEP_EV)]
    pub beam_step: f64,

    #[command(flatten)]
    pub input: InputArgs,
}
