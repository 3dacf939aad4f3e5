//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `range`: 同步并显示能量范围表
//! - `stack`: 校验样品层并输出组成报告
//! - `compute`: 计算共振曲线并绘图或导出（支持批量）
//! - `beam`: 束流谱加权的总透射率
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: input, range, stack, compute, beam

pub mod beam;
pub mod compute;
pub mod input;
pub mod range;
pub mod stack;

use clap::{Parser, Subcommand};

/// resokit - 中子共振成像工具箱
#[derive(Parser)]
#[command(name = "resokit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "A neutron resonance imaging toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize and print the energy / wavelength / time-of-flight range
    Range(range::RangeArgs),

    /// Validate the sample stack and print its composition
    Stack(stack::StackArgs),

    /// Compute transmission, attenuation or cross-section curves and plot or export them
    Compute(compute::ComputeArgs),

    /// Compute the beam-weighted total transmission of the sample stack
    Beam(beam::BeamArgs),
}
