//! # compute 子命令 CLI 定义
//!
//! 单文件模式：输入为一个会话文件（或省略，使用默认会话），输出为一个文件。
//! 批量模式：输入为目录，每个匹配的会话文件在输出目录生成一个同名结果。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compute.rs`

use super::input::InputArgs;
use crate::models::{Granularity, PlotRequest, Scale, TimeUnit, XAxis, YAxis};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 结果输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// Comma-delimited data file
    Csv,
    /// Tab-delimited data on stdout, ready to paste
    Clipboard,
}

impl OutputFormat {
    /// 文件扩展名；剪贴板输出没有文件
    pub fn extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Png => Some("png"),
            OutputFormat::Svg => Some("svg"),
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Clipboard => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Svg => write!(f, "svg"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Clipboard => write!(f, "clipboard"),
        }
    }
}

/// 绘图请求参数；未给出的项沿用会话文件或默认值
#[derive(Args, Debug, Clone, Default)]
pub struct PlotArgs {
    /// X axis quantity
    #[arg(short = 'x', long, value_enum)]
    pub x_axis: Option<XAxis>,

    /// Y axis quantity
    #[arg(short = 'y', long, value_enum)]
    pub y_axis: Option<YAxis>,

    /// Axis scale
    #[arg(long, value_enum)]
    pub scale: Option<Scale>,

    /// Curves to show, comma separated (e.g., "total,layer")
    #[arg(long, value_enum, value_delimiter = ',')]
    pub show: Vec<Granularity>,

    /// Time unit of the time-of-flight axis
    #[arg(long, value_enum)]
    pub time_unit: Option<TimeUnit>,
}

impl PlotArgs {
    /// 在已有请求上覆盖给出的项；没有任何覆盖时返回 None
    pub fn apply_to(&self, base: &PlotRequest) -> Option<PlotRequest> {
        if self.x_axis.is_none()
            && self.y_axis.is_none()
            && self.scale.is_none()
            && self.show.is_empty()
            && self.time_unit.is_none()
        {
            return None;
        }

        let mut request = base.clone();
        if let Some(x) = self.x_axis {
            request.x_axis = x;
        }
        if let Some(y) = self.y_axis {
            request.y_axis = y;
        }
        if let Some(s) = self.scale {
            request.scale = s;
        }
        if !self.show.is_empty() {
            request.show = self.show.clone();
        }
        if let Some(t) = self.time_unit {
            request.time_unit = t;
        }
        Some(request)
    }
}

/// compute 子命令参数
#[derive(Args, Debug)]
pub struct ComputeArgs {
    /// Input: session file or directory of session files (default session if omitted)
    pub input: Option<PathBuf>,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "resonance.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(flatten)]
    pub input_args: InputArgs,

    #[command(flatten)]
    pub plot: PlotArgs,

    /// Chart title (defaults to the layer formulas)
    #[arg(long)]
    pub title: Option<String>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// File pattern for batch mode, comma separated (e.g., "*.json")
    #[arg(short, long, default_value = "*.json")]
    pub pattern: String,

    /// Number of parallel jobs (0 = all CPU cores)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Search subdirectories recursively
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_args_override() {
        assert!(PlotArgs::default().apply_to(&PlotRequest::default()).is_none());

        let args = PlotArgs {
            y_axis: Some(YAxis::CrossSection),
            show: vec![Granularity::Element],
            ..Default::default()
        };
        let request = args.apply_to(&PlotRequest::default()).unwrap();
        assert_eq!(request.y_axis, YAxis::CrossSection);
        assert_eq!(request.show, vec![Granularity::Element]);
        assert_eq!(request.x_axis, XAxis::Energy);
    }
}
