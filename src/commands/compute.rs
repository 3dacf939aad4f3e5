//! # compute 子命令实现
//!
//! 计算共振曲线并绘图或导出。
//!
//! ## 功能
//! - 单文件模式：一个会话文件（或默认会话）→ 一个输出
//! - 批量模式：目录中每个会话文件 → 输出目录中的同名结果，并行计算
//! - 输出 PNG/SVG 图像、CSV 数据或制表符分隔的剪贴板文本
//!
//! ## 依赖关系
//! - 使用 `cli/compute.rs` 定义的 ComputeArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `session/` 建立会话并提交
//! - 使用 `plot/` 渲染与导出

use super::{build_session, print_reports, require_valid};
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::compute::{ComputeArgs, OutputFormat, PlotArgs};
use crate::cli::input::InputArgs;
use crate::error::{ResoError, Result};
use crate::plot::{export, render, PlotData};
use crate::session::{Event, Session};
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 单次计算共用的设置
struct ComputeConfig {
    input: InputArgs,
    plot: PlotArgs,
    format: OutputFormat,
    title: Option<String>,
    width: u32,
    height: u32,
    overwrite: bool,
}

impl ComputeConfig {
    fn from_args(args: &ComputeArgs, format: OutputFormat) -> Self {
        ComputeConfig {
            input: args.input_args.clone(),
            plot: args.plot.clone(),
            format,
            title: args.title.clone(),
            width: args.width,
            height: args.height,
            overwrite: args.overwrite,
        }
    }
}

/// 执行计算
pub fn execute(args: ComputeArgs) -> Result<()> {
    match &args.input {
        Some(input) if input.is_dir() => execute_batch(&args, input),
        Some(input) if !input.is_file() => Err(ResoError::FileNotFound {
            path: input.display().to_string(),
        }),
        session_file => execute_single(&args, session_file.as_deref()),
    }
}

/// 单文件模式
fn execute_single(args: &ComputeArgs, session_file: Option<&Path>) -> Result<()> {
    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));
    let quiet = format == OutputFormat::Clipboard;

    if !quiet {
        output::print_header("Neutron Resonance Computation");
        match session_file {
            Some(path) => output::print_info(&format!("Session file: '{}'", path.display())),
            None => output::print_info("Using the default session"),
        }
    }

    let config = ComputeConfig::from_args(args, format);
    let (session, reports) = build_session(session_file, &config.input, Some(&config.plot))?;
    print_reports(&reports);

    let session = submit(session)?;
    let data = session
        .plot()
        .ok_or_else(|| ResoError::Other("no plot data was produced".to_string()))?;

    if !quiet {
        output::print_info(&format!(
            "{} points, {} curve(s): {} vs {}",
            data.len(),
            data.displayed().len(),
            data.y_label(),
            data.x_label()
        ));
    }

    // 单文件模式下输出已存在时直接覆盖
    write_output(data, &args.output, &config)?;

    if !quiet {
        output::print_success(&format!("Saved {} output to '{}'", format, args.output.display()));
    }
    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &ComputeArgs, input: &Path) -> Result<()> {
    output::print_header("Neutron Resonance Computation (Batch)");
    output::print_info(&format!("Batch mode: directory '{}'", input.display()));

    let format = args.format.unwrap_or(OutputFormat::Png);
    if format == OutputFormat::Clipboard {
        return Err(ResoError::InvalidArgument(
            "clipboard output is only available in single file mode".to_string(),
        ));
    }

    let files = FileCollector::new(input.to_path_buf())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!("No matching files found with pattern '{}'", args.pattern));
        return Ok(());
    }
    output::print_info(&format!("Found {} session files", files.len()));
    output::print_info(&format!("Output format: {}", format));

    fs::create_dir_all(&args.output).map_err(|e| ResoError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let config = Arc::new(ComputeConfig::from_args(args, format));
    let output_dir = args.output.clone();

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| process_batch_file(file, &output_dir, &config))?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量模式下处理单个会话文件
fn process_batch_file(file: &Path, output_dir: &Path, config: &ComputeConfig) -> ProcessResult {
    let name = file.display().to_string();
    let output_path = batch_output_path(file, output_dir, config.format);

    if output_path.exists() && !config.overwrite {
        return ProcessResult::Skipped(format!("'{}' exists", output_path.display()));
    }

    let result = build_session(Some(file), &config.input, Some(&config.plot))
        .and_then(|(session, _)| submit(session))
        .and_then(|session| {
            let data = session
                .plot()
                .ok_or_else(|| ResoError::Other("no plot data was produced".to_string()))?;
            write_output(data, &output_path, config)
        });

    match result {
        Ok(()) => ProcessResult::Success(output_path.display().to_string()),
        Err(e) => ProcessResult::Failed(name, e.to_string()),
    }
}

/// 提交会话：校验通过后组装绘图数据
fn submit(mut session: Session) -> Result<Session> {
    require_valid(&session)?;
    session.apply(Event::Submit)?;
    Ok(session)
}

/// 按格式写出结果
fn write_output(data: &PlotData, path: &Path, config: &ComputeConfig) -> Result<()> {
    let title = config.title.as_deref().unwrap_or(&data.title);
    match config.format {
        OutputFormat::Png => render::generate_plot(data, path, title, config.width, config.height, false),
        OutputFormat::Svg => render::generate_plot(data, path, title, config.width, config.height, true),
        OutputFormat::Csv => export::to_csv(data, path),
        OutputFormat::Clipboard => export::to_clipboard(data),
    }
}

/// 批量模式的输出路径：`<output_dir>/<stem>.<ext>`
fn batch_output_path(file: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("session");
    let ext = format.extension().unwrap_or("txt");
    output_dir.join(format!("{}.{}", stem, ext))
}

/// 从扩展名推断输出格式，无法识别时为 PNG
fn guess_format_from_extension(path: &Path) -> OutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("svg") => OutputFormat::Svg,
        Some("csv") => OutputFormat::Csv,
        _ => OutputFormat::Png,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::input::parse_bounds;

    #[test]
    fn test_guess_format() {
        assert_eq!(guess_format_from_extension(Path::new("a.SVG")), OutputFormat::Svg);
        assert_eq!(guess_format_from_extension(Path::new("a.csv")), OutputFormat::Csv);
        assert_eq!(guess_format_from_extension(Path::new("a.png")), OutputFormat::Png);
        assert_eq!(guess_format_from_extension(Path::new("noext")), OutputFormat::Png);
    }

    #[test]
    fn test_batch_output_path() {
        let path = batch_output_path(Path::new("runs/ag_thin.json"), Path::new("out"), OutputFormat::Csv);
        assert_eq!(path, PathBuf::from("out/ag_thin.csv"));
    }

    #[test]
    fn test_submit_assembles_plot() {
        let input = InputArgs {
            energy: Some(parse_bounds("1-10").unwrap()),
            step: Some(0.1),
            ..Default::default()
        };
        let (session, _) = build_session(None, &input, None).unwrap();
        let session = submit(session).unwrap();
        let data = session.plot().unwrap();
        assert_eq!(data.energy_ev.first().copied(), Some(1.0));
        assert_eq!(data.energy_ev.last().copied(), Some(10.0));
    }

    #[test]
    fn test_batch_writes_csv_and_skips_existing() {
        let dir = std::env::temp_dir().join(format!("resokit-batch-{}", std::process::id()));
        let out = dir.join("out");
        fs::create_dir_all(&out).unwrap();
        let session = dir.join("ag.json");
        fs::write(&session, r#"{ "range": { "energy": { "min": 1, "max": 5 }, "step_ev": 0.5 } }"#).unwrap();

        let config = ComputeConfig {
            input: InputArgs::default(),
            plot: PlotArgs::default(),
            format: OutputFormat::Csv,
            title: None,
            width: 800,
            height: 600,
            overwrite: false,
        };

        let first = process_batch_file(&session, &out, &config);
        assert!(matches!(first, ProcessResult::Success(_)), "{:?}", first);
        let text = fs::read_to_string(out.join("ag.csv")).unwrap();
        assert!(text.starts_with("Energy (eV)"));
        assert_eq!(text.lines().count(), 1 + 9);

        let second = process_batch_file(&session, &out, &config);
        assert!(matches!(second, ProcessResult::Skipped(_)));

        fs::remove_dir_all(&dir).unwrap();
    }
}
