//! # beam 子命令实现
//!
//! 读取束流谱，计算样品层对整个束流的加权总透射率。
//!
//! ## 依赖关系
//! - 使用 `cli/beam.rs` 定义的 BeamArgs
//! - 使用 `physics/beam.rs` 计算加权透射率
//! - 使用 `utils/progress.rs` 显示计算进度

use super::{build_session, print_reports, require_valid};
use crate::cli::beam::BeamArgs;
use crate::error::{ResoError, Result};
use crate::physics::beam::BeamSpectrum;
use crate::utils::{output, progress};

use tabled::{Table, Tabled};

/// 结果行
#[derive(Debug, Clone, Tabled)]
struct BeamRow {
    #[tabled(rename = "Stack")]
    stack: String,
    #[tabled(rename = "Transmission (%)")]
    transmission: String,
    #[tabled(rename = "Attenuation (%)")]
    attenuation: String,
}

/// 执行束流加权透射率计算
pub fn execute(args: BeamArgs) -> Result<()> {
    output::print_header("Beam-Weighted Transmission");

    if !args.spectrum.is_file() {
        return Err(ResoError::FileNotFound {
            path: args.spectrum.display().to_string(),
        });
    }
    let spectrum = BeamSpectrum::load(&args.spectrum)?;
    let (lo, hi) = spectrum.energy_span();
    output::print_info(&format!(
        "Spectrum '{}': {} points, {:.4e} - {:.4e} eV",
        args.spectrum.display(),
        spectrum.energy_ev.len(),
        lo,
        hi
    ));

    let (session, reports) = build_session(args.session.as_deref(), &args.input, None)?;
    print_reports(&reports);
    let input = require_valid(&session)?;

    let spinner = progress::create_spinner("Computing transmission over the beam spectrum");
    let result = spectrum.weighted_transmission(session.engine(), &input.stack, args.beam_step);
    spinner.finish_and_clear();
    let result = result?;

    let stack = input
        .layers
        .iter()
        .map(|l| format!("{} ({} mm)", l.formula.text, l.thickness_mm))
        .collect::<Vec<_>>()
        .join(" + ");
    let rows = vec![BeamRow {
        stack,
        transmission: format!("{:.2}", result.transmission_pct),
        attenuation: format!("{:.2}", result.attenuation_pct),
    }];
    println!("{}", Table::new(&rows));

    output::print_done("Beam-weighted transmission computed");
    Ok(())
}
