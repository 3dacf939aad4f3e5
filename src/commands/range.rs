//! # range 子命令实现
//!
//! 同步能量范围表并输出两个端点的全部表示。
//!
//! ## 依赖关系
//! - 使用 `cli/range.rs` 定义的 RangeArgs
//! - 使用 `session/` 进行范围同步
//! - 使用 `tabled` 打印表格

use super::{build_session, print_reports};
use crate::cli::range::RangeArgs;
use crate::error::{FieldError, ResoError, Result};
use crate::models::{Endpoint, RangeEntry, RangeRow};
use crate::physics::units::energy_grid_len_bound;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 范围表行
#[derive(Debug, Clone, Tabled)]
struct RangeTableRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Energy (eV)")]
    energy: String,
    #[tabled(rename = "Wavelength (Å)")]
    wavelength: String,
    #[tabled(rename = "Velocity (m/s)")]
    velocity: String,
    #[tabled(rename = "TOF (µs)")]
    tof: String,
    #[tabled(rename = "Class")]
    class: String,
}

impl RangeTableRow {
    fn new(endpoint: Endpoint, row: &RangeRow) -> Self {
        RangeTableRow {
            endpoint: endpoint.to_string(),
            energy: format!("{:.6e}", row.energy_ev),
            wavelength: format!("{:.6}", row.wavelength_angstrom),
            velocity: format!("{:.2}", row.velocity_m_s),
            tof: format!("{:.3}", row.tof_us),
            class: row.class.to_string(),
        }
    }
}

/// 执行范围同步
pub fn execute(args: RangeArgs) -> Result<()> {
    output::print_header("Neutron Energy Range");

    let (session, reports) = build_session(args.session.as_deref(), &args.input, None)?;
    print_reports(&reports);

    print_range_table(session.range());

    let step = session.step().as_f64();
    if let Some(step) = step.filter(|s| *s > 0.0) {
        let (lo, hi) = session.range().energy_bounds();
        output::print_info(&format!(
            "Energy step: {} eV (about {:.0} grid points)",
            step,
            energy_grid_len_bound(lo, hi, step)
        ));
    }

    // 只报告范围相关的错误；样品层错误由 stack/compute 报告
    let errors: Vec<FieldError> = session
        .errors()
        .into_iter()
        .filter(|e| e.field.starts_with("range"))
        .collect();
    if !errors.is_empty() {
        return Err(ResoError::Validation(errors));
    }

    output::print_success("Range is consistent");
    Ok(())
}

fn print_range_table(range: &RangeEntry) {
    let rows = vec![
        RangeTableRow::new(Endpoint::Min, &range.min),
        RangeTableRow::new(Endpoint::Max, &range.max),
    ];
    println!("{}", Table::new(&rows));

    output::print_info(&format!("Distance: {} m", range.distance_m));
    output::print_info(&format!("Detector delay: {} µs", range.delay_us));
    output::print_info(&format!("Source of truth: {}", range.source));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_row_formatting() {
        let range = RangeEntry::default();
        let row = RangeTableRow::new(Endpoint::Max, &range.max);
        assert_eq!(row.endpoint, "max");
        assert_eq!(row.energy, "1.000000e2");
        assert_eq!(row.class, range.max.class.to_string());
    }
}
