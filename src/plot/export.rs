//! # 绘图数据导出
//!
//! 以分隔文本导出当前显示的曲线。
//!
//! ## 列
//! `Energy (eV)`, `Wavelength (Å)`, `Time-of-flight (µs)`，随后每条显示曲线一列，
//! 列名为 `<y 量>: <曲线标签>`。
//!
//! ## 输出目标
//! - 文件：逗号分隔 CSV
//! - 剪贴板：制表符分隔文本，写到标准输出
//!
//! ## 依赖关系
//! - 被 `commands/compute.rs` 调用
//! - 使用 `plot/assembler.rs` 的 PlotData
//! - 使用 `csv` 库写入

use crate::error::{ResoError, Result};
use crate::plot::assembler::{tof_label, PlotData};

use std::io::{self, Write};
use std::path::Path;

/// 导出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSink {
    /// 逗号分隔文件
    File,
    /// 制表符分隔，写到标准输出
    Clipboard,
}

impl ExportSink {
    pub fn delimiter(self) -> u8 {
        match self {
            ExportSink::File => b',',
            ExportSink::Clipboard => b'\t',
        }
    }
}

/// 表头
pub fn header(data: &PlotData) -> Vec<String> {
    let mut header = vec![
        "Energy (eV)".to_string(),
        "Wavelength (Å)".to_string(),
        tof_label(data.request.time_unit),
    ];
    let y_label = data.y_label();
    header.extend(data.displayed().iter().map(|s| format!("{}: {}", y_label, s.label)));
    header
}

/// 写出分隔文本
pub fn write_delimited<W: Write>(writer: W, data: &PlotData, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(header(data))?;

    let shown = data.displayed();
    for i in 0..data.len() {
        let mut record = vec![
            format!("{:.9e}", data.energy_ev[i]),
            format!("{:.9e}", data.wavelength_angstrom[i]),
            format!("{:.9e}", data.tof[i]),
        ];
        record.extend(
            shown
                .iter()
                .map(|s| s.values.get(i).map(|v| format!("{:.6e}", v)).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| ResoError::Other(format!("failed to flush export: {}", e)))?;
    Ok(())
}

/// 导出为 CSV 文件
pub fn to_csv(data: &PlotData, output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path).map_err(|e| ResoError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    write_delimited(io::BufWriter::new(file), data, ExportSink::File.delimiter())
}

/// 以制表符分隔文本写到标准输出
pub fn to_clipboard(data: &PlotData) -> Result<()> {
    let stdout = io::stdout();
    write_delimited(stdout.lock(), data, ExportSink::Clipboard.delimiter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Cell, Granularity, PlotRequest, RangeEntry, SampleRow, TimeUnit, XAxis, YAxis,
    };
    use crate::physics::engine::ResonanceEngine;
    use crate::plot::assembler::assemble;
    use crate::session::table::SampleTable;
    use crate::session::validator::validate;

    fn small_data(y_axis: YAxis, show: Vec<Granularity>) -> PlotData {
        let range = RangeEntry::from_energies(1.0, 2.0, 16.45, 0.0).unwrap();
        let table = SampleTable::new(vec![SampleRow::new("Ag", 0.5, Cell::blank())]);
        let input = validate(&range, &Cell::from(0.5), &table, false).unwrap();
        let request = PlotRequest {
            y_axis,
            show,
            ..Default::default()
        };
        assemble(&ResonanceEngine::new(), &input, &request).unwrap()
    }

    #[test]
    fn test_header_names_quantities() {
        let data = small_data(YAxis::Transmission, vec![Granularity::Total, Granularity::Isotope]);
        assert_eq!(
            header(&data),
            vec![
                "Energy (eV)",
                "Wavelength (Å)",
                "Time-of-flight (µs)",
                "Transmission: Total",
                "Transmission: Ag/Ag/107-Ag",
                "Transmission: Ag/Ag/109-Ag",
            ]
        );
    }

    #[test]
    fn test_tab_delimited_output() {
        let data = small_data(YAxis::Attenuation, vec![Granularity::Layer]);
        let mut buf = Vec::new();
        write_delimited(&mut buf, &data, ExportSink::Clipboard.delimiter()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 3, "header plus three grid points");
        assert_eq!(lines[0].split('\t').count(), 4);
        assert!(lines[1].starts_with("1.000000000e0\t"));
    }

    #[test]
    fn test_cold_energies_survive_export() {
        let range = RangeEntry::from_energies(1e-7, 5e-7, 16.45, 0.0).unwrap();
        let table = SampleTable::new(vec![SampleRow::new("Ag", 0.5, Cell::blank())]);
        let input = validate(&range, &Cell::from(1e-7), &table, false).unwrap();
        let request = PlotRequest {
            x_axis: XAxis::Time,
            time_unit: TimeUnit::S,
            ..Default::default()
        };
        let data = assemble(&ResonanceEngine::new(), &input, &request).unwrap();

        let mut buf = Vec::new();
        write_delimited(&mut buf, &data, ExportSink::File.delimiter()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows.len(), data.len());

        let close = |a: f64, b: f64| ((a - b) / b).abs() < 1e-8;
        for (i, row) in rows.iter().enumerate() {
            let fields: Vec<f64> = row.split(',').map(|f| f.parse().unwrap()).collect();
            assert!(close(fields[0], data.energy_ev[i]), "energy {} vs {}", fields[0], data.energy_ev[i]);
            assert!(close(fields[1], data.wavelength_angstrom[i]));
            assert!(close(fields[2], data.tof[i]), "tof {} vs {}", fields[2], data.tof[i]);
        }
    }
}
