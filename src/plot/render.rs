//! # 曲线图渲染
//!
//! 使用 `plotters` 将绘图数据渲染为 PNG 或 SVG 折线图。
//!
//! ## 功能
//! - x/y 轴标签按物理量和单位给出
//! - 按尺度提示使用线性或对数坐标；对数轴只绘制正值点
//! - 每条曲线一个图例项
//!
//! ## 依赖关系
//! - 被 `commands/compute.rs` 调用
//! - 使用 `plot/assembler.rs` 的 PlotData
//! - 使用 `plotters` 渲染图表

use crate::error::{ResoError, Result};
use crate::plot::assembler::PlotData;

use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::prelude::*;
use std::path::Path;

/// 曲线配色
const PALETTE: [RGBColor; 8] = [
    RGBColor(0, 102, 204),
    RGBColor(220, 50, 47),
    RGBColor(38, 139, 34),
    RGBColor(255, 140, 0),
    RGBColor(108, 52, 131),
    RGBColor(0, 150, 150),
    RGBColor(181, 137, 0),
    RGBColor(90, 90, 90),
];

/// 生成曲线图
pub fn generate_plot(
    data: &PlotData,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_with_scale(&root, data, title)?;
        root.present()
            .map_err(|e| ResoError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_with_scale(&root, data, title)?;
        root.present()
            .map_err(|e| ResoError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 按尺度选择坐标类型
fn draw_with_scale<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &PlotData,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let scale = data.request.scale;
    let curves = collect_curves(data, scale.log_x(), scale.log_y());
    let (x_min, x_max) = padded_range(curves.iter().flat_map(|c| c.1.iter().map(|p| p.0)), scale.log_x());
    let (y_min, y_max) = padded_range(curves.iter().flat_map(|c| c.1.iter().map(|p| p.1)), scale.log_y());

    match (scale.log_x(), scale.log_y()) {
        (false, false) => draw_chart(root, data, title, &curves, x_min..x_max, y_min..y_max),
        (true, false) => draw_chart(root, data, title, &curves, (x_min..x_max).log_scale(), y_min..y_max),
        (false, true) => draw_chart(root, data, title, &curves, x_min..x_max, (y_min..y_max).log_scale()),
        (true, true) => draw_chart(
            root,
            data,
            title,
            &curves,
            (x_min..x_max).log_scale(),
            (y_min..y_max).log_scale(),
        ),
    }
}

/// (标签, 点列)；对数轴上非正值点被丢弃
fn collect_curves(data: &PlotData, log_x: bool, log_y: bool) -> Vec<(String, Vec<(f64, f64)>)> {
    let xs = data.x_values();
    data.displayed()
        .into_iter()
        .map(|s| {
            let points = xs
                .iter()
                .zip(&s.values)
                .map(|(x, y)| (*x, *y))
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .filter(|(x, y)| (!log_x || *x > 0.0) && (!log_y || *y > 0.0))
                .collect();
            (s.label.clone(), points)
        })
        .collect()
}

/// 数据范围加边距；空数据或单值时给出合理默认
fn padded_range(values: impl Iterator<Item = f64>, log: bool) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return if log { (0.1, 10.0) } else { (0.0, 1.0) };
    }
    if log {
        if lo == hi {
            return (lo / 2.0, hi * 2.0);
        }
        (lo / 1.2, hi * 1.2)
    } else {
        if lo == hi {
            let pad = if lo == 0.0 { 0.5 } else { lo.abs() * 0.1 };
            return (lo - pad, hi + pad);
        }
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }
}

/// 绘制图表的核心逻辑
fn draw_chart<DB, XR, YR>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &PlotData,
    title: &str,
    curves: &[(String, Vec<(f64, f64)>)],
    x_spec: XR,
    y_spec: YR,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    XR: AsRangedCoord<Value = f64>,
    YR: AsRangedCoord<Value = f64>,
    XR::CoordDescType: ValueFormatter<f64>,
    YR::CoordDescType: ValueFormatter<f64>,
{
    root.fill(&WHITE)
        .map_err(|e| ResoError::PlotError(format!("{:?}", e)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_spec, y_spec)
        .map_err(|e| ResoError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(data.x_label())
        .y_desc(data.y_label())
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| ResoError::PlotError(format!("{:?}", e)))?;

    for (i, (label, points)) in curves.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(|e| ResoError::PlotError(format!("{:?}", e)))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(|e| ResoError::PlotError(format!("{:?}", e)))?;

    Ok(())
}
