//! # 绘图数据组装
//!
//! 由校验后的输入与绘图请求生成绘图数据：
//! 1. 由 (能量下限, 能量上限, 步长) 生成升序能量网格
//! 2. 对每个物理量（透射率、截面、原始截面）各调用一次引擎
//! 3. 衰减 = 1 - 透射率（逐点）
//! 4. 由同一网格推导能量/波长/TOF 三列 x 值
//! 5. 按显示粒度筛选曲线；缺失的可选曲线被忽略
//!
//! 坐标尺度只是渲染提示，数据从不变换。
//!
//! ## 依赖关系
//! - 被 `session/graph.rs`, `plot/render.rs`, `plot/export.rs` 使用
//! - 使用 `physics/engine.rs`, `physics/units.rs`

use crate::error::Result;
use crate::models::{PlotRequest, TimeUnit, XAxis, YAxis};
use crate::physics::engine::{PhysicsEngine, Quantity, Series};
use crate::physics::units::{energies_to_wavelength, energy_grid};
use crate::session::validator::ValidatedInput;

/// 组装好的绘图数据
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    /// 规范化后的请求
    pub request: PlotRequest,
    pub energy_ev: Vec<f64>,
    pub wavelength_angstrom: Vec<f64>,
    /// TOF，单位为 `request.time_unit`
    pub tof: Vec<f64>,
    pub transmission: Vec<Series>,
    pub attenuation: Vec<Series>,
    pub cross_section: Vec<Series>,
    pub cross_section_raw: Vec<Series>,
    /// 默认标题：各层化学式
    pub title: String,
}

/// 组装绘图数据
pub fn assemble(engine: &dyn PhysicsEngine, input: &ValidatedInput, request: &PlotRequest) -> Result<PlotData> {
    let request = request.clone().normalized();
    let (e_min, e_max) = input.range.energy_bounds();
    let grid = energy_grid(e_min, e_max, input.step_ev);

    let transmission = engine.compute(&grid, &input.stack, Quantity::Transmission)?;
    let cross_section = engine.compute(&grid, &input.stack, Quantity::CrossSection)?;
    let cross_section_raw = engine.compute(&grid, &input.stack, Quantity::CrossSectionRaw)?;

    let attenuation = transmission
        .iter()
        .map(|s| Series {
            entity: s.entity.clone(),
            label: s.label.clone(),
            values: s.values.iter().map(|t| 1.0 - t).collect(),
        })
        .collect();

    let converter = input.range.converter()?;
    let factor = request.time_unit.from_us_factor();
    let tof = converter
        .energies_to_tof_us(&grid)
        .into_iter()
        .map(|t| t * factor)
        .collect();

    let title = input
        .stack
        .iter()
        .map(|l| l.formula.text.as_str())
        .collect::<Vec<_>>()
        .join(" + ");

    Ok(PlotData {
        wavelength_angstrom: energies_to_wavelength(&grid),
        energy_ev: grid,
        tof,
        transmission,
        attenuation,
        cross_section,
        cross_section_raw,
        title,
        request,
    })
}

impl PlotData {
    /// 当前 y 量的全部曲线
    pub fn series_for(&self, y_axis: YAxis) -> &[Series] {
        match y_axis {
            YAxis::Transmission => &self.transmission,
            YAxis::Attenuation => &self.attenuation,
            YAxis::CrossSection => &self.cross_section,
            YAxis::CrossSectionRaw => &self.cross_section_raw,
        }
    }

    /// 按请求的 y 量与粒度筛选出的曲线
    pub fn displayed(&self) -> Vec<&Series> {
        self.series_for(self.request.y_axis)
            .iter()
            .filter(|s| self.request.shows(s.entity.granularity()))
            .collect()
    }

    pub fn x_values(&self) -> &[f64] {
        match self.request.x_axis {
            XAxis::Energy => &self.energy_ev,
            XAxis::Wavelength => &self.wavelength_angstrom,
            XAxis::Time => &self.tof,
        }
    }

    pub fn x_label(&self) -> String {
        match self.request.x_axis {
            XAxis::Energy => "Energy (eV)".to_string(),
            XAxis::Wavelength => "Wavelength (Å)".to_string(),
            XAxis::Time => tof_label(self.request.time_unit),
        }
    }

    pub fn y_label(&self) -> &'static str {
        self.request.y_axis.label()
    }

    pub fn len(&self) -> usize {
        self.energy_ev.len()
    }
}

/// TOF 列标题
pub fn tof_label(unit: TimeUnit) -> String {
    format!("Time-of-flight ({})", unit.symbol())
}
