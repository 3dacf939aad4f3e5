//! # 会话文件
//!
//! 从 JSON 读取会话设置，并转换为一串事件在会话上重放。
//!
//! ## 格式
//! ```json
//! {
//!   "range": { "energy": { "min": 1, "max": 100 }, "distance_m": 16.45, "delay_us": 0, "step_ev": 0.01 },
//!   "layers": [ { "formula": "Ag", "thickness": 0.5, "density": "" } ],
//!   "isotopes": { "manual": true, "ratios": [ { "layer": 1, "isotope": "107-Ag", "ratio": 0.9 } ] },
//!   "plot": { "x_axis": "energy", "y_axis": "attenuation", "scale": "linear", "show": ["total"] }
//! }
//! ```
//! 所有部分都是可选的；未知键被拒绝。层号从 1 开始。
//!
//! ## 依赖关系
//! - 被 `commands/compute.rs`, `commands/beam.rs`, `commands/stack.rs` 使用
//! - 使用 `serde_json` 解析
//! - 使用 `session/graph.rs`

use crate::error::{ResoError, Result};
use crate::models::{Cell, Endpoint, IsotopeKey, LayerField, PlotRequest, RangeField, SampleRow};
use crate::session::graph::{Event, EventReport, Session};
use crate::session::sync::RangeEdit;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 上下限
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    pub min: Option<Cell>,
    pub max: Option<Cell>,
}

/// 范围设置
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeConfig {
    pub energy: Option<Bounds>,
    pub wavelength: Option<Bounds>,
    pub tof: Option<Bounds>,
    pub distance_m: Option<f64>,
    pub delay_us: Option<f64>,
    pub step_ev: Option<Cell>,
}

/// 单个同位素比例
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatioConfig {
    /// 层号（从 1 开始）
    pub layer: usize,
    /// 同位素符号，如 `107-Ag`
    pub isotope: String,
    pub ratio: Cell,
}

/// 同位素设置
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsotopeConfig {
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub ratios: Vec<RatioConfig>,
}

/// 会话文件
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub range: Option<RangeConfig>,
    pub layers: Option<Vec<SampleRow>>,
    pub isotopes: Option<IsotopeConfig>,
    pub plot: Option<PlotRequest>,
}

/// 由同位素符号得到元素符号：`107-Ag` → `Ag`
fn element_of(isotope: &str) -> Option<&str> {
    let (mass, element) = isotope.split_once('-')?;
    (mass.parse::<u32>().is_ok() && !element.is_empty()).then_some(element)
}

impl SessionConfig {
    /// 读取会话文件
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ResoError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content).map_err(|e| ResoError::ParseError {
            format: "session".to_string(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 转换为事件序列
    ///
    /// `current_layers` 是会话当前的层数，用于增删层使层数一致。
    pub fn events(&self, current_layers: usize) -> Result<Vec<Event>> {
        let mut events = Vec::new();

        if let Some(range) = &self.range {
            if let Some(d) = range.distance_m {
                events.push(Event::SetDistance(d));
            }
            if let Some(d) = range.delay_us {
                events.push(Event::SetDelay(d));
            }

            let mut edits = Vec::new();
            for (field, bounds) in [
                (RangeField::Energy, &range.energy),
                (RangeField::Wavelength, &range.wavelength),
                (RangeField::Tof, &range.tof),
            ] {
                let Some(bounds) = bounds else { continue };
                if let Some(v) = &bounds.min {
                    edits.push(RangeEdit::new(Endpoint::Min, field, v.clone()));
                }
                if let Some(v) = &bounds.max {
                    edits.push(RangeEdit::new(Endpoint::Max, field, v.clone()));
                }
            }
            if !edits.is_empty() {
                events.push(Event::EditRange(edits));
            }

            if let Some(step) = &range.step_ev {
                events.push(Event::SetStep(step.clone()));
            }
        }

        if let Some(layers) = &self.layers {
            for _ in layers.len()..current_layers {
                events.push(Event::RemoveLayer);
            }
            for _ in current_layers..layers.len() {
                events.push(Event::AddLayer);
            }
            for (index, row) in layers.iter().enumerate() {
                events.push(Event::EditLayer {
                    index,
                    field: LayerField::Formula,
                    value: Cell::Text(row.formula.clone()),
                });
                events.push(Event::EditLayer {
                    index,
                    field: LayerField::Thickness,
                    value: row.thickness.clone(),
                });
                events.push(Event::EditLayer {
                    index,
                    field: LayerField::Density,
                    value: row.density.clone(),
                });
            }
        }

        if let Some(isotopes) = &self.isotopes {
            events.push(Event::SetIsotopeManual(isotopes.manual));
            for r in &isotopes.ratios {
                if r.layer == 0 {
                    return Err(ResoError::InvalidArgument(format!(
                        "isotope '{}': layer numbers start at 1",
                        r.isotope
                    )));
                }
                let element = element_of(&r.isotope).ok_or_else(|| {
                    ResoError::InvalidArgument(format!(
                        "invalid isotope symbol '{}', expected e.g. 107-Ag",
                        r.isotope
                    ))
                })?;
                events.push(Event::EditIsotope {
                    key: IsotopeKey::new(r.layer - 1, element, r.isotope.clone()),
                    value: r.ratio.clone(),
                });
            }
        }

        if let Some(plot) = &self.plot {
            events.push(Event::SetPlotRequest(plot.clone()));
        }

        Ok(events)
    }

    /// 在会话上重放
    pub fn apply(&self, session: &mut Session) -> Result<Vec<EventReport>> {
        let events = self.events(session.table().len())?;
        session.apply_all(events)
    }
}
