//! # 样品层
//!
//! 原始表格行 (`SampleRow`) 与校验后的样品层 (`SampleLayer`)。
//! 行的顺序即物理堆叠顺序，也定义层索引。
//!
//! ## 依赖关系
//! - 被 `session/table.rs`, `session/validator.rs` 使用
//! - 使用 `models/cell.rs`, `physics/formula.rs`

use crate::models::cell::Cell;
use crate::physics::elements::standard_density;
use crate::physics::formula::Formula;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 默认样品：0.5 mm 银，密度留空
pub const DEFAULT_FORMULA: &str = "Ag";
pub const DEFAULT_THICKNESS_MM: f64 = 0.5;

/// 样品表中的一行（未校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleRow {
    #[serde(default)]
    pub formula: String,
    /// 厚度 (mm)
    #[serde(default)]
    pub thickness: Cell,
    /// 密度 (g/cm³)，留空表示使用标准密度
    #[serde(default)]
    pub density: Cell,
}

impl SampleRow {
    pub fn new(formula: impl Into<String>, thickness: impl Into<Cell>, density: impl Into<Cell>) -> Self {
        SampleRow {
            formula: formula.into(),
            thickness: thickness.into(),
            density: density.into(),
        }
    }

    /// 新增层时的空行
    pub fn blank() -> Self {
        SampleRow {
            formula: String::new(),
            thickness: Cell::blank(),
            density: Cell::blank(),
        }
    }

    pub fn set(&mut self, field: LayerField, cell: Cell) {
        match field {
            LayerField::Formula => self.formula = cell.to_string(),
            LayerField::Thickness => self.thickness = cell,
            LayerField::Density => self.density = cell,
        }
    }
}

impl Default for SampleRow {
    fn default() -> Self {
        SampleRow::new(DEFAULT_FORMULA, DEFAULT_THICKNESS_MM, Cell::blank())
    }
}

/// 样品表的列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerField {
    Formula,
    Thickness,
    Density,
}

impl fmt::Display for LayerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerField::Formula => write!(f, "formula"),
            LayerField::Thickness => write!(f, "thickness"),
            LayerField::Density => write!(f, "density"),
        }
    }
}

/// 校验后的样品层
#[derive(Debug, Clone, PartialEq)]
pub struct SampleLayer {
    pub formula: Formula,
    pub thickness_mm: f64,
    /// 用户给定的密度 (g/cm³)
    pub density_g_cm3: Option<f64>,
}

impl SampleLayer {
    /// 实际使用的密度：用户值优先，否则单元素标准密度
    pub fn effective_density(&self) -> Option<f64> {
        self.density_g_cm3.or_else(|| self.standard_density())
    }

    /// 单元素层的标准密度
    pub fn standard_density(&self) -> Option<f64> {
        if self.formula.is_single_element() {
            self.formula.symbols().next().and_then(standard_density)
        } else {
            None
        }
    }

    pub fn uses_standard_density(&self) -> bool {
        self.density_g_cm3.is_none() && self.standard_density().is_some()
    }
}
