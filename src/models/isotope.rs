//! # 同位素比例表
//!
//! 每个 (层, 元素, 同位素) 一行，并记录每层的行是由哪个化学式生成的，
//! 以便判断样品表变化时哪些层需要重新生成。
//!
//! ## 依赖关系
//! - 被 `session/table.rs`, `session/validator.rs` 使用
//! - 使用 `models/cell.rs`

use crate::models::cell::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 同位素行的身份键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsotopeKey {
    pub layer_index: usize,
    pub element: String,
    /// 同位素符号，如 `107-Ag`
    pub isotope: String,
}

impl IsotopeKey {
    pub fn new(layer_index: usize, element: impl Into<String>, isotope: impl Into<String>) -> Self {
        IsotopeKey {
            layer_index,
            element: element.into(),
            isotope: isotope.into(),
        }
    }
}

impl fmt::Display for IsotopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer[{}].{}.{}", self.layer_index + 1, self.element, self.isotope)
    }
}

/// 同位素比例行
#[derive(Debug, Clone, PartialEq)]
pub struct IsotopeOverride {
    pub key: IsotopeKey,
    pub ratio: Cell,
}

/// 同位素比例表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsotopeTable {
    pub rows: Vec<IsotopeOverride>,
    /// 每层行所基于的化学式（已去除首尾空白）
    pub generated_from: Vec<String>,
}

impl IsotopeTable {
    pub fn get(&self, key: &IsotopeKey) -> Option<&IsotopeOverride> {
        self.rows.iter().find(|r| &r.key == key)
    }

    pub fn get_mut(&mut self, key: &IsotopeKey) -> Option<&mut IsotopeOverride> {
        self.rows.iter_mut().find(|r| &r.key == key)
    }

    /// 某层的所有行
    pub fn layer_rows(&self, layer_index: usize) -> impl Iterator<Item = &IsotopeOverride> {
        self.rows.iter().filter(move |r| r.key.layer_index == layer_index)
    }

    /// 某层某元素的所有行
    pub fn group(&self, layer_index: usize, element: &str) -> Vec<&IsotopeOverride> {
        self.rows
            .iter()
            .filter(|r| r.key.layer_index == layer_index && r.key.element == element)
            .collect()
    }
}
