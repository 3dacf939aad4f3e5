//! # 样品表管理
//!
//! 维护有序的样品层列表及其派生的同位素比例表。
//!
//! ## 合并规则
//! 样品表变化后重新派生同位素表：
//! - 化学式改变（或新增）的层：按天然丰度重新生成
//! - 未受影响的层：按 (层索引, 元素, 同位素) 身份键沿用旧比例，不按位置
//! - 被删除的层：丢弃
//!
//! ## 依赖关系
//! - 被 `session/graph.rs`, `session/validator.rs` 使用
//! - 使用 `models/`, `physics/formula.rs`, `physics/elements.rs`

use crate::error::FieldError;
use crate::models::{Cell, IsotopeKey, IsotopeOverride, IsotopeTable, LayerField, SampleRow};
use crate::physics::elements::get_element;
use crate::physics::formula::parse_formula;

/// 样品表
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    rows: Vec<SampleRow>,
    isotopes: IsotopeTable,
}

impl Default for SampleTable {
    fn default() -> Self {
        SampleTable::new(vec![SampleRow::default()])
    }
}

impl SampleTable {
    pub fn new(rows: Vec<SampleRow>) -> Self {
        let isotopes = merge_isotope_table(&rows, &IsotopeTable::default());
        SampleTable { rows, isotopes }
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn isotopes(&self) -> &IsotopeTable {
        &self.isotopes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 末尾追加空层
    pub fn add_layer(&mut self) {
        self.rows.push(SampleRow::blank());
    }

    /// 删除最后一层；没有层时不做任何事，返回是否删除
    pub fn remove_layer(&mut self) -> bool {
        self.rows.pop().is_some()
    }

    /// 编辑一个单元格，返回值是否改变
    pub fn edit_layer(&mut self, index: usize, field: LayerField, cell: Cell) -> Result<bool, FieldError> {
        let len = self.rows.len();
        let row = self.rows.get_mut(index).ok_or_else(|| {
            FieldError::input_format(
                format!("layer[{}].{}", index + 1, field),
                format!("Layer {} does not exist ({} layers)", index + 1, len),
            )
        })?;
        let before = row.clone();
        row.set(field, cell);
        Ok(*row != before)
    }

    /// 编辑一个同位素比例，返回值是否改变
    pub fn edit_isotope(&mut self, key: &IsotopeKey, cell: Cell) -> Result<bool, FieldError> {
        let row = self.isotopes.get_mut(key).ok_or_else(|| {
            FieldError::input_format(key.to_string(), "No such isotope row in the current sample")
        })?;
        if row.ratio == cell {
            return Ok(false);
        }
        row.ratio = cell;
        Ok(true)
    }

    /// 按当前样品表重新派生同位素表，返回是否改变
    pub fn merge_isotopes(&mut self) -> bool {
        let merged = merge_isotope_table(&self.rows, &self.isotopes);
        if merged == self.isotopes {
            return false;
        }
        self.isotopes = merged;
        true
    }
}

/// 某层化学式对应的天然丰度行；化学式无法解析时为空
fn natural_rows(layer_index: usize, formula: &str) -> Vec<IsotopeOverride> {
    let Ok(parsed) = parse_formula(formula) else {
        return Vec::new();
    };
    let mut rows = Vec::new();
    for symbol in parsed.symbols() {
        let Some(element) = get_element(symbol) else {
            continue;
        };
        for isotope in &element.isotopes {
            rows.push(IsotopeOverride {
                key: IsotopeKey::new(layer_index, symbol, element.isotope_symbol(isotope)),
                ratio: Cell::Number(isotope.abundance),
            });
        }
    }
    rows
}

/// 同位素表合并
pub fn merge_isotope_table(rows: &[SampleRow], previous: &IsotopeTable) -> IsotopeTable {
    let mut merged = IsotopeTable::default();

    for (index, row) in rows.iter().enumerate() {
        let formula = row.formula.trim().to_string();
        let unaffected = previous.generated_from.get(index) == Some(&formula);

        for mut fresh in natural_rows(index, &formula) {
            if unaffected {
                if let Some(old) = previous.get(&fresh.key) {
                    fresh.ratio = old.ratio.clone();
                }
            }
            merged.rows.push(fresh);
        }
        merged.generated_from.push(formula);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layers() -> SampleTable {
        SampleTable::new(vec![
            SampleRow::new("Ag", 0.5, Cell::blank()),
            SampleRow::new("AgCl", 1.0, 5.56),
        ])
    }

    #[test]
    fn test_default_table() {
        let table = SampleTable::default();
        assert_eq!(table.len(), 1);
        assert_eq!(table.isotopes().rows.len(), 2);
        assert_eq!(table.isotopes().generated_from, vec!["Ag".to_string()]);
    }

    #[test]
    fn test_add_then_remove_restores_table() {
        let mut table = two_layers();
        let key = IsotopeKey::new(0, "Ag", "107-Ag");
        table.edit_isotope(&key, Cell::from(0.9)).unwrap();
        let before = table.clone();

        table.add_layer();
        table.merge_isotopes();
        table.edit_layer(2, LayerField::Formula, Cell::from("Au")).unwrap();
        table.merge_isotopes();
        table
            .edit_isotope(&IsotopeKey::new(2, "Au", "197-Au"), Cell::from(1.0))
            .unwrap();
        assert_eq!(table.len(), 3);

        assert!(table.remove_layer());
        table.merge_isotopes();
        assert_eq!(table, before);
        assert!(table.isotopes().layer_rows(2).next().is_none());
    }

    #[test]
    fn test_editing_layer_two_keeps_layer_one_overrides() {
        let mut table = two_layers();
        let key = IsotopeKey::new(0, "Ag", "109-Ag");
        table.edit_isotope(&key, Cell::from(0.25)).unwrap();

        table.edit_layer(1, LayerField::Thickness, Cell::from(2.0)).unwrap();
        table.merge_isotopes();
        assert_eq!(table.isotopes().get(&key).unwrap().ratio, Cell::from(0.25));

        table.edit_layer(1, LayerField::Formula, Cell::from("Cd")).unwrap();
        assert!(table.merge_isotopes());
        assert_eq!(table.isotopes().get(&key).unwrap().ratio, Cell::from(0.25));
        assert_eq!(table.isotopes().group(1, "Cd").len(), 8);
    }

    #[test]
    fn test_formula_change_regenerates_natural() {
        let mut table = two_layers();
        let key = IsotopeKey::new(1, "Ag", "107-Ag");
        table.edit_isotope(&key, Cell::from(1.0)).unwrap();

        table.edit_layer(1, LayerField::Formula, Cell::from("AgBr")).unwrap();
        assert!(table.merge_isotopes());
        let ratio = table.isotopes().get(&key).unwrap().ratio.as_f64().unwrap();
        assert!((ratio - 0.51839).abs() < 1e-12, "override must be reset to natural");
        assert_eq!(table.isotopes().group(1, "Br").len(), 2);
        let br79 = table.isotopes().get(&IsotopeKey::new(1, "Br", "79-Br")).unwrap();
        assert_eq!(br79.ratio, Cell::from(0.5069));
        table.edit_isotope(&key, Cell::from(1.0)).unwrap();

        table.edit_layer(1, LayerField::Formula, Cell::from(" AgCl ")).unwrap();
        table.merge_isotopes();
        let ratio = table.isotopes().get(&key).unwrap().ratio.as_f64().unwrap();
        assert!((ratio - 0.51839).abs() < 1e-12, "override must be reset to natural");
    }

    #[test]
    fn test_whitespace_only_formula_change_keeps_overrides() {
        let mut table = two_layers();
        let key = IsotopeKey::new(0, "Ag", "107-Ag");
        table.edit_isotope(&key, Cell::from(0.6)).unwrap();
        table.edit_layer(0, LayerField::Formula, Cell::from("Ag ")).unwrap();
        assert!(!table.merge_isotopes());
        assert_eq!(table.isotopes().get(&key).unwrap().ratio, Cell::from(0.6));
    }

    #[test]
    fn test_out_of_range_edits() {
        let mut table = two_layers();
        let err = table
            .edit_layer(5, LayerField::Thickness, Cell::from(1.0))
            .unwrap_err();
        assert_eq!(err.field, "layer[6].thickness");
        assert!(table
            .edit_isotope(&IsotopeKey::new(0, "Ag", "108-Ag"), Cell::from(0.1))
            .is_err());
    }

    #[test]
    fn test_remove_on_empty_is_noop() {
        let mut table = SampleTable::new(Vec::new());
        assert!(!table.remove_layer());
        assert!(table.is_empty());
    }
}
