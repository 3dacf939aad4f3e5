//! # 输入校验
//!
//! 对范围表、样品表与同位素表做累积式校验：收集所有失败项，而不是遇到第一个就返回。
//!
//! ## 规则
//! - 数值字段必须可转换为数值（厚度、密度、步长、手动模式下的同位素比例）
//! - 化学式非空、可解析、元素已知
//! - 厚度、密度为正
//! - 非单一已知元素的层必须给出密度
//! - 手动模式下每组同位素比例之和为 1（容差 1e-6），单个比例在 [0, 1]
//! - 能量上下限不相等；至少一层；步长为正；网格不超过 1,000,000 点
//!
//! ## 依赖关系
//! - 被 `session/graph.rs` 使用
//! - 使用 `models/`, `physics/`

use crate::error::FieldError;
use crate::models::{Cell, Coerced, RangeEntry, SampleLayer};
use crate::physics::elements::get_element;
use crate::physics::engine::{ElementRatios, StackLayer};
use crate::physics::formula::parse_formula;
use crate::physics::units::{energy_grid_len_bound, MAX_GRID_POINTS};
use crate::session::table::SampleTable;

/// 同位素比例和的容差
pub const RATIO_SUM_TOLERANCE: f64 = 1e-6;

/// 通过校验的输入
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub range: RangeEntry,
    pub step_ev: f64,
    pub layers: Vec<SampleLayer>,
    /// 交给物理引擎的样品堆叠
    pub stack: Vec<StackLayer>,
}

/// 累积错误收集器
#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// 必填数值字段
    fn required(&mut self, field: &str, cell: &Cell) -> Option<f64> {
        match cell.coerce() {
            Coerced::Value(v) => Some(v),
            Coerced::Missing => {
                self.push(FieldError::input_format(field, "Value is required"));
                None
            }
            Coerced::NotNumeric => {
                self.push(FieldError::input_format(
                    field,
                    format!("'{}' is not a number", cell),
                ));
                None
            }
        }
    }

    /// 可选数值字段
    fn optional(&mut self, field: &str, cell: &Cell) -> Option<Option<f64>> {
        match cell.coerce() {
            Coerced::Missing => Some(None),
            _ => self.required(field, cell).map(Some),
        }
    }

    fn positive(&mut self, field: &str, value: f64, what: &str) -> bool {
        if value <= 0.0 {
            self.push(FieldError::domain(
                field,
                format!("{} must be positive, got {}", what, value),
            ));
            return false;
        }
        true
    }
}

/// 校验全部输入
///
/// `manual_isotopes` 为 false 时同位素表被忽略，所有元素使用天然丰度。
pub fn validate(
    range: &RangeEntry,
    step: &Cell,
    table: &SampleTable,
    manual_isotopes: bool,
) -> Result<ValidatedInput, Vec<FieldError>> {
    let mut c = Collector::default();

    // ── 范围 ──
    let (e_lo, e_hi) = range.energy_bounds();
    if e_lo <= 0.0 {
        c.push(FieldError::conversion("range.energy", "Energy must be positive"));
    }
    if range.min.energy_ev == range.max.energy_ev {
        c.push(FieldError::domain(
            "range.energy",
            "Energy min. can not equal energy max.",
        ));
    }

    let step_ev = c.required("range.step", step);
    if let Some(s) = step_ev {
        if c.positive("range.step", s, "Energy step") && e_hi > e_lo {
            let points = energy_grid_len_bound(e_lo, e_hi, s);
            if points > MAX_GRID_POINTS {
                c.push(FieldError::domain(
                    "range.step",
                    format!(
                        "Energy grid would have {:.0} points (limit {:.0}); increase the step",
                        points, MAX_GRID_POINTS
                    ),
                ));
            }
        }
    }

    // ── 样品层 ──
    if table.is_empty() {
        c.push(FieldError::domain("layers", "At least one layer is required"));
    }

    let mut layers = Vec::new();
    for (index, row) in table.rows().iter().enumerate() {
        let label = |f: &str| format!("layer[{}].{}", index + 1, f);

        let formula = if row.formula.trim().is_empty() {
            c.push(FieldError::input_format(label("formula"), "Formula is required"));
            None
        } else {
            match parse_formula(&row.formula) {
                Ok(f) => Some(f),
                Err(e) => {
                    c.push(FieldError::input_format(label("formula"), e.to_string()));
                    None
                }
            }
        };

        let thickness = c
            .required(&label("thickness"), &row.thickness)
            .filter(|&t| c.positive(&label("thickness"), t, "Thickness"));

        let density = match c.optional(&label("density"), &row.density) {
            Some(Some(d)) => c.positive(&label("density"), d, "Density").then_some(Some(d)),
            other => other,
        };

        let (Some(formula), Some(thickness_mm), Some(density_g_cm3)) = (formula, thickness, density) else {
            continue;
        };

        let layer = SampleLayer {
            formula,
            thickness_mm,
            density_g_cm3,
        };
        if layer.effective_density().is_none() {
            c.push(FieldError::domain(
                label("density"),
                format!(
                    "Density required: '{}' is not a single element with a standard density",
                    layer.formula.text
                ),
            ));
            continue;
        }
        layers.push((index, layer));
    }

    // ── 同位素比例 ──
    let mut stack = Vec::new();
    for (index, layer) in &layers {
        let mut ratios = Vec::new();
        for symbol in layer.formula.symbols() {
            let Some(data) = get_element(symbol) else {
                continue;
            };
            if !manual_isotopes {
                ratios.push(ElementRatios::natural(data));
                continue;
            }

            let group = table.isotopes().group(*index, symbol);
            let mut isotopes = Vec::new();
            let mut group_ok = true;
            for row in &group {
                let field = row.key.to_string();
                match c.required(&field, &row.ratio) {
                    Some(r) if (0.0..=1.0).contains(&r) => isotopes.push((row.key.isotope.clone(), r)),
                    Some(r) => {
                        c.push(FieldError::domain(
                            field,
                            format!("Isotope ratio must be within [0, 1], got {}", r),
                        ));
                        group_ok = false;
                    }
                    None => group_ok = false,
                }
            }
            if !group_ok {
                continue;
            }

            let sum: f64 = isotopes.iter().map(|(_, r)| r).sum();
            if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
                c.push(FieldError::domain(
                    format!("layer[{}].{}", index + 1, symbol),
                    format!("Isotope ratios must sum to 1, got {:.6}", sum),
                ));
                continue;
            }
            ratios.push(ElementRatios {
                element: symbol.to_string(),
                isotopes,
            });
        }

        if let Some(density) = layer.effective_density() {
            stack.push(StackLayer {
                formula: layer.formula.clone(),
                thickness_mm: layer.thickness_mm,
                density_g_cm3: density,
                ratios,
            });
        }
    }

    if !c.errors.is_empty() {
        return Err(c.errors);
    }

    Ok(ValidatedInput {
        range: range.clone(),
        // 无错误时步长必然存在
        step_ev: step_ev.unwrap_or_default(),
        layers: layers.into_iter().map(|(_, l)| l).collect(),
        stack,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{IsotopeKey, SampleRow};

    fn table(rows: Vec<SampleRow>) -> SampleTable {
        SampleTable::new(rows)
    }

    fn step() -> Cell {
        Cell::from(0.01)
    }

    #[test]
    fn test_silver_passes() {
        let t = table(vec![SampleRow::new("Ag", 0.5, Cell::blank())]);
        let input = validate(&RangeEntry::default(), &step(), &t, false).unwrap();
        assert_eq!(input.stack.len(), 1);
        assert_eq!(input.stack[0].density_g_cm3, 10.49);
        assert_eq!(input.step_ev, 0.01);
    }

    #[test]
    fn test_silver_chloride_requires_density() {
        let t = table(vec![SampleRow::new("AgCl", 0.5, Cell::blank())]);
        let errors = validate(&RangeEntry::default(), &step(), &t, false).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "layer[1].density");
        assert_eq!(errors[0].kind, ErrorKind::DomainConstraint);
        assert!(errors[0].message.contains("Density required"));
    }

    #[test]
    fn test_errors_accumulate() {
        let t = table(vec![
            SampleRow::new("", "abc", Cell::blank()),
            SampleRow::new("Ag", -1.0, 0.0),
        ]);
        let errors = validate(&RangeEntry::default(), &Cell::from(0.0), &t, false).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"range.step"));
        assert!(fields.contains(&"layer[1].formula"));
        assert!(fields.contains(&"layer[1].thickness"));
        assert!(fields.contains(&"layer[2].thickness"));
        assert!(fields.contains(&"layer[2].density"));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_manual_ratios_must_sum_to_one() {
        let mut t = table(vec![SampleRow::new("Ag", 0.5, Cell::blank())]);
        t.edit_isotope(&IsotopeKey::new(0, "Ag", "107-Ag"), Cell::from(0.7))
            .unwrap();

        // 非手动模式忽略编辑
        assert!(validate(&RangeEntry::default(), &step(), &t, false).is_ok());

        let errors = validate(&RangeEntry::default(), &step(), &t, true).unwrap_err();
        assert_eq!(errors[0].field, "layer[1].Ag");

        t.edit_isotope(&IsotopeKey::new(0, "Ag", "109-Ag"), Cell::from("0.3"))
            .unwrap();
        let input = validate(&RangeEntry::default(), &step(), &t, true).unwrap();
        assert_eq!(input.stack[0].ratios[0].ratio_of("107-Ag"), 0.7);
    }

    #[test]
    fn test_ratio_out_of_bounds() {
        let mut t = table(vec![SampleRow::new("Ag", 0.5, Cell::blank())]);
        t.edit_isotope(&IsotopeKey::new(0, "Ag", "107-Ag"), Cell::from(1.5))
            .unwrap();
        t.edit_isotope(&IsotopeKey::new(0, "Ag", "109-Ag"), Cell::from(-0.5))
            .unwrap();
        let errors = validate(&RangeEntry::default(), &step(), &t, true).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::DomainConstraint));
    }

    #[test]
    fn test_empty_table_and_grid_limit() {
        let errors = validate(&RangeEntry::default(), &Cell::from(1e-5), &table(Vec::new()), false)
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.field == "layers"));
        assert!(errors.iter().any(|e| e.message.contains("limit")));
    }
}
