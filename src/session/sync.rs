//! # 能量范围同步
//!
//! 能量、波长、TOF 任一表示或飞行距离/延迟改变时，重新推导两端点的其余表示。
//!
//! ## 规则
//! - 同一批次编辑多个表示时，按 energy > wavelength > tof 选出驱动表示，其余编辑被丢弃并返回
//! - 只改距离/延迟时，从当前真值来源重新推导
//! - 所有驱动值与当前值的相对差 ≤ 1e-9 且距离/延迟不变时，返回 `SyncOutcome::Unchanged`
//! - 出错时当前表保持不变
//!
//! ## 依赖关系
//! - 被 `session/graph.rs` 使用
//! - 使用 `models/range.rs`, `physics/units.rs`

use crate::error::FieldError;
use crate::models::{Cell, Coerced, Endpoint, RangeEntry, RangeField, RangeRow};
use crate::physics::units::{wavelength_to_energy, UnitConverter};

/// 相对容差
const REL_TOLERANCE: f64 = 1e-9;

/// 单元格编辑
#[derive(Debug, Clone, PartialEq)]
pub struct RangeEdit {
    pub endpoint: Endpoint,
    pub field: RangeField,
    pub value: Cell,
}

impl RangeEdit {
    pub fn new(endpoint: Endpoint, field: RangeField, value: impl Into<Cell>) -> Self {
        RangeEdit {
            endpoint,
            field,
            value: value.into(),
        }
    }
}

/// 一次同步请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeChange {
    pub edits: Vec<RangeEdit>,
    pub distance_m: Option<f64>,
    pub delay_us: Option<f64>,
}

impl RangeChange {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.distance_m.is_none() && self.delay_us.is_none()
    }

    /// 合并后到的请求（同一事件内多次修改）
    pub fn merge(&mut self, other: RangeChange) {
        self.edits.extend(other.edits);
        if other.distance_m.is_some() {
            self.distance_m = other.distance_m;
        }
        if other.delay_us.is_some() {
            self.delay_us = other.delay_us;
        }
    }
}

/// 同步结果
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// 无实际变化
    Unchanged,
    Updated {
        range: RangeEntry,
        /// 因优先级被丢弃的编辑
        discarded: Vec<RangeEdit>,
    },
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= REL_TOLERANCE * a.abs().max(b.abs())
}

fn field_label(field: RangeField, endpoint: Endpoint) -> String {
    format!("range.{}.{}", field, endpoint)
}

fn coerce_edit(edit: &RangeEdit) -> Result<f64, FieldError> {
    match edit.value.coerce() {
        Coerced::Value(v) => Ok(v),
        Coerced::Missing => Err(FieldError::input_format(
            field_label(edit.field, edit.endpoint),
            "Value is required",
        )),
        Coerced::NotNumeric => Err(FieldError::input_format(
            field_label(edit.field, edit.endpoint),
            format!("'{}' is not a number", edit.value),
        )),
    }
}

/// 由驱动表示的值推导能量
fn to_energy(
    field: RangeField,
    endpoint: Endpoint,
    value: f64,
    converter: &UnitConverter,
) -> Result<f64, FieldError> {
    let label = field_label(field, endpoint);
    match field {
        RangeField::Energy => {
            if value <= 0.0 {
                return Err(FieldError::conversion(
                    label,
                    format!("Energy must be positive, got {}", value),
                ));
            }
            Ok(value)
        }
        RangeField::Wavelength => {
            if value <= 0.0 {
                return Err(FieldError::conversion(
                    label,
                    format!("Wavelength must be positive, got {}", value),
                ));
            }
            Ok(wavelength_to_energy(value))
        }
        RangeField::Tof => {
            if value <= converter.delay_us() {
                return Err(FieldError::conversion(
                    label,
                    format!(
                        "Time-of-flight must be larger than the delay ({} µs), got {}",
                        converter.delay_us(),
                        value
                    ),
                ));
            }
            Ok(converter.tof_us_to_energy(value))
        }
    }
}

/// 由能量推导整行，驱动表示保留用户输入的原值
fn derive_row(energy_ev: f64, field: RangeField, value: f64, converter: &UnitConverter) -> RangeRow {
    let mut row = RangeRow::from_energy(energy_ev, converter);
    match field {
        RangeField::Energy => row.energy_ev = value,
        RangeField::Wavelength => row.wavelength_angstrom = value,
        RangeField::Tof => row.tof_us = value,
    }
    row
}

/// 对当前范围表应用一次变更
pub fn sync_range(current: &RangeEntry, change: &RangeChange) -> Result<SyncOutcome, FieldError> {
    let distance_m = change.distance_m.unwrap_or(current.distance_m);
    let delay_us = change.delay_us.unwrap_or(current.delay_us);
    let converter = UnitConverter::new(distance_m, delay_us)?;
    let geometry_changed = !approx_eq(distance_m, current.distance_m)
        || !approx_eq(delay_us, current.delay_us);

    // 选出驱动表示
    let source = change
        .edits
        .iter()
        .map(|e| e.field)
        .min_by_key(|f| f.precedence())
        .unwrap_or(current.source);
    let (driving, discarded): (Vec<&RangeEdit>, Vec<&RangeEdit>) =
        change.edits.iter().partition(|e| e.field == source);

    // 两端点的驱动值：当前值，被编辑者覆盖（同一端点多次编辑取最后一次）
    let mut values = [current.min.value(source), current.max.value(source)];
    let mut edited = [false, false];
    for edit in &driving {
        let slot = match edit.endpoint {
            Endpoint::Min => 0,
            Endpoint::Max => 1,
        };
        values[slot] = coerce_edit(edit)?;
        edited[slot] = true;
    }

    let values_unchanged = approx_eq(values[0], current.min.value(source))
        && approx_eq(values[1], current.max.value(source));
    if values_unchanged && !geometry_changed {
        return Ok(SyncOutcome::Unchanged);
    }

    let endpoints = [Endpoint::Min, Endpoint::Max];
    let mut energies = [0.0; 2];
    for i in 0..2 {
        energies[i] = to_energy(source, endpoints[i], values[i], &converter)?;
    }
    if approx_eq(energies[0], energies[1]) {
        return Err(FieldError::domain(
            "range.energy",
            "Energy min. can not equal energy max.",
        ));
    }

    let current_rows = [current.min, current.max];
    let mut rows = [current.min, current.max];
    for i in 0..2 {
        // 未编辑且几何不变的端点原样保留
        if edited[i] || geometry_changed || source != current.source {
            rows[i] = derive_row(energies[i], source, values[i], &converter);
        } else {
            rows[i] = current_rows[i];
        }
    }

    Ok(SyncOutcome::Updated {
        range: RangeEntry {
            min: rows[0],
            max: rows[1],
            distance_m,
            delay_us,
            source,
        },
        discarded: discarded.into_iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::physics::units::energy_to_wavelength;

    fn updated(outcome: SyncOutcome) -> (RangeEntry, Vec<RangeEdit>) {
        match outcome {
            SyncOutcome::Updated { range, discarded } => (range, discarded),
            SyncOutcome::Unchanged => panic!("expected an update"),
        }
    }

    #[test]
    fn test_editing_energy_min_keeps_max() {
        let current = RangeEntry::default();
        let change = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Min, RangeField::Energy, 2.0)],
            ..Default::default()
        };
        let (range, discarded) = updated(sync_range(&current, &change).unwrap());
        assert!(discarded.is_empty());
        assert_eq!(range.min.energy_ev, 2.0);
        assert!((range.min.wavelength_angstrom - energy_to_wavelength(2.0)).abs() < 1e-12);
        assert_eq!(range.max, current.max, "max endpoint must be untouched");
    }

    #[test]
    fn test_wavelength_edit_drives_energy() {
        let current = RangeEntry::default();
        let change = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Max, RangeField::Wavelength, "0.1")],
            ..Default::default()
        };
        let (range, _) = updated(sync_range(&current, &change).unwrap());
        assert_eq!(range.source, RangeField::Wavelength);
        assert_eq!(range.max.wavelength_angstrom, 0.1);
        assert!((range.max.energy_ev - 8.1787).abs() < 1e-9);
        assert!((range.min.energy_ev - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_precedence_discards_lower_fields() {
        let current = RangeEntry::default();
        let change = RangeChange {
            edits: vec![
                RangeEdit::new(Endpoint::Min, RangeField::Tof, 500.0),
                RangeEdit::new(Endpoint::Max, RangeField::Energy, 50.0),
                RangeEdit::new(Endpoint::Min, RangeField::Wavelength, 0.2),
            ],
            ..Default::default()
        };
        let (range, discarded) = updated(sync_range(&current, &change).unwrap());
        assert_eq!(range.source, RangeField::Energy);
        assert_eq!(range.max.energy_ev, 50.0);
        assert_eq!(range.min.energy_ev, 1.0);
        assert_eq!(discarded.len(), 2);
    }

    #[test]
    fn test_distance_change_rederives_from_source() {
        let current = RangeEntry::default();
        let change = RangeChange {
            distance_m: Some(32.9),
            ..Default::default()
        };
        let (range, _) = updated(sync_range(&current, &change).unwrap());
        assert_eq!(range.min.energy_ev, 1.0);
        assert!((range.min.tof_us - 2.0 * current.min.tof_us).abs() < 1e-6);

        // TOF 为来源时，距离变化改变能量
        let tof_sourced = updated(
            sync_range(
                &current,
                &RangeChange {
                    edits: vec![RangeEdit::new(Endpoint::Min, RangeField::Tof, 1000.0)],
                    ..Default::default()
                },
            )
            .unwrap(),
        )
        .0;
        let (moved, _) = updated(sync_range(&tof_sourced, &change).unwrap());
        assert_eq!(moved.min.tof_us, 1000.0);
        assert!(moved.min.energy_ev > tof_sourced.min.energy_ev);
    }

    #[test]
    fn test_same_value_is_unchanged() {
        let current = RangeEntry::default();
        let change = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Min, RangeField::Energy, 1.0 + 1e-12)],
            distance_m: Some(16.45),
            ..Default::default()
        };
        assert_eq!(sync_range(&current, &change).unwrap(), SyncOutcome::Unchanged);
    }

    #[test]
    fn test_errors() {
        let current = RangeEntry::default();
        let bad_distance = RangeChange {
            distance_m: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            sync_range(&current, &bad_distance).unwrap_err().kind,
            ErrorKind::Conversion
        );

        let equal = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Min, RangeField::Energy, 100.0)],
            ..Default::default()
        };
        assert_eq!(
            sync_range(&current, &equal).unwrap_err().kind,
            ErrorKind::DomainConstraint
        );

        let negative = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Max, RangeField::Wavelength, -1.0)],
            ..Default::default()
        };
        assert_eq!(
            sync_range(&current, &negative).unwrap_err().kind,
            ErrorKind::Conversion
        );

        let text = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Max, RangeField::Energy, "abc")],
            ..Default::default()
        };
        assert_eq!(
            sync_range(&current, &text).unwrap_err().kind,
            ErrorKind::InputFormat
        );

        let delayed = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Min, RangeField::Tof, 5.0)],
            delay_us: Some(10.0),
            ..Default::default()
        };
        assert_eq!(
            sync_range(&current, &delayed).unwrap_err().kind,
            ErrorKind::Conversion
        );
    }

    #[test]
    fn test_round_trip_through_tof() {
        let current = RangeEntry::default();
        let tof = current.max.tof_us;
        let change = RangeChange {
            edits: vec![RangeEdit::new(Endpoint::Max, RangeField::Tof, tof * 2.0)],
            ..Default::default()
        };
        let (range, _) = updated(sync_range(&current, &change).unwrap());
        // TOF 加倍 → 能量变为 1/4
        assert!(((range.max.energy_ev - 25.0) / 25.0).abs() < 1e-6);
    }
}
