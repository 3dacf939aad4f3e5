//! # 能量范围表
//!
//! 能量/波长/速度/TOF 两端点及中子分类。
//!
//! ## 依赖关系
//! - 被 `session/sync.rs`, `session/validator.rs`, `commands/range.rs` 使用
//! - 使用 `physics/units.rs`

use crate::error::FieldError;
pub use crate::physics::units::DEFAULT_DISTANCE_M;
use crate::physics::units::{energy_to_velocity, energy_to_wavelength, UnitConverter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 默认能量下限 (eV)
pub const DEFAULT_ENERGY_MIN: f64 = 1.0;
/// 默认能量上限 (eV)
pub const DEFAULT_ENERGY_MAX: f64 = 100.0;
/// 默认能量步长 (eV)
pub const DEFAULT_ENERGY_STEP: f64 = 0.01;

/// 单位表示（真值来源）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeField {
    Energy,
    Wavelength,
    Tof,
}

impl RangeField {
    /// 同批次多个表示被编辑时的优先级（越小越优先）
    pub fn precedence(self) -> u8 {
        match self {
            RangeField::Energy => 0,
            RangeField::Wavelength => 1,
            RangeField::Tof => 2,
        }
    }
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeField::Energy => write!(f, "energy"),
            RangeField::Wavelength => write!(f, "wavelength"),
            RangeField::Tof => write!(f, "tof"),
        }
    }
}

/// 端点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Min,
    Max,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Min => write!(f, "min"),
            Endpoint::Max => write!(f, "max"),
        }
    }
}

/// 中子能量分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NeutronClass {
    UltraCold,
    VeryCold,
    Cold,
    Thermal,
    Epithermal,
    Intermediate,
    Fast,
    Relativistic,
}

impl NeutronClass {
    pub fn from_energy(energy_ev: f64) -> Self {
        match energy_ev {
            e if e < 3e-7 => NeutronClass::UltraCold,
            e if e < 5e-5 => NeutronClass::VeryCold,
            e if e < 0.025 => NeutronClass::Cold,
            e if e < 1.0 => NeutronClass::Thermal,
            e if e < 1e4 => NeutronClass::Epithermal,
            e if e < 1e6 => NeutronClass::Intermediate,
            e if e < 2e7 => NeutronClass::Fast,
            _ => NeutronClass::Relativistic,
        }
    }
}

impl fmt::Display for NeutronClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NeutronClass::UltraCold => "Ultra-cold",
            NeutronClass::VeryCold => "Very-cold",
            NeutronClass::Cold => "Cold",
            NeutronClass::Thermal => "Thermal",
            NeutronClass::Epithermal => "Epithermal",
            NeutronClass::Intermediate => "Intermediate",
            NeutronClass::Fast => "Fast",
            NeutronClass::Relativistic => "Relativistic",
        };
        write!(f, "{}", name)
    }
}

/// 单个端点的全部表示
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeRow {
    pub energy_ev: f64,
    pub wavelength_angstrom: f64,
    pub velocity_m_s: f64,
    pub tof_us: f64,
    pub class: NeutronClass,
}

impl RangeRow {
    /// 由能量推导其余表示
    pub fn from_energy(energy_ev: f64, converter: &UnitConverter) -> Self {
        RangeRow {
            energy_ev,
            wavelength_angstrom: energy_to_wavelength(energy_ev),
            velocity_m_s: energy_to_velocity(energy_ev),
            tof_us: converter.energy_to_tof_us(energy_ev),
            class: NeutronClass::from_energy(energy_ev),
        }
    }

    pub fn value(&self, field: RangeField) -> f64 {
        match field {
            RangeField::Energy => self.energy_ev,
            RangeField::Wavelength => self.wavelength_angstrom,
            RangeField::Tof => self.tof_us,
        }
    }
}

/// 能量范围表
#[derive(Debug, Clone, PartialEq)]
pub struct RangeEntry {
    /// 能量下限端点
    pub min: RangeRow,
    /// 能量上限端点
    pub max: RangeRow,
    pub distance_m: f64,
    pub delay_us: f64,
    /// 最近一次编辑的表示
    pub source: RangeField,
}

impl RangeEntry {
    /// 由能量上下限构建，能量必须为正且不相等
    pub fn from_energies(
        energy_min: f64,
        energy_max: f64,
        distance_m: f64,
        delay_us: f64,
    ) -> Result<Self, FieldError> {
        let converter = UnitConverter::new(distance_m, delay_us)?;
        for (label, e) in [("range.energy.min", energy_min), ("range.energy.max", energy_max)] {
            if !e.is_finite() || e <= 0.0 {
                return Err(FieldError::conversion(
                    label,
                    format!("Energy must be positive, got {}", e),
                ));
            }
        }
        if energy_min == energy_max {
            return Err(FieldError::domain(
                "range.energy",
                "Energy min. can not equal energy max.",
            ));
        }
        Ok(RangeEntry {
            min: RangeRow::from_energy(energy_min, &converter),
            max: RangeRow::from_energy(energy_max, &converter),
            distance_m,
            delay_us,
            source: RangeField::Energy,
        })
    }

    pub fn converter(&self) -> Result<UnitConverter, FieldError> {
        UnitConverter::new(self.distance_m, self.delay_us)
    }

    /// 升序能量边界
    pub fn energy_bounds(&self) -> (f64, f64) {
        let (a, b) = (self.min.energy_ev, self.max.energy_ev);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl Default for RangeEntry {
    fn default() -> Self {
        let converter = UnitConverter::default();
        RangeEntry {
            min: RangeRow::from_energy(DEFAULT_ENERGY_MIN, &converter),
            max: RangeRow::from_energy(DEFAULT_ENERGY_MAX, &converter),
            distance_m: DEFAULT_DISTANCE_M,
            delay_us: 0.0,
            source: RangeField::Energy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let r = RangeEntry::default();
        assert_eq!(r.min.energy_ev, 1.0);
        assert_eq!(r.max.energy_ev, 100.0);
        assert!((r.min.tof_us - 1189.19).abs() < 0.1);
        assert!((r.max.wavelength_angstrom - 0.028598).abs() < 1e-5);
        assert_eq!(r.min.class, NeutronClass::Epithermal);
        assert_eq!(r.max.class, NeutronClass::Epithermal);
    }

    #[test]
    fn test_neutron_classes() {
        assert_eq!(NeutronClass::from_energy(1e-8), NeutronClass::UltraCold);
        assert_eq!(NeutronClass::from_energy(1e-5), NeutronClass::VeryCold);
        assert_eq!(NeutronClass::from_energy(0.005), NeutronClass::Cold);
        assert_eq!(NeutronClass::from_energy(0.0253), NeutronClass::Thermal);
        assert_eq!(NeutronClass::from_energy(5e5), NeutronClass::Intermediate);
        assert_eq!(NeutronClass::from_energy(2e6), NeutronClass::Fast);
        assert_eq!(NeutronClass::from_energy(1e8), NeutronClass::Relativistic);
    }

    #[test]
    fn test_equal_energies_rejected() {
        let err = RangeEntry::from_energies(5.0, 5.0, 16.45, 0.0).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::DomainConstraint);
    }

    #[test]
    fn test_bounds_sorted() {
        let r = RangeEntry::from_energies(100.0, 1.0, 16.45, 0.0).unwrap();
        assert_eq!(r.energy_bounds(), (1.0, 100.0));
    }
}
