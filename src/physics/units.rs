//! # 中子单位换算
//!
//! 能量、波长、速度与飞行时间 (TOF) 之间的纯函数换算。
//!
//! ## 公式
//! - λ(Å) = sqrt(81.787 / (1000 · E(eV)))
//! - v = h / (m_n · λ)
//! - t = L · λ · m_n / h + delay
//!
//! ## 依赖关系
//! - 被 `session/sync.rs`, `plot/assembler.rs` 使用
//! - 使用 `error.rs` 的 FieldError

use crate::error::FieldError;

/// E·λ² 常数 (meV·Å²)
pub const ENERGY_WAVELENGTH_MEV_A2: f64 = 81.787;

/// 中子质量 (kg)
pub const NEUTRON_MASS_KG: f64 = 1.674_927_471e-27;

/// 普朗克常数 (J·s)
pub const PLANCK_J_S: f64 = 6.626_070_15e-34;

/// 默认飞行距离 (m)
pub const DEFAULT_DISTANCE_M: f64 = 16.45;

/// m_n / h (s/m²)
const MN_OVER_H: f64 = NEUTRON_MASS_KG / PLANCK_J_S;

/// 能量 (eV) → 波长 (Å)
pub fn energy_to_wavelength(energy_ev: f64) -> f64 {
    (ENERGY_WAVELENGTH_MEV_A2 / (1000.0 * energy_ev)).sqrt()
}

/// 波长 (Å) → 能量 (eV)
pub fn wavelength_to_energy(wavelength_a: f64) -> f64 {
    ENERGY_WAVELENGTH_MEV_A2 / (1000.0 * wavelength_a * wavelength_a)
}

/// 波长 (Å) → 速度 (m/s)
pub fn wavelength_to_velocity(wavelength_a: f64) -> f64 {
    1.0 / (wavelength_a * 1e-10 * MN_OVER_H)
}

/// 能量 (eV) → 速度 (m/s)
pub fn energy_to_velocity(energy_ev: f64) -> f64 {
    wavelength_to_velocity(energy_to_wavelength(energy_ev))
}

/// 固定飞行距离和探测器延迟下的换算器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    distance_m: f64,
    delay_us: f64,
}

impl UnitConverter {
    /// 创建换算器，距离必须为正有限值，延迟必须非负
    pub fn new(distance_m: f64, delay_us: f64) -> Result<Self, FieldError> {
        if !distance_m.is_finite() || distance_m <= 0.0 {
            return Err(FieldError::conversion(
                "distance",
                format!(
                    "Source-to-detector distance must be positive, got {}",
                    distance_m
                ),
            ));
        }
        if !delay_us.is_finite() || delay_us < 0.0 {
            return Err(FieldError::conversion(
                "delay",
                format!("Delay must be zero or positive, got {}", delay_us),
            ));
        }
        Ok(Self {
            distance_m,
            delay_us,
        })
    }

    pub fn delay_us(&self) -> f64 {
        self.delay_us
    }

    /// 波长 (Å) → TOF (µs)
    pub fn wavelength_to_tof_us(&self, wavelength_a: f64) -> f64 {
        self.distance_m * wavelength_a * 1e-10 * MN_OVER_H * 1e6 + self.delay_us
    }

    /// TOF (µs) → 波长 (Å)
    pub fn tof_us_to_wavelength(&self, tof_us: f64) -> f64 {
        (tof_us - self.delay_us) * 1e-6 / (self.distance_m * 1e-10 * MN_OVER_H)
    }

    /// 能量 (eV) → TOF (µs)
    pub fn energy_to_tof_us(&self, energy_ev: f64) -> f64 {
        self.wavelength_to_tof_us(energy_to_wavelength(energy_ev))
    }

    /// TOF (µs) → 能量 (eV)
    pub fn tof_us_to_energy(&self, tof_us: f64) -> f64 {
        wavelength_to_energy(self.tof_us_to_wavelength(tof_us))
    }

    /// 批量换算能量数组为 TOF (µs)
    pub fn energies_to_tof_us(&self, energies: &[f64]) -> Vec<f64> {
        energies.iter().map(|&e| self.energy_to_tof_us(e)).collect()
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self {
            distance_m: DEFAULT_DISTANCE_M,
            delay_us: 0.0,
        }
    }
}

/// 批量换算能量数组为波长 (Å)
pub fn energies_to_wavelength(energies: &[f64]) -> Vec<f64> {
    energies.iter().map(|&e| energy_to_wavelength(e)).collect()
}

/// 升序能量网格：从 `min` 开始按 `step` 递增，`max` 不在网格上时追加到末尾
///
/// 调用方负责保证 `min < max` 且 `step > 0`。
pub fn energy_grid(min: f64, max: f64, step: f64) -> Vec<f64> {
    let n = grid_steps(min, max, step) as usize;
    let mut grid: Vec<f64> = (0..=n).map(|i| min + i as f64 * step).collect();
    match grid.last() {
        Some(&last) if (max - last).abs() > step * 1e-6 => grid.push(max),
        Some(_) => {
            if let Some(last) = grid.last_mut() {
                *last = max;
            }
        }
        None => grid.push(max),
    }
    grid
}

fn grid_steps(min: f64, max: f64, step: f64) -> f64 {
    ((max - min) / step * (1.0 + 1e-9)).floor()
}

/// 能量网格点数上限
pub const MAX_GRID_POINTS: f64 = 1_000_000.0;

/// 网格点数上界，用于在生成网格前检查规模
pub fn energy_grid_len_bound(min: f64, max: f64, step: f64) -> f64 {
    grid_steps(min, max, step) + 2.0
}
