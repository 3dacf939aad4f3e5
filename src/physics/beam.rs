//! # 束流谱加权透射率
//!
//! 读取仪器束流谱 (energy_eV, flux)，计算样品在整个束流上的总透射率：
//!
//! T_beam = Σ T(Eᵢ) · flux(Eᵢ) / Σ flux(Eᵢ) × 100 %
//!
//! T(E) 先在覆盖束流谱的均匀网格上计算，再线性插值到束流谱能量点。
//!
//! ## 文件格式
//! ```text
//! # comment
//! energy_eV,flux
//! 0.00025,1.2e5
//! 0.00088,3.4e5
//! ```
//! 逗号或空白分隔；非数值行（表头）与 `#` 注释行被跳过。
//!
//! ## 依赖关系
//! - 被 `commands/beam.rs` 使用
//! - 使用 `physics/engine.rs`, `physics/units.rs`

use crate::error::{ResoError, Result};
use crate::physics::engine::{Entity, PhysicsEngine, Quantity, StackLayer};
use crate::physics::units::{energy_grid, energy_grid_len_bound, MAX_GRID_POINTS};
use std::fs;
use std::path::Path;

/// 默认计算网格步长 (eV)
pub const DEFAULT_BEAM_STEP_EV: f64 = 0.000625;

/// 束流谱
#[derive(Debug, Clone, PartialEq)]
pub struct BeamSpectrum {
    /// 能量 (eV)，升序
    pub energy_ev: Vec<f64>,
    pub flux: Vec<f64>,
}

/// 束流加权结果（百分比）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamTransmission {
    pub transmission_pct: f64,
    pub attenuation_pct: f64,
}

impl BeamSpectrum {
    /// 从文件读取
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ResoError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content).map_err(|reason| ResoError::ParseError {
            format: "beam spectrum".to_string(),
            path: path.display().to_string(),
            reason,
        })
    }

    /// 从文本内容解析
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut points: Vec<(f64, f64)> = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            if fields.len() < 2 {
                return Err(format!("line {}: expected two columns", line_no + 1));
            }

            match (fields[0].parse::<f64>(), fields[1].parse::<f64>()) {
                (Ok(e), Ok(f)) => {
                    if e <= 0.0 || f < 0.0 {
                        return Err(format!(
                            "line {}: energy must be positive and flux non-negative",
                            line_no + 1
                        ));
                    }
                    points.push((e, f));
                }
                // 表头
                _ if points.is_empty() => continue,
                _ => return Err(format!("line {}: non-numeric value", line_no + 1)),
            }
        }

        if points.len() < 2 {
            return Err("spectrum needs at least two points".to_string());
        }

        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        if points.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err("duplicate energy values".to_string());
        }
        if points.iter().map(|p| p.1).sum::<f64>() <= 0.0 {
            return Err("total flux is zero".to_string());
        }

        Ok(BeamSpectrum {
            energy_ev: points.iter().map(|p| p.0).collect(),
            flux: points.iter().map(|p| p.1).collect(),
        })
    }

    pub fn energy_span(&self) -> (f64, f64) {
        (
            self.energy_ev.first().copied().unwrap_or(0.0),
            self.energy_ev.last().copied().unwrap_or(0.0),
        )
    }

    /// 计算束流加权透射率
    pub fn weighted_transmission(
        &self,
        engine: &dyn PhysicsEngine,
        stack: &[StackLayer],
        step_ev: f64,
    ) -> Result<BeamTransmission> {
        if step_ev <= 0.0 {
            return Err(ResoError::InvalidArgument(format!(
                "energy step must be positive, got {}",
                step_ev
            )));
        }
        let (e_min, e_max) = self.energy_span();
        let points = energy_grid_len_bound(e_min, e_max, step_ev);
        if points > MAX_GRID_POINTS {
            return Err(ResoError::InvalidArgument(format!(
                "beam grid would have {:.0} points (limit {:.0}); increase the step",
                points, MAX_GRID_POINTS
            )));
        }
        let grid = energy_grid(e_min, e_max, step_ev);

        let series = engine.compute(&grid, stack, Quantity::Transmission)?;
        let total = series
            .into_iter()
            .find(|s| s.entity == Entity::Total)
            .ok_or_else(|| ResoError::EngineError("engine returned no total transmission".to_string()))?;

        let mut transmitted = 0.0;
        let mut incident = 0.0;
        for (&e, &f) in self.energy_ev.iter().zip(&self.flux) {
            transmitted += interpolate(&grid, &total.values, e) * f;
            incident += f;
        }

        let transmission_pct = transmitted / incident * 100.0;
        Ok(BeamTransmission {
            transmission_pct,
            attenuation_pct: 100.0 - transmission_pct,
        })
    }
}

/// 线性插值，`xs` 升序；超出范围时取端点值
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    let last = xs.len() - 1;
    if x >= xs[last] {
        return ys[last];
    }
    let i = xs.partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::engine::ResonanceEngine;
    use crate::physics::formula::parse_formula;

    #[test]
    fn test_parse_with_header_and_comments() {
        let text = "# CG-1D\nenergy_eV,flux\n0.001,10\n0.002 30\n\n0.0015, 20\n";
        let spectrum = BeamSpectrum::parse(text).unwrap();
        assert_eq!(spectrum.energy_ev, vec![0.001, 0.0015, 0.002]);
        assert_eq!(spectrum.flux, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(BeamSpectrum::parse("0.001,1\n").is_err());
        assert!(BeamSpectrum::parse("0.001,1\nabc,2\n").is_err());
        assert!(BeamSpectrum::parse("0.001,1\n0.001,2\n").is_err());
        assert!(BeamSpectrum::parse("0.001,0\n0.002,0\n").is_err());
    }

    #[test]
    fn test_interpolate() {
        let xs = [1.0, 2.0, 4.0];
        let ys = [10.0, 20.0, 0.0];
        assert_eq!(interpolate(&xs, &ys, 1.5), 15.0);
        assert_eq!(interpolate(&xs, &ys, 3.0), 10.0);
        assert_eq!(interpolate(&xs, &ys, 0.5), 10.0);
        assert_eq!(interpolate(&xs, &ys, 9.0), 0.0);
    }

    #[test]
    fn test_weighted_transmission_between_zero_and_hundred() {
        let spectrum = BeamSpectrum::parse("0.001,1\n0.01,5\n0.05,2\n0.1,1\n").unwrap();
        let stack = vec![StackLayer::natural(parse_formula("Ag").unwrap(), 0.5, 10.49).unwrap()];
        let result = spectrum
            .weighted_transmission(&ResonanceEngine::new(), &stack, 0.001)
            .unwrap();
        assert!(result.transmission_pct > 0.0 && result.transmission_pct < 100.0);
        assert!((result.transmission_pct + result.attenuation_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stack_transmits_everything() {
        let spectrum = BeamSpectrum::parse("0.001,1\n0.1,1\n").unwrap();
        let result = spectrum
            .weighted_transmission(&ResonanceEngine::new(), &[], DEFAULT_BEAM_STEP_EV)
            .unwrap();
        assert!((result.transmission_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_wide_spectrum_rejects_oversized_grid() {
        let spectrum = BeamSpectrum::parse("0.0001,1\n1000,1\n").unwrap();
        let engine = ResonanceEngine::new();
        let result = spectrum.weighted_transmission(&engine, &[], DEFAULT_BEAM_STEP_EV);
        assert!(matches!(result, Err(ResoError::InvalidArgument(_))));

        let coarse = spectrum.weighted_transmission(&engine, &[], 0.01);
        assert!(coarse.is_ok());
    }
}
