//! # 物理引擎
//!
//! 给定能量网格与样品堆叠，计算总体/层/元素/同位素的透射率，以及
//! 元素/同位素的截面曲线。
//!
//! ## 接口
//! `PhysicsEngine::compute(energy_grid, stack, quantity) -> Vec<Series>`，
//! 每条曲线带有其实体标签（总体、层、元素、同位素）。
//!
//! ## 内置实现
//! `ResonanceEngine` 使用 `physics/elements.rs` 的截面模型：
//! - 数密度 N = ρ · N_A / M · n_atom · r_iso (cm⁻³)
//! - 透射率 T = exp(-Σ N σ d)，d 单位 cm，σ 单位 barn (1e-24 cm²)
//!
//! ## 依赖关系
//! - 被 `plot/assembler.rs`, `physics/beam.rs`, `commands/` 使用
//! - 使用 `physics/elements.rs`, `physics/formula.rs`

use crate::error::{ResoError, Result};
use crate::models::Granularity;
use crate::physics::elements::{get_element, ElementData};
use crate::physics::formula::Formula;
use std::fmt;

/// 阿伏伽德罗常数 (mol⁻¹)
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// 1 barn (cm²)
const BARN_CM2: f64 = 1e-24;

// ─────────────────────────────────────────────────────────────
// 数据类型
// ─────────────────────────────────────────────────────────────

/// 引擎计算的物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Transmission,
    /// 按同位素比例加权的截面
    CrossSection,
    /// 未加权的同位素截面
    CrossSectionRaw,
}

/// 曲线所属实体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Total,
    Layer {
        layer: usize,
    },
    Element {
        layer: usize,
        element: String,
    },
    Isotope {
        layer: usize,
        element: String,
        isotope: String,
    },
}

impl Entity {
    pub fn granularity(&self) -> Granularity {
        match self {
            Entity::Total => Granularity::Total,
            Entity::Layer { .. } => Granularity::Layer,
            Entity::Element { .. } => Granularity::Element,
            Entity::Isotope { .. } => Granularity::Isotope,
        }
    }
}

/// 一条曲线
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub entity: Entity,
    /// 显示标签，如 `Ag/Ag/107-Ag`
    pub label: String,
    pub values: Vec<f64>,
}

/// 某元素在某层中使用的同位素比例
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRatios {
    pub element: String,
    /// (同位素符号, 比例)
    pub isotopes: Vec<(String, f64)>,
}

impl ElementRatios {
    /// 天然丰度
    pub fn natural(data: &ElementData) -> Self {
        ElementRatios {
            element: data.symbol.to_string(),
            isotopes: data
                .isotopes
                .iter()
                .map(|i| (data.isotope_symbol(i), i.abundance))
                .collect(),
        }
    }

    pub fn ratio_of(&self, isotope: &str) -> f64 {
        self.isotopes
            .iter()
            .find(|(s, _)| s == isotope)
            .map(|(_, r)| *r)
            .unwrap_or(0.0)
    }
}

/// 交给引擎的样品层（密度已确定，同位素比例已确定）
#[derive(Debug, Clone, PartialEq)]
pub struct StackLayer {
    pub formula: Formula,
    pub thickness_mm: f64,
    pub density_g_cm3: f64,
    pub ratios: Vec<ElementRatios>,
}

impl StackLayer {
    /// 天然丰度的样品层
    pub fn natural(formula: Formula, thickness_mm: f64, density_g_cm3: f64) -> Result<Self> {
        let ratios = formula
            .symbols()
            .map(|s| {
                get_element(s)
                    .map(ElementRatios::natural)
                    .ok_or_else(|| ResoError::UnknownElement(s.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(StackLayer {
            formula,
            thickness_mm,
            density_g_cm3,
            ratios,
        })
    }

    pub fn ratios_of(&self, element: &str) -> Option<&ElementRatios> {
        self.ratios.iter().find(|r| r.element == element)
    }

    /// 当前同位素比例下元素的摩尔质量 (g/mol)
    pub fn element_molar_mass(&self, element: &str) -> Result<f64> {
        let data = get_element(element).ok_or_else(|| ResoError::UnknownElement(element.to_string()))?;
        Ok(match self.ratios_of(element) {
            Some(r) => {
                let ratios: Vec<f64> = data
                    .isotopes
                    .iter()
                    .map(|i| r.ratio_of(&data.isotope_symbol(i)))
                    .collect();
                data.molar_mass_with_ratios(&ratios)
            }
            None => data.natural_molar_mass(),
        })
    }

    /// 化学式的摩尔质量 (g/mol)
    pub fn molar_mass(&self) -> Result<f64> {
        self.formula
            .components
            .iter()
            .map(|(s, c)| -> Result<f64> { Ok(c * self.element_molar_mass(s)?) })
            .sum()
    }

    /// 元素原子数密度 (atoms/cm³)
    pub fn number_density(&self, element: &str) -> Result<f64> {
        let count = self.formula.count_of(element).unwrap_or(0.0);
        Ok(self.density_g_cm3 * AVOGADRO / self.molar_mass()? * count)
    }
}

// ─────────────────────────────────────────────────────────────
// 引擎接口
// ─────────────────────────────────────────────────────────────

/// 物理引擎接口
pub trait PhysicsEngine: Send + Sync {
    /// 在能量网格上计算指定物理量的所有曲线
    fn compute(&self, energy_grid: &[f64], stack: &[StackLayer], quantity: Quantity) -> Result<Vec<Series>>;
}

/// 内置共振截面引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct ResonanceEngine;

impl ResonanceEngine {
    pub fn new() -> Self {
        ResonanceEngine
    }
}

/// 层标签：化学式重复时附加层序号
fn layer_labels(stack: &[StackLayer]) -> Vec<String> {
    stack
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let text = &layer.formula.text;
            let repeated = stack
                .iter()
                .filter(|other| &other.formula.text == text)
                .count()
                > 1;
            if repeated {
                format!("{}#{}", text, i + 1)
            } else {
                text.clone()
            }
        })
        .collect()
}

impl PhysicsEngine for ResonanceEngine {
    fn compute(&self, energy_grid: &[f64], stack: &[StackLayer], quantity: Quantity) -> Result<Vec<Series>> {
        if energy_grid.is_empty() {
            return Err(ResoError::EngineError("energy grid is empty".to_string()));
        }
        if let Some(e) = energy_grid.iter().find(|e| !e.is_finite() || **e <= 0.0) {
            return Err(ResoError::EngineError(format!(
                "energy grid contains a non-positive value: {}",
                e
            )));
        }

        let labels = layer_labels(stack);
        let n = energy_grid.len();
        let mut total_mu = vec![0.0; n];
        let mut layer_series = Vec::new();
        let mut element_series = Vec::new();
        let mut isotope_series = Vec::new();

        for (layer_index, layer) in stack.iter().enumerate() {
            let thickness_cm = layer.thickness_mm / 10.0;
            let mut layer_mu = vec![0.0; n];

            for (symbol, _) in &layer.formula.components {
                let data = get_element(symbol).ok_or_else(|| ResoError::UnknownElement(symbol.clone()))?;
                let n_element = layer.number_density(symbol)?;
                let natural;
                let ratios = match layer.ratios_of(symbol) {
                    Some(r) => r,
                    None => {
                        natural = ElementRatios::natural(data);
                        &natural
                    }
                };

                let element_label = format!("{}/{}", labels[layer_index], symbol);
                let mut weighted_sigma = vec![0.0; n];

                for isotope in &data.isotopes {
                    let iso_symbol = data.isotope_symbol(isotope);
                    let ratio = ratios.ratio_of(&iso_symbol);
                    let raw: Vec<f64> = energy_grid.iter().map(|&e| isotope.cross_section(e)).collect();

                    for (w, s) in weighted_sigma.iter_mut().zip(&raw) {
                        *w += ratio * s;
                    }

                    let values = match quantity {
                        Quantity::Transmission => {
                            let factor = n_element * ratio * thickness_cm * BARN_CM2;
                            raw.iter().map(|s| (-factor * s).exp()).collect()
                        }
                        Quantity::CrossSection => raw.iter().map(|s| ratio * s).collect(),
                        Quantity::CrossSectionRaw => raw,
                    };
                    isotope_series.push(Series {
                        entity: Entity::Isotope {
                            layer: layer_index,
                            element: symbol.clone(),
                            isotope: iso_symbol.clone(),
                        },
                        label: format!("{}/{}", element_label, iso_symbol),
                        values,
                    });
                }

                let element_mu: Vec<f64> = weighted_sigma
                    .iter()
                    .map(|s| n_element * s * thickness_cm * BARN_CM2)
                    .collect();
                for (l, m) in layer_mu.iter_mut().zip(&element_mu) {
                    *l += m;
                }

                let values = match quantity {
                    Quantity::Transmission => element_mu.iter().map(|m| (-m).exp()).collect(),
                    Quantity::CrossSection => weighted_sigma,
                    Quantity::CrossSectionRaw => continue,
                };
                element_series.push(Series {
                    entity: Entity::Element {
                        layer: layer_index,
                        element: symbol.clone(),
                    },
                    label: element_label,
                    values,
                });
            }

            for (t, m) in total_mu.iter_mut().zip(&layer_mu) {
                *t += m;
            }
            if quantity == Quantity::Transmission {
                layer_series.push(Series {
                    entity: Entity::Layer { layer: layer_index },
                    label: labels[layer_index].clone(),
                    values: layer_mu.iter().map(|m| (-m).exp()).collect(),
                });
            }
        }

        let mut series = Vec::new();
        if quantity == Quantity::Transmission {
            series.push(Series {
                entity: Entity::Total,
                label: "Total".to_string(),
                values: total_mu.iter().map(|m| (-m).exp()).collect(),
            });
        }
        series.extend(layer_series);
        series.extend(element_series);
        series.extend(isotope_series);
        Ok(series)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Transmission => write!(f, "transmission"),
            Quantity::CrossSection => write!(f, "cross-section"),
            Quantity::CrossSectionRaw => write!(f, "cross-section (raw)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::formula::parse_formula;

    fn silver(thickness_mm: f64) -> StackLayer {
        StackLayer::natural(parse_formula("Ag").unwrap(), thickness_mm, 10.49).unwrap()
    }

    #[test]
    fn test_transmission_bounds_and_dip() {
        let grid = [3.0, 5.19, 8.0, 16.3, 25.0];
        let series = ResonanceEngine::new()
            .compute(&grid, &[silver(0.5)], Quantity::Transmission)
            .unwrap();

        let total = series.iter().find(|s| s.entity == Entity::Total).unwrap();
        for &t in &total.values {
            assert!((0.0..=1.0).contains(&t), "transmission out of range: {}", t);
        }
        // 5.19 eV 的 Ag-109 共振处透射率低于相邻点
        assert!(total.values[1] < total.values[0]);
        assert!(total.values[1] < total.values[2]);
    }

    #[test]
    fn test_total_is_product_of_layers() {
        let grid = [1.0, 4.906, 10.0];
        let gold = StackLayer::natural(parse_formula("Au").unwrap(), 0.01, 19.3).unwrap();
        let series = ResonanceEngine::new()
            .compute(&grid, &[silver(0.1), gold], Quantity::Transmission)
            .unwrap();

        let total = &series[0];
        let layers: Vec<&Series> = series
            .iter()
            .filter(|s| matches!(s.entity, Entity::Layer { .. }))
            .collect();
        assert_eq!(layers.len(), 2);
        for i in 0..grid.len() {
            let product = layers[0].values[i] * layers[1].values[i];
            assert!((total.values[i] - product).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cross_section_series_entities() {
        let grid = [1.0, 10.0];
        let engine = ResonanceEngine::new();
        let weighted = engine.compute(&grid, &[silver(0.5)], Quantity::CrossSection).unwrap();
        assert!(weighted.iter().all(|s| matches!(
            s.entity,
            Entity::Element { .. } | Entity::Isotope { .. }
        )));
        assert_eq!(weighted.len(), 3);

        let raw = engine.compute(&grid, &[silver(0.5)], Quantity::CrossSectionRaw).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].label, "Ag/Ag/107-Ag");

        // 元素截面 = Σ 比例 × 同位素截面
        let ag = &weighted[0];
        let sum: f64 = weighted[1..].iter().map(|s| s.values[0]).sum();
        assert!((ag.values[0] - sum).abs() < 1e-9);
    }

    #[test]
    fn test_enriched_ratios_change_transmission() {
        let grid = [5.19];
        let natural = silver(0.5);
        let mut enriched = natural.clone();
        enriched.ratios[0].isotopes = vec![("107-Ag".to_string(), 1.0), ("109-Ag".to_string(), 0.0)];

        let engine = ResonanceEngine::new();
        let t_nat = engine.compute(&grid, &[natural], Quantity::Transmission).unwrap()[0].values[0];
        let t_enr = engine.compute(&grid, &[enriched], Quantity::Transmission).unwrap()[0].values[0];
        assert!(t_enr > t_nat, "removing Ag-109 must remove its 5.19 eV dip");
    }

    #[test]
    fn test_duplicate_layers_get_distinct_labels() {
        let series = ResonanceEngine::new()
            .compute(&[1.0], &[silver(0.1), silver(0.2)], Quantity::Transmission)
            .unwrap();
        let labels: Vec<&str> = series
            .iter()
            .filter(|s| matches!(s.entity, Entity::Layer { .. }))
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Ag#1", "Ag#2"]);
    }

    #[test]
    fn test_empty_grid_is_engine_error() {
        let err = ResonanceEngine::new()
            .compute(&[], &[silver(0.5)], Quantity::Transmission)
            .unwrap_err();
        assert!(matches!(err, ResoError::EngineError(_)));
    }
}
