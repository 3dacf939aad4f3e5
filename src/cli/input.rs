//! # 会话输入参数
//!
//! 所有子命令共用的范围、样品层与同位素参数。
//! 这些参数在会话文件之后重放，覆盖文件中的对应设置。
//!
//! ## 依赖关系
//! - 被 `cli/range.rs`, `cli/stack.rs`, `cli/compute.rs`, `cli/beam.rs` 使用
//! - 转换为 `session/config.rs` 的 SessionConfig

use crate::models::{Cell, SampleRow};
use crate::session::config::{Bounds, IsotopeConfig, RangeConfig, RatioConfig, SessionConfig};
use clap::Args;

/// 范围、样品层与同位素参数
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Energy range in eV (e.g., "1-100")
    #[arg(long, value_parser = parse_bounds)]
    pub energy: Option<Bounds>,

    /// Wavelength range in Å (e.g., "0.03-0.28"); ignored when --energy is given
    #[arg(long, value_parser = parse_bounds)]
    pub wavelength: Option<Bounds>,

    /// Time-of-flight range in µs (e.g., "120-1200"); ignored when --energy or --wavelength is given
    #[arg(long, value_parser = parse_bounds)]
    pub tof: Option<Bounds>,

    /// Source-to-detector distance in m
    #[arg(short, long, env = "RESOKIT_DISTANCE")]
    pub distance: Option<f64>,

    /// Detector delay in µs
    #[arg(long, env = "RESOKIT_DELAY")]
    pub delay: Option<f64>,

    /// Energy grid step in eV
    #[arg(long)]
    pub step: Option<f64>,

    /// Sample layer as FORMULA:THICKNESS_MM[:DENSITY_G_CM3] (repeatable, replaces all layers)
    #[arg(short, long = "layer", value_parser = parse_layer)]
    pub layers: Vec<SampleRow>,

    /// Use manual isotope ratios
    #[arg(long, default_value_t = false)]
    pub manual_isotopes: bool,

    /// Isotope ratio as LAYER:ISOTOPE=RATIO, e.g. "1:107-Ag=0.9" (repeatable, implies --manual-isotopes)
    #[arg(long = "isotope", value_parser = parse_isotope)]
    pub isotopes: Vec<RatioConfig>,
}

impl InputArgs {
    /// 转换为会话设置；未给出的部分保持为 None，不覆盖会话文件
    pub fn to_config(&self) -> SessionConfig {
        let range = RangeConfig {
            energy: self.energy.clone(),
            wavelength: self.wavelength.clone(),
            tof: self.tof.clone(),
            distance_m: self.distance,
            delay_us: self.delay,
            step_ev: self.step.map(Cell::Number),
        };

        let isotopes = (self.manual_isotopes || !self.isotopes.is_empty()).then(|| IsotopeConfig {
            manual: true,
            ratios: self.isotopes.clone(),
        });

        SessionConfig {
            range: (range != RangeConfig::default()).then_some(range),
            layers: (!self.layers.is_empty()).then(|| self.layers.clone()),
            isotopes,
            plot: None,
        }
    }
}

/// 解析范围字符串 "MIN-MAX"
///
/// 允许科学计数法中的负指数，如 "1e-5-0.025"。
pub fn parse_bounds(input: &str) -> Result<Bounds, String> {
    let s = input.trim();
    let bytes = s.as_bytes();
    let split = (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && !matches!(bytes[i - 1], b'e' | b'E'))
        .ok_or_else(|| format!("Invalid range '{}'. Use MIN-MAX, e.g. 1-100", input))?;

    let parse = |part: &str| -> Result<Cell, String> {
        part.trim()
            .parse::<f64>()
            .map(Cell::Number)
            .map_err(|_| format!("Invalid number '{}' in range '{}'", part.trim(), input))
    };

    Ok(Bounds {
        min: Some(parse(&s[..split])?),
        max: Some(parse(&s[split + 1..])?),
    })
}

/// 解析样品层 "FORMULA:THICKNESS[:DENSITY]"
///
/// 厚度与密度保持为文本单元格，由校验器统一转换并报告错误。
pub fn parse_layer(input: &str) -> Result<SampleRow, String> {
    let parts: Vec<&str> = input.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [formula, thickness] if !formula.is_empty() => Ok(SampleRow::new(*formula, *thickness, Cell::blank())),
        [formula, thickness, density] if !formula.is_empty() => Ok(SampleRow::new(*formula, *thickness, *density)),
        _ => Err(format!(
            "Invalid layer '{}'. Use FORMULA:THICKNESS_MM[:DENSITY], e.g. Ag:0.5 or AgCl:0.5:5.56",
            input
        )),
    }
}

/// 解析同位素比例 "LAYER:ISOTOPE=RATIO"
pub fn parse_isotope(input: &str) -> Result<RatioConfig, String> {
    let usage = || format!("Invalid isotope ratio '{}'. Use LAYER:ISOTOPE=RATIO, e.g. 1:107-Ag=0.9", input);

    let (layer, rest) = input.split_once(':').ok_or_else(usage)?;
    let (isotope, ratio) = rest.split_once('=').ok_or_else(usage)?;
    let layer: usize = layer.trim().parse().map_err(|_| usage())?;
    if layer == 0 {
        return Err(format!("Invalid isotope ratio '{}': layer numbers start at 1", input));
    }
    let isotope = isotope.trim();
    if isotope.is_empty() {
        return Err(usage());
    }

    Ok(RatioConfig {
        layer,
        isotope: isotope.to_string(),
        ratio: Cell::from(ratio.trim()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds() {
        let b = parse_bounds("1-100").unwrap();
        assert_eq!(b.min, Some(Cell::Number(1.0)));
        assert_eq!(b.max, Some(Cell::Number(100.0)));

        let b = parse_bounds("1e-5-2.5E-2").unwrap();
        assert_eq!(b.min, Some(Cell::Number(1e-5)));
        assert_eq!(b.max, Some(Cell::Number(0.025)));

        assert!(parse_bounds("100").is_err());
        assert!(parse_bounds("a-b").is_err());
    }

    #[test]
    fn test_parse_layer() {
        let row = parse_layer("AgCl:0.5:5.56").unwrap();
        assert_eq!(row.formula, "AgCl");
        assert_eq!(row.thickness.as_f64(), Some(0.5));
        assert_eq!(row.density.as_f64(), Some(5.56));

        let row = parse_layer("Ag:0.5").unwrap();
        assert!(row.density.is_blank());

        assert!(parse_layer("Ag").is_err());
        assert!(parse_layer(":0.5").is_err());
    }

    #[test]
    fn test_parse_isotope() {
        let r = parse_isotope("1:107-Ag=0.9").unwrap();
        assert_eq!(r.layer, 1);
        assert_eq!(r.isotope, "107-Ag");
        assert_eq!(r.ratio.as_f64(), Some(0.9));

        assert!(parse_isotope("0:107-Ag=0.9").is_err());
        assert!(parse_isotope("1:107-Ag").is_err());
        assert!(parse_isotope("107-Ag=0.9").is_err());
    }

    #[test]
    fn test_to_config_only_sets_given_parts() {
        let args = InputArgs {
            distance: Some(20.0),
            ..Default::default()
        };
        let config = args.to_config();
        let range = config.range.unwrap();
        assert_eq!(range.distance_m, Some(20.0));
        assert!(range.energy.is_none());
        assert!(config.layers.is_none());
        assert!(config.isotopes.is_none());

        assert_eq!(InputArgs::default().to_config(), SessionConfig::default());

        let args = InputArgs {
            isotopes: vec![parse_isotope("1:107-Ag=1").unwrap()],
            ..Default::default()
        };
        assert!(args.to_config().isotopes.unwrap().manual);
    }
}
