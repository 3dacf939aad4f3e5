//! # 绘图请求
//!
//! x 轴、y 量、坐标尺度、显示粒度与时间单位。
//!
//! ## 依赖关系
//! - 被 `cli/`, `session/`, `plot/` 使用

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// x 轴物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum XAxis {
    #[default]
    Energy,
    Wavelength,
    /// 飞行时间
    Time,
}

impl fmt::Display for XAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XAxis::Energy => write!(f, "energy"),
            XAxis::Wavelength => write!(f, "wavelength"),
            XAxis::Time => write!(f, "time"),
        }
    }
}

/// y 轴物理量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum YAxis {
    Transmission,
    #[default]
    Attenuation,
    /// 按比例加权的截面
    CrossSection,
    /// 未加权的同位素截面
    CrossSectionRaw,
}

impl YAxis {
    pub fn is_cross_section(self) -> bool {
        matches!(self, YAxis::CrossSection | YAxis::CrossSectionRaw)
    }

    /// 该 y 量允许的显示粒度
    pub fn allowed_granularity(self) -> &'static [Granularity] {
        match self {
            YAxis::Transmission | YAxis::Attenuation => &[
                Granularity::Total,
                Granularity::Layer,
                Granularity::Element,
                Granularity::Isotope,
            ],
            YAxis::CrossSection => &[Granularity::Element, Granularity::Isotope],
            YAxis::CrossSectionRaw => &[Granularity::Isotope],
        }
    }

    /// 轴标签
    pub fn label(self) -> &'static str {
        match self {
            YAxis::Transmission => "Transmission",
            YAxis::Attenuation => "Attenuation",
            YAxis::CrossSection => "Cross-section (barn)",
            YAxis::CrossSectionRaw => "Cross-section raw (barn)",
        }
    }
}

impl fmt::Display for YAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YAxis::Transmission => write!(f, "transmission"),
            YAxis::Attenuation => write!(f, "attenuation"),
            YAxis::CrossSection => write!(f, "cross-section"),
            YAxis::CrossSectionRaw => write!(f, "cross-section-raw"),
        }
    }
}

/// 坐标尺度（仅作渲染提示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    Logx,
    Logy,
    Loglog,
}

impl Scale {
    pub fn log_x(self) -> bool {
        matches!(self, Scale::Logx | Scale::Loglog)
    }

    pub fn log_y(self) -> bool {
        matches!(self, Scale::Logy | Scale::Loglog)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Linear => write!(f, "linear"),
            Scale::Logx => write!(f, "logx"),
            Scale::Logy => write!(f, "logy"),
            Scale::Loglog => write!(f, "loglog"),
        }
    }
}

/// 显示粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Total,
    Layer,
    Element,
    Isotope,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Total => write!(f, "total"),
            Granularity::Layer => write!(f, "layer"),
            Granularity::Element => write!(f, "element"),
            Granularity::Isotope => write!(f, "isotope"),
        }
    }
}

/// TOF 时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    S,
    #[default]
    Us,
    Ns,
}

impl TimeUnit {
    /// µs → 本单位的倍数
    pub fn from_us_factor(self) -> f64 {
        match self {
            TimeUnit::S => 1e-6,
            TimeUnit::Us => 1.0,
            TimeUnit::Ns => 1e3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TimeUnit::S => "s",
            TimeUnit::Us => "µs",
            TimeUnit::Ns => "ns",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::S => write!(f, "s"),
            TimeUnit::Us => write!(f, "us"),
            TimeUnit::Ns => write!(f, "ns"),
        }
    }
}

/// 绘图请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PlotRequest {
    pub x_axis: XAxis,
    pub y_axis: YAxis,
    pub scale: Scale,
    pub show: Vec<Granularity>,
    pub time_unit: TimeUnit,
}

impl Default for PlotRequest {
    fn default() -> Self {
        PlotRequest {
            x_axis: XAxis::Energy,
            y_axis: YAxis::Attenuation,
            scale: Scale::Linear,
            show: vec![Granularity::Total],
            time_unit: TimeUnit::Us,
        }
    }
}

impl PlotRequest {
    /// 规范化：
    /// - 截面 y 量只保留允许的粒度，全部被过滤时退回允许的最粗粒度
    /// - 截面 y 量强制 log-y（已是 logy/loglog 时保持不变）
    /// - 粒度去重并排序
    pub fn normalized(mut self) -> Self {
        let allowed = self.y_axis.allowed_granularity();
        self.show.retain(|g| allowed.contains(g));
        self.show.sort();
        self.show.dedup();
        if self.show.is_empty() {
            self.show.push(allowed[0]);
        }

        if self.y_axis.is_cross_section() && !self.scale.log_y() {
            self.scale = Scale::Logy;
        }
        self
    }

    pub fn shows(&self, granularity: Granularity) -> bool {
        self.show.contains(&granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_section_drops_total_and_layer() {
        let req = PlotRequest {
            y_axis: YAxis::CrossSection,
            show: vec![Granularity::Total, Granularity::Layer, Granularity::Isotope],
            ..Default::default()
        }
        .normalized();
        assert_eq!(req.show, vec![Granularity::Isotope]);
        assert_eq!(req.scale, Scale::Logy);
    }

    #[test]
    fn test_cross_section_raw_falls_back_to_isotope() {
        let req = PlotRequest {
            y_axis: YAxis::CrossSectionRaw,
            scale: Scale::Loglog,
            show: vec![Granularity::Element],
            ..Default::default()
        }
        .normalized();
        assert_eq!(req.show, vec![Granularity::Isotope]);
        assert_eq!(req.scale, Scale::Loglog, "loglog must be kept");
    }

    #[test]
    fn test_transmission_keeps_scale() {
        let req = PlotRequest {
            y_axis: YAxis::Transmission,
            scale: Scale::Logx,
            show: vec![Granularity::Layer, Granularity::Total, Granularity::Layer],
            ..Default::default()
        }
        .normalized();
        assert_eq!(req.scale, Scale::Logx);
        assert_eq!(req.show, vec![Granularity::Total, Granularity::Layer]);
    }

    #[test]
    fn test_deserialize_kebab_case() {
        let req: PlotRequest =
            serde_json::from_str(r#"{"y_axis": "cross-section-raw", "time_unit": "ns"}"#).unwrap();
        assert_eq!(req.y_axis, YAxis::CrossSectionRaw);
        assert_eq!(req.time_unit, TimeUnit::Ns);
        assert_eq!(req.x_axis, XAxis::Energy);
    }
}
